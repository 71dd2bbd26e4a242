//! Validation annotations: which annotations validate, sanitize or execute,
//! and which member types they may be applied to.

use std::sync::Arc;

use protoscope_core::Diagnostic;
use protoscope_hir::{is_assignable, simple_name, AnnotationSite, AttributeValue, SiteTarget};

use crate::error::LookupResult;
use crate::session::Session;

pub const VALIDATE: &str = "net.binis.codegen.annotation.validation.Validate";
pub const SANITIZE: &str = "net.binis.codegen.annotation.validation.Sanitize";
pub const EXECUTE: &str = "net.binis.codegen.annotation.validation.Execute";
pub const VALIDATION_ROOTS: [&str; 3] = [VALIDATE, SANITIZE, EXECUTE];

/// Marker interface of the predefined target groups below.
const TARGETS_AWARE: &str = "net.binis.codegen.validation.consts.ValidationTargets.TargetsAware";

const PRIMITIVES: [&str; 8] = ["int", "long", "double", "float", "short", "byte", "boolean", "char"];
const WRAPPERS: [&str; 8] = [
    "java.lang.Integer",
    "java.lang.Long",
    "java.lang.Double",
    "java.lang.Float",
    "java.lang.Short",
    "java.lang.Byte",
    "java.lang.Boolean",
    "java.lang.Character",
];

pub const CONTEXT_CODE: &str = "validation-context";
pub const PLACEMENT_CODE: &str = "validation-placement";
pub const TARGET_TYPE_CODE: &str = "validation-target-type";

/// What a validation annotation does and where it may be used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationDescriptor {
    /// The annotation type this descriptor was derived from.
    pub declaration: Option<String>,
    /// Allowed member types; `None` means the usage supplies them and an
    /// empty list allows anything.
    pub targets: Option<Vec<String>>,
    pub validator: bool,
    pub sanitizer: bool,
    pub executor: bool,
}

impl ValidationDescriptor {
    pub fn is_validation_annotation(&self) -> bool {
        self.validator || self.sanitizer || self.executor
    }

    fn root(name: &str) -> Option<Self> {
        let (validator, sanitizer, executor) = match name {
            VALIDATE => (true, false, false),
            SANITIZE => (false, true, false),
            EXECUTE => (false, false, true),
            _ => return None,
        };
        Some(Self {
            declaration: Some(name.to_string()),
            targets: Some(Vec::new()),
            validator,
            sanitizer,
            executor,
        })
    }
}

/// Expands a predefined target group to its member types.
fn known_targets(group: &str) -> Option<Vec<&'static str>> {
    let suffix = group.strip_prefix("net.binis.codegen.validation.consts.ValidationTargets.")?;
    let numbers = |list: &[&'static str]| -> Vec<&'static str> {
        list.iter()
            .copied()
            .filter(|ty| !matches!(*ty, "boolean" | "char" | "java.lang.Boolean" | "java.lang.Character"))
            .collect()
    };
    let targets = match suffix {
        "Primitives" => PRIMITIVES.to_vec(),
        "Wrappers" => WRAPPERS.to_vec(),
        "Common" => {
            let mut all = PRIMITIVES.to_vec();
            all.extend(WRAPPERS);
            all.push("java.lang.String");
            all
        }
        "PrimitiveNumbers" => numbers(&PRIMITIVES),
        "WrapperNumbers" => numbers(&WRAPPERS),
        "Numbers" => {
            let mut all = numbers(&PRIMITIVES);
            all.extend(numbers(&WRAPPERS));
            all
        }
        _ => return None,
    };
    Some(targets)
}

impl<'a> Session<'a> {
    /// Resolves the validation facets of an annotation, following its
    /// meta-annotations. Results, including negative ones, are cached.
    pub(crate) fn validation_descriptor(
        &mut self,
        name: &str,
    ) -> LookupResult<Arc<ValidationDescriptor>> {
        if let Some(root) = ValidationDescriptor::root(name) {
            return Ok(Arc::new(root));
        }
        let cached = self.registry.validators.read().get(name).cloned();
        if let Some(cached) = cached {
            return Ok(cached);
        }
        if !self.ctx.validation_in_progress.insert(name.to_string()) {
            return Ok(Arc::default());
        }
        let result = self.validation_uncached(name);
        self.ctx.validation_in_progress.remove(name);
        result
    }

    fn validation_uncached(&mut self, name: &str) -> LookupResult<Arc<ValidationDescriptor>> {
        let epoch = self.registry.epoch();
        let db = self.db();
        let decl = db.find_declaration_data(name)?.map(|(_, decl)| decl);

        let mut result = ValidationDescriptor::default();
        if let Some(decl) = decl.filter(|decl| decl.is_annotation_type()) {
            let declares_targets = decl.methods_named("targets").next().is_some();
            for annotation in &decl.annotations {
                if self.ctx.validation_in_progress.contains(&annotation.name) {
                    continue;
                }
                let parent = self.validation_descriptor(&annotation.name)?;
                self.registry.record_dependent(&annotation.name, name);
                if !parent.is_validation_annotation() {
                    continue;
                }
                let targets = if declares_targets {
                    None
                } else {
                    match annotation.attribute("targets") {
                        Some(value) => Some(self.process_targets(value)?),
                        None => parent.targets.clone(),
                    }
                };
                result = ValidationDescriptor {
                    declaration: Some(name.to_string()),
                    targets,
                    validator: parent.validator,
                    sanitizer: parent.sanitizer,
                    executor: parent.executor,
                };
                tracing::debug!(name = %name, parent = %annotation.name, "registered validation annotation");
                break;
            }
        }

        let result = Arc::new(result);
        let registry = self.registry;
        if registry.publish(&registry.validators, name.to_string(), result.clone(), epoch) {
            if let Some(decl) = decl {
                registry.record_owner(name, decl.file);
            }
        }
        Ok(result)
    }

    /// Class literals of a `targets` attribute, with predefined groups
    /// expanded.
    fn process_targets(&mut self, value: &AttributeValue) -> LookupResult<Vec<String>> {
        let db = self.db();
        let mut targets = Vec::new();
        for class in value.elements().filter_map(AttributeValue::as_class) {
            let aware = match db.find_declaration_data(class)? {
                Some((_, decl)) => decl.implements.iter().any(|i| i == TARGETS_AWARE),
                None => false,
            };
            match known_targets(class).filter(|_| aware) {
                Some(group) => targets.extend(group.into_iter().map(str::to_string)),
                None => targets.push(class.to_string()),
            }
        }
        Ok(targets)
    }

    pub(crate) fn validation_errors(&mut self, site: &AnnotationSite) -> LookupResult<Vec<Diagnostic>> {
        let db = self.db();
        let decl = db.declaration(site.decl)?;
        let Some(annotation) = site.annotation(decl) else {
            return Ok(Vec::new());
        };
        let desc = self.validation_descriptor(&annotation.name)?;
        if !desc.is_validation_annotation() {
            return Ok(Vec::new());
        }

        let display = simple_name(&annotation.name);
        let mut diagnostics = Vec::new();
        let in_prototype = match decl.qualified_name.as_deref() {
            Some(name) => self.prototype_data_inner(name)?.is_some(),
            None => false,
        };
        if !in_prototype && !decl.is_annotation_type() {
            diagnostics.push(
                Diagnostic::warning(
                    CONTEXT_CODE,
                    format!("Validation annotation @{display} has effect only on prototypes"),
                    annotation.span,
                ),
            );
        }

        let method = match site.target {
            SiteTarget::Method(index) => decl.methods.get(index),
            _ => None,
        };
        let Some(method) = method else {
            if !decl.is_annotation_type() {
                diagnostics.push(
                    Diagnostic::warning(
                        PLACEMENT_CODE,
                        format!("Validation annotation @{display} should be applied to a method"),
                        annotation.span,
                    ),
                );
            }
            return Ok(diagnostics);
        };

        let targets = match annotation.attribute("targets") {
            Some(value) if desc.declaration.is_some() => Some(self.process_targets(value)?),
            _ => desc.targets.clone(),
        };
        let Some(targets) = targets.filter(|targets| !targets.is_empty()) else {
            return Ok(diagnostics);
        };
        let mut allowed = false;
        for target in &targets {
            if is_assignable(db, &method.return_type, target)? {
                allowed = true;
                break;
            }
        }
        if !allowed {
            diagnostics.push(
                Diagnostic::error(
                    TARGET_TYPE_CODE,
                    format!(
                        "Invalid type '{}' for @{display}. Allowed types: {}",
                        method.return_type.canonical_text(),
                        targets.join(", ")
                    ),
                    annotation.span,
                ),
            );
        }
        Ok(diagnostics)
    }
}
