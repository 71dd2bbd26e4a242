//! Applying annotation attributes to a [`PrototypeDescriptor`].

use std::sync::Arc;

use protoscope_hir::{Annotation, AttributeValue};

use crate::descriptor::{CustomValue, GenerationStrategy, PrototypeDescriptor, PROTOTYPE_KEY};
use crate::enricher::EnricherDescriptor;
use crate::error::LookupError;

/// Turns an enricher class literal into its descriptor.
pub(crate) trait EnricherResolver {
    fn resolve_enricher(
        &mut self,
        class_name: &str,
    ) -> Result<Option<Arc<EnricherDescriptor>>, LookupError>;
}

/// Where an attribute value comes from. Usage sites ignore blank strings and
/// derive the class and interface names from `name`; template element
/// defaults are copied verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttributeOrigin {
    Usage,
    TemplateDefault,
}

/// Applies every attribute of a template usage (`@Tmpl(name = "X", ...)`).
pub(crate) fn read_annotation(
    annotation: &Annotation,
    desc: &mut PrototypeDescriptor,
    resolver: &mut dyn EnricherResolver,
) -> Result<(), LookupError> {
    desc.set_custom(PROTOTYPE_KEY, CustomValue::Text(annotation.name.clone()));
    for attr in &annotation.attributes {
        apply_attribute(
            &annotation.name,
            &attr.name,
            &attr.value,
            AttributeOrigin::Usage,
            desc,
            resolver,
        )?;
    }
    Ok(())
}

pub(crate) fn apply_attribute(
    annotation: &str,
    name: &str,
    value: &AttributeValue,
    origin: AttributeOrigin,
    desc: &mut PrototypeDescriptor,
    resolver: &mut dyn EnricherResolver,
) -> Result<(), LookupError> {
    let usage = origin == AttributeOrigin::Usage;
    let text = || -> Option<String> {
        let s = value.as_str()?;
        (!usage || !s.trim().is_empty()).then(|| s.to_string())
    };

    match name {
        "name" if usage => {
            if let Some(value) = text() {
                let interface = value.replace("Entity", "");
                desc.long_modifier_name = Some(format!("{interface}.Modify"));
                desc.interface_name = Some(interface);
                desc.class_name = Some(value.clone());
                desc.name = Some(value);
            }
        }
        "name" => desc.name = text(),
        "interfaceName" => {
            if let Some(value) = value.as_str() {
                desc.interface_name = Some(value.to_string());
            }
        }
        "interfacePackage" => set_if(&mut desc.interface_package, text()),
        "implementationPackage" => set_if(&mut desc.class_package, text()),
        "basePath" => set_if(&mut desc.base_path, text()),
        "interfacePath" => set_if(&mut desc.interface_path, text()),
        "implementationPath" => set_if(&mut desc.implementation_path, text()),
        "generateConstructor" => set_flag(&mut desc.generate_constructor, value),
        "generateImplementation" => set_flag(&mut desc.generate_implementation, value),
        "generateInterface" => set_flag(&mut desc.generate_interface, value),
        "classGetters" => set_flag(&mut desc.class_getters, value),
        "classSetters" => set_flag(&mut desc.class_setters, value),
        "interfaceSetters" => set_flag(&mut desc.interface_setters, value),
        "base" => set_flag(&mut desc.base, value),
        "strategy" => {
            let constant = value.as_enum_constant().ok_or_else(|| malformed(annotation, name))?;
            desc.strategy = GenerationStrategy::from_constant(constant)
                .ok_or_else(|| malformed(annotation, name))?;
        }
        "enrichers" => desc.enrichers = resolve_enrichers(value, resolver)?,
        "inheritedEnrichers" => desc.inherited_enrichers = resolve_enrichers(value, resolver)?,
        other => desc.set_custom(other, CustomValue::Attribute(value.clone())),
    }
    Ok(())
}

fn set_if(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

fn set_flag(slot: &mut bool, value: &AttributeValue) {
    if let Some(flag) = value.as_bool() {
        *slot = flag;
    }
}

fn malformed(annotation: &str, attribute: &str) -> LookupError {
    LookupError::MalformedAttribute {
        annotation: annotation.to_string(),
        attribute: attribute.to_string(),
    }
}

/// Class literals (single or array) resolved in order; literals that do not
/// resolve to a declaration are skipped.
fn resolve_enrichers(
    value: &AttributeValue,
    resolver: &mut dyn EnricherResolver,
) -> Result<Vec<Arc<EnricherDescriptor>>, LookupError> {
    let mut result = Vec::new();
    for class_name in value.elements().filter_map(AttributeValue::as_class) {
        if let Some(enricher) = resolver.resolve_enricher(class_name)? {
            result.push(enricher);
        }
    }
    Ok(result)
}
