//! Enricher descriptors: rules describing one category of synthetic member,
//! read from the `@CodeAugment` annotation on an enricher class.

use protoscope_core::Severity;
use protoscope_hir::{
    simple_name, Annotation, AttributeValue, DeclKind, Declaration, Modifiers, Parameter, Type,
};

pub const CODE_AUGMENT: &str = "net.binis.codegen.annotation.augment.CodeAugment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AugmentType {
    Field,
    Method,
    Constructor,
    Getter,
    Setter,
}

impl AugmentType {
    pub fn from_constant(constant: &str) -> Option<Self> {
        match constant {
            "FIELD" => Some(AugmentType::Field),
            "METHOD" => Some(AugmentType::Method),
            "CONSTRUCTOR" => Some(AugmentType::Constructor),
            "GETTER" => Some(AugmentType::Getter),
            "SETTER" => Some(AugmentType::Setter),
            _ => None,
        }
    }

    /// Whether this enricher contributes fields (as opposed to methods and
    /// constructors).
    pub fn adds_fields(self) -> bool {
        self == AugmentType::Field
    }
}

/// Declaration kinds an enricher may be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AugmentTargetType {
    Everything,
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
    Field,
    Method,
    Constructor,
}

impl AugmentTargetType {
    pub fn from_constant(constant: &str) -> Option<Self> {
        Some(match constant {
            "EVERYTHING" => AugmentTargetType::Everything,
            "CLASS" => AugmentTargetType::Class,
            "INTERFACE" => AugmentTargetType::Interface,
            "ENUM" => AugmentTargetType::Enum,
            "ANNOTATION" => AugmentTargetType::Annotation,
            "RECORD" => AugmentTargetType::Record,
            "FIELD" => AugmentTargetType::Field,
            "METHOD" => AugmentTargetType::Method,
            "CONSTRUCTOR" => AugmentTargetType::Constructor,
            _ => return None,
        })
    }

    pub fn description(self) -> &'static str {
        match self {
            AugmentTargetType::Everything => "everything",
            AugmentTargetType::Class => "class",
            AugmentTargetType::Interface => "interface",
            AugmentTargetType::Enum => "enum",
            AugmentTargetType::Annotation => "annotation",
            AugmentTargetType::Record => "record",
            AugmentTargetType::Field => "field",
            AugmentTargetType::Method => "method",
            AugmentTargetType::Constructor => "constructor",
        }
    }

    pub fn accepts(self, kind: DeclKind) -> bool {
        match self {
            AugmentTargetType::Everything => true,
            AugmentTargetType::Class => kind == DeclKind::Class,
            AugmentTargetType::Interface => kind == DeclKind::Interface,
            AugmentTargetType::Enum => kind == DeclKind::Enum,
            AugmentTargetType::Annotation => kind == DeclKind::AnnotationType,
            AugmentTargetType::Record => kind == DeclKind::Record,
            AugmentTargetType::Field | AugmentTargetType::Method | AugmentTargetType::Constructor => {
                false
            }
        }
    }
}

fn severity_from_constant(constant: &str) -> Option<Severity> {
    match constant {
        "ERROR" => Some(Severity::Error),
        "WARNING" => Some(Severity::Warning),
        "INFO" | "WEAK_WARNING" => Some(Severity::Info),
        _ => None,
    }
}

/// A message with `{name}` / `{type}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, name: &str, ty: &str) -> String {
        self.0.replace("{name}", name).replace("{type}", ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementSource {
    Fields,
    Methods,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementPredicate {
    Modifier(Modifiers),
    Initialized,
}

/// Selects existing members of a declaration to feed a generated
/// constructor or method: `FIELDS|PRIVATE|!STATIC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFilter {
    pub source: ElementSource,
    /// Predicates with their negation flag, all of which must hold.
    pub predicates: Vec<(ElementPredicate, bool)>,
}

impl ElementFilter {
    /// Returns `None` when the first segment is neither `FIELDS` nor
    /// `METHODS`. Unknown predicate segments are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let mut segments = text.split('|');
        let source = match segments.next()?.trim() {
            "FIELDS" => ElementSource::Fields,
            "METHODS" => ElementSource::Methods,
            _ => return None,
        };
        let predicates = segments
            .filter_map(|segment| {
                let segment = segment.trim();
                let (negated, word) = match segment.strip_prefix('!') {
                    Some(word) => (true, word),
                    None => (false, segment),
                };
                let predicate = match word {
                    "INITIALIZED" => ElementPredicate::Initialized,
                    other => ElementPredicate::Modifier(modifier_from_name(other)?),
                };
                Some((predicate, negated))
            })
            .collect();
        Some(Self { source, predicates })
    }

    /// The selected elements as parameters: field name and type, or method
    /// name and return type.
    pub fn apply(&self, decl: &Declaration) -> Vec<Parameter> {
        let candidates: Vec<(&str, &Type, Modifiers, bool)> = match self.source {
            ElementSource::Fields => decl
                .fields
                .iter()
                .map(|f| (f.name.as_str(), &f.ty, f.modifiers, f.has_initializer))
                .collect(),
            ElementSource::Methods => decl
                .methods
                .iter()
                .map(|m| (m.name.as_str(), &m.return_type, m.modifiers, false))
                .collect(),
        };
        candidates
            .into_iter()
            .filter(|(_, _, modifiers, initialized)| {
                self.predicates.iter().all(|(predicate, negated)| {
                    let holds = match predicate {
                        ElementPredicate::Modifier(m) => modifiers.contains(*m),
                        ElementPredicate::Initialized => *initialized,
                    };
                    holds != *negated
                })
            })
            .map(|(name, ty, _, _)| Parameter::new(name, ty.clone()))
            .collect()
    }
}

fn modifier_from_name(name: &str) -> Option<Modifiers> {
    Some(match name {
        "PUBLIC" => Modifiers::PUBLIC,
        "PRIVATE" => Modifiers::PRIVATE,
        "PROTECTED" => Modifiers::PROTECTED,
        "STATIC" => Modifiers::STATIC,
        "FINAL" => Modifiers::FINAL,
        "ABSTRACT" => Modifiers::ABSTRACT,
        "TRANSIENT" => Modifiers::TRANSIENT,
        "VOLATILE" => Modifiers::VOLATILE,
        "SYNCHRONIZED" => Modifiers::SYNCHRONIZED,
        "NATIVE" => Modifiers::NATIVE,
        "STRICTFP" => Modifiers::STRICTFP,
        "DEFAULT" => Modifiers::DEFAULT,
        _ => return None,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnricherDescriptor {
    /// Qualified name of the enricher class.
    pub class_name: String,
    pub adds: Option<AugmentType>,
    pub targets: Vec<AugmentTargetType>,
    pub severity: Severity,
    pub name: String,
    pub ty: String,
    pub description: Option<String>,
    pub modifier: Modifiers,
    pub parameters: Option<Vec<Parameter>>,
    pub filter: Option<ElementFilter>,
    pub params_suppresses: Option<MessageTemplate>,
}

impl EnricherDescriptor {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            adds: None,
            targets: vec![AugmentTargetType::Everything],
            severity: Severity::Error,
            name: String::new(),
            ty: String::new(),
            description: None,
            modifier: Modifiers::PUBLIC,
            parameters: None,
            filter: None,
            params_suppresses: None,
        }
    }

    /// Reads the `@CodeAugment` annotation of an enricher class. A class
    /// without one yields an enricher that adds nothing.
    pub fn from_declaration(class_name: &str, decl: &Declaration) -> Self {
        let mut result = Self::new(class_name);
        let Some(augment) = decl.annotation(CODE_AUGMENT) else {
            return result;
        };
        for attr in &augment.attributes {
            let value = &attr.value;
            match attr.name.as_str() {
                "adds" => {
                    result.adds = value.as_enum_constant().and_then(AugmentType::from_constant);
                }
                "targets" => {
                    result.targets = value
                        .elements()
                        .filter_map(|v| v.as_enum_constant())
                        .filter_map(AugmentTargetType::from_constant)
                        .collect();
                }
                "severity" => {
                    result.severity = value
                        .as_enum_constant()
                        .and_then(severity_from_constant)
                        .unwrap_or(Severity::Error);
                }
                "name" => {
                    if let Some(name) = non_blank_str(value) {
                        result.name = name.to_string();
                    }
                }
                "type" => {
                    if let Some(ty) = non_blank_str(value) {
                        result.ty = ty.to_string();
                    }
                }
                "description" => {
                    result.description = non_blank_str(value).map(str::to_string);
                }
                "modifier" => {
                    if let Some(bits) = value.as_int() {
                        result.modifier = Modifiers::from_reflection(bits);
                    }
                }
                "parameters" => {
                    if let Some(parameters) = value.as_annotation() {
                        result.read_parameters(parameters);
                    }
                }
                _ => {}
            }
        }
        result
    }

    fn read_parameters(&mut self, parameters: &Annotation) {
        for attr in &parameters.attributes {
            match attr.name.as_str() {
                "filter" => {
                    if let Some(text) = attr.value.as_str() {
                        self.filter = ElementFilter::parse(text);
                    }
                }
                "suppresses" => {
                    if let Some(text) = attr.value.as_str() {
                        self.params_suppresses = Some(MessageTemplate::new(text));
                    }
                }
                "params" => {
                    let params: Vec<_> = attr
                        .value
                        .elements()
                        .filter_map(AttributeValue::as_annotation)
                        .map(|param| {
                            let text = |key| param.attribute(key).and_then(|v| v.as_str()).unwrap_or("");
                            Parameter::new(text("name"), Type::parse(text("type")))
                        })
                        .collect();
                    if !params.is_empty() {
                        self.parameters = Some(params);
                    }
                }
                _ => {}
            }
        }
    }

    pub fn applies_to(&self, kind: DeclKind) -> bool {
        self.targets.iter().any(|t| t.accepts(kind))
    }

    /// Human-readable descriptions of `targets`, position for position.
    pub fn target_descriptions(&self) -> Vec<&'static str> {
        self.targets.iter().map(|t| t.description()).collect()
    }

    /// How diagnostics name this enricher: its simple class name, followed
    /// by the declared description when there is one.
    pub fn display_name(&self) -> String {
        let name = simple_name(&self.class_name);
        match &self.description {
            Some(description) => format!("{name} ({description})"),
            None => name.to_string(),
        }
    }

    /// The generated member's type.
    pub fn member_type(&self) -> Type {
        Type::parse(&self.ty)
    }

    /// Parameters of a generated method or constructor: filtered elements of
    /// `decl` first, then the static parameter list.
    pub fn parameters_for(&self, decl: &Declaration) -> Vec<Parameter> {
        let mut params = self
            .filter
            .as_ref()
            .map(|filter| filter.apply(decl))
            .unwrap_or_default();
        if let Some(fixed) = &self.parameters {
            params.extend(fixed.iter().cloned());
        }
        params
    }
}

fn non_blank_str(value: &AttributeValue) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}
