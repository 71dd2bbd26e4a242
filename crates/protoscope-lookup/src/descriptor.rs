use std::collections::BTreeMap;
use std::sync::Arc;

use protoscope_hir::AttributeValue;

use crate::enricher::EnricherDescriptor;

/// Generation mode of a prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenerationStrategy {
    #[default]
    Prototype,
    Implementation,
    Plain,
    None,
}

impl GenerationStrategy {
    /// Decodes a `GenerationStrategy` enum constant name.
    pub fn from_constant(constant: &str) -> Option<Self> {
        match constant {
            "PROTOTYPE" => Some(GenerationStrategy::Prototype),
            "IMPLEMENTATION" => Some(GenerationStrategy::Implementation),
            "PLAIN" => Some(GenerationStrategy::Plain),
            "NONE" => Some(GenerationStrategy::None),
            _ => None,
        }
    }
}

/// Value stored under a `custom` key: attributes without a dedicated field.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomValue {
    Flag(bool),
    Text(String),
    Attribute(AttributeValue),
}

/// The resolved configuration of a prototype, or the defaults a template
/// annotation contributes.
///
/// Descriptors are shared as `Arc<PrototypeDescriptor>` and never mutated
/// once published. Specialising a template for a usage clones it first.
#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeDescriptor {
    pub name: Option<String>,
    pub interface_name: Option<String>,
    pub interface_package: Option<String>,
    pub class_name: Option<String>,
    pub class_package: Option<String>,
    pub base_path: Option<String>,
    pub interface_path: Option<String>,
    pub implementation_path: Option<String>,
    pub long_modifier_name: Option<String>,

    pub generate_interface: bool,
    pub generate_implementation: bool,
    pub generate_constructor: bool,
    pub class_getters: bool,
    pub class_setters: bool,
    pub interface_setters: bool,
    pub base: bool,

    pub strategy: GenerationStrategy,

    pub enrichers: Vec<Arc<EnricherDescriptor>>,
    pub inherited_enrichers: Vec<Arc<EnricherDescriptor>>,
    pub custom: BTreeMap<String, CustomValue>,
}

/// Custom key naming the template annotation a descriptor was read from.
pub const PROTOTYPE_KEY: &str = "prototype";
/// Custom key set by the enum root template.
pub const ENUM_KEY: &str = "enum";

impl Default for PrototypeDescriptor {
    /// The generator's base defaults, used for templates that do not
    /// inherit from another template.
    fn default() -> Self {
        Self {
            name: None,
            interface_name: None,
            interface_package: None,
            class_name: None,
            class_package: None,
            base_path: None,
            interface_path: None,
            implementation_path: None,
            long_modifier_name: None,
            generate_interface: true,
            generate_implementation: true,
            generate_constructor: true,
            class_getters: true,
            class_setters: true,
            interface_setters: true,
            base: false,
            strategy: GenerationStrategy::Prototype,
            enrichers: Vec::new(),
            inherited_enrichers: Vec::new(),
            custom: BTreeMap::new(),
        }
    }
}

impl PrototypeDescriptor {
    /// Qualified name of the template annotation this descriptor came from.
    pub fn prototype_annotation(&self) -> Option<&str> {
        match self.custom.get(PROTOTYPE_KEY) {
            Some(CustomValue::Text(name)) => Some(name),
            _ => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.custom.get(ENUM_KEY), Some(CustomValue::Flag(true)))
    }

    pub fn custom(&self, key: &str) -> Option<&CustomValue> {
        self.custom.get(key)
    }

    pub fn set_custom(&mut self, key: impl Into<String>, value: CustomValue) {
        self.custom.insert(key.into(), value);
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
