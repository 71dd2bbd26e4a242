use protoscope_core::{DeclId, FileId, Span};
use serde::{Deserialize, Serialize};

use crate::types::{Modifiers, Parameter, Type};

/// A constant value of an annotation attribute, as the host evaluated it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    String(String),
    /// An enum constant; `ty` is the enum's qualified name.
    Enum { ty: String, constant: String },
    /// A class literal (`Foo.class`), by qualified name.
    Class(String),
    Array(Vec<AttributeValue>),
    Annotation(Box<Annotation>),
}

impl AttributeValue {
    pub fn enum_constant(ty: impl Into<String>, constant: impl Into<String>) -> Self {
        AttributeValue::Enum {
            ty: ty.into(),
            constant: constant.into(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// The constant name of an enum value (`IMPLEMENTATION` for
    /// `GenerationStrategy.IMPLEMENTATION`).
    pub fn as_enum_constant(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum { constant, .. } => Some(constant),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&str> {
        match self {
            AttributeValue::Class(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            AttributeValue::Annotation(v) => Some(v),
            _ => None,
        }
    }

    /// Java allows a single element wherever an array is expected; this
    /// flattens both spellings into a slice-like iterator.
    pub fn elements(&self) -> impl Iterator<Item = &AttributeValue> {
        let items: &[AttributeValue] = match self {
            AttributeValue::Array(items) => items,
            single => std::slice::from_ref(single),
        };
        items.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationAttribute {
    pub name: String,
    pub value: AttributeValue,
    /// Range of the value expression (string literals include their quotes).
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Qualified name of the annotation type when the host could resolve it,
    /// otherwise the name as written.
    pub name: String,
    pub attributes: Vec<AnnotationAttribute>,
    pub span: Option<Span>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if let Some(stripped) = name.strip_prefix('@') {
            name = stripped.to_string();
        }
        Self {
            name,
            attributes: Vec::new(),
            span: None,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.push(AnnotationAttribute {
            name: name.into(),
            value,
            span: None,
        });
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }

    /// Loose match: qualified names must agree, but either side may be a
    /// simple name.
    pub fn matches(&self, query: &str) -> bool {
        if self.name == query {
            return true;
        }
        let annotation_simple = simple_name(&self.name);
        let query_simple = simple_name(query);
        (!self.name.contains('.') || !query.contains('.')) && annotation_simple == query_simple
    }
}

/// Where a member came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemberOrigin {
    #[default]
    Source,
    /// Synthesized for editor-time visibility; carries the member's own name.
    Augmented(String),
}

impl MemberOrigin {
    pub fn is_augmented(&self) -> bool {
        matches!(self, MemberOrigin::Augmented(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldData {
    pub name: String,
    pub ty: Type,
    pub modifiers: Modifiers,
    pub has_initializer: bool,
    pub annotations: Vec<Annotation>,
    pub origin: MemberOrigin,
}

impl FieldData {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Modifiers::PRIVATE,
            has_initializer: false,
            annotations: Vec::new(),
            origin: MemberOrigin::Source,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodData {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Parameter>,
    pub modifiers: Modifiers,
    /// The `default` clause of an annotation-type element.
    pub default_value: Option<AttributeValue>,
    pub annotations: Vec<Annotation>,
    pub origin: MemberOrigin,
}

impl MethodData {
    pub fn new(name: impl Into<String>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            return_type,
            params: Vec::new(),
            modifiers: Modifiers::PUBLIC,
            default_value: None,
            annotations: Vec::new(),
            origin: MemberOrigin::Source,
        }
    }

    /// An annotation-type element: implicitly `public abstract`.
    pub fn element(
        name: impl Into<String>,
        return_type: Type,
        default_value: Option<AttributeValue>,
    ) -> Self {
        Self {
            modifiers: Modifiers::PUBLIC | Modifiers::ABSTRACT,
            default_value,
            ..Self::new(name, return_type)
        }
    }

    pub fn with_params(mut self, params: Vec<Parameter>) -> Self {
        self.params = params;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorData {
    pub params: Vec<Parameter>,
    pub modifiers: Modifiers,
    pub origin: MemberOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
    AnnotationType,
    Record,
}

impl DeclKind {
    pub fn is_interface(self) -> bool {
        matches!(self, DeclKind::Interface | DeclKind::AnnotationType)
    }
}

/// A type declaration as seen through the host's structural query API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// Simple name.
    pub name: String,
    /// `None` for anonymous and local classes.
    pub qualified_name: Option<String>,
    pub kind: DeclKind,
    pub file: FileId,
    /// Enclosing declaration of a nested type.
    pub parent: Option<DeclId>,
    pub annotations: Vec<Annotation>,
    /// Qualified names of the `extends` list (interfaces and annotation
    /// types may list several).
    pub extends: Vec<String>,
    pub implements: Vec<String>,
    pub fields: Vec<FieldData>,
    pub methods: Vec<MethodData>,
    pub constructors: Vec<ConstructorData>,
    /// Range of the whole declaration, modifiers and body included.
    pub span: Option<Span>,
    pub name_span: Option<Span>,
}

impl Declaration {
    pub fn new(kind: DeclKind, qualified_name: &str, file: FileId) -> Self {
        Self {
            name: simple_name(qualified_name).to_string(),
            qualified_name: Some(qualified_name.to_string()),
            kind,
            file,
            parent: None,
            annotations: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            span: None,
            name_span: None,
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_field(mut self, field: FieldData) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodData) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_extends(mut self, name: impl Into<String>) -> Self {
        self.extends.push(name.into());
        self
    }

    pub fn with_parent(mut self, parent: DeclId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_name_span(mut self, span: Span) -> Self {
        self.name_span = Some(span);
        self
    }

    pub fn annotation(&self, query: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.matches(query))
    }

    pub fn has_annotation(&self, query: &str) -> bool {
        self.annotation(query).is_some()
    }

    pub fn is_annotation_type(&self) -> bool {
        self.kind == DeclKind::AnnotationType
    }

    pub fn field(&self, name: &str) -> Option<&FieldData> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodData> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// The package of this declaration, derived from its qualified name and
    /// nesting (the qualified names of nested types include the outer type).
    pub fn package(&self) -> Option<&str> {
        let qualified = self.qualified_name.as_deref()?;
        qualified.rsplit_once('.').map(|(pkg, _)| pkg)
    }
}

/// Which element of a declaration an annotation usage is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteTarget {
    Declaration,
    Field(usize),
    Method(usize),
}

/// Addresses one annotation usage inside a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationSite {
    pub decl: DeclId,
    pub target: SiteTarget,
    /// Index into the target's annotation list.
    pub index: usize,
}

impl AnnotationSite {
    pub fn annotation<'a>(&self, decl: &'a Declaration) -> Option<&'a Annotation> {
        let annotations = match self.target {
            SiteTarget::Declaration => &decl.annotations,
            SiteTarget::Field(idx) => &decl.fields.get(idx)?.annotations,
            SiteTarget::Method(idx) => &decl.methods.get(idx)?.annotations,
        };
        annotations.get(self.index)
    }

    /// Every annotation usage of `decl`, in declaration order.
    pub fn all(id: DeclId, decl: &Declaration) -> Vec<AnnotationSite> {
        let on = |target, count: usize| {
            (0..count).map(move |index| AnnotationSite {
                decl: id,
                target,
                index,
            })
        };
        let mut sites: Vec<_> = on(SiteTarget::Declaration, decl.annotations.len()).collect();
        for (idx, field) in decl.fields.iter().enumerate() {
            sites.extend(on(SiteTarget::Field(idx), field.annotations.len()));
        }
        for (idx, method) in decl.methods.iter().enumerate() {
            sites.extend(on(SiteTarget::Method(idx), method.annotations.len()));
        }
        sites
    }
}

pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
