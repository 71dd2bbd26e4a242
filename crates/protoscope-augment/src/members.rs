//! Virtual members: fields, methods and constructors that do not exist in
//! source yet but will once the generator has run.

use protoscope_hir::{
    AttributeValue, ConstructorData, FieldData, MemberOrigin, MethodData, Modifiers, Parameter,
    Type,
};

#[derive(Debug, Clone, PartialEq)]
pub enum VirtualMember {
    Field(VirtualField),
    Method(VirtualMethod),
    Constructor(VirtualConstructor),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualField {
    pub name: String,
    pub ty: Type,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualMethod {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Parameter>,
    pub modifiers: Modifiers,
    /// Element default, for members copied from a parent annotation type.
    pub default_value: Option<AttributeValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualConstructor {
    /// Simple name of the declaring type.
    pub name: String,
    pub params: Vec<Parameter>,
    pub modifiers: Modifiers,
}

impl VirtualMember {
    pub fn name(&self) -> &str {
        match self {
            VirtualMember::Field(f) => &f.name,
            VirtualMember::Method(m) => &m.name,
            VirtualMember::Constructor(c) => &c.name,
        }
    }

    /// The marker a host stores on the member once it is merged into the
    /// declaration, so later passes recognise it as synthetic.
    pub fn origin(&self) -> MemberOrigin {
        MemberOrigin::Augmented(self.name().to_string())
    }

    pub(crate) fn key(&self) -> MemberKey {
        match self {
            VirtualMember::Field(f) => MemberKey::Field(f.name.clone()),
            VirtualMember::Method(m) => MemberKey::Method {
                name: m.name.clone(),
                param_types: m.params.iter().map(|p| p.ty.canonical_text()).collect(),
            },
            VirtualMember::Constructor(c) => MemberKey::Constructor {
                param_types: c.params.iter().map(|p| p.ty.canonical_text()).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum MemberKey {
    Field(String),
    Method {
        name: String,
        param_types: Vec<String>,
    },
    Constructor {
        param_types: Vec<String>,
    },
}

impl From<VirtualField> for FieldData {
    fn from(field: VirtualField) -> Self {
        FieldData {
            origin: MemberOrigin::Augmented(field.name.clone()),
            ..FieldData::new(field.name, field.ty).with_modifiers(field.modifiers)
        }
    }
}

impl From<VirtualMethod> for MethodData {
    fn from(method: VirtualMethod) -> Self {
        MethodData {
            default_value: method.default_value,
            origin: MemberOrigin::Augmented(method.name.clone()),
            ..MethodData::new(method.name, method.return_type)
                .with_params(method.params)
                .with_modifiers(method.modifiers)
        }
    }
}

impl From<VirtualConstructor> for ConstructorData {
    fn from(constructor: VirtualConstructor) -> Self {
        ConstructorData {
            params: constructor.params,
            modifiers: constructor.modifiers,
            origin: MemberOrigin::Augmented(constructor.name),
        }
    }
}
