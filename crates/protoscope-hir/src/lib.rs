//! Declaration-level program model consumed by the codegen lookup engine.
//!
//! The engine never talks to a concrete host representation. Everything it
//! needs (qualified names, annotations and their attributes, enclosing
//! declarations, members, file identity) goes through the [`Database`]
//! capability trait. [`MemoryDatabase`] is an in-memory implementation used by
//! tests and by hosts that lower their own trees into this model.

mod db;
mod decl;
mod expr;
mod types;

pub use db::{
    is_assignable, Database, FileData, FileLocation, MemoryDatabase, TypeReference,
};
pub use decl::{
    Annotation, AnnotationAttribute, AnnotationSite, AttributeValue, ConstructorData, DeclKind,
    Declaration, FieldData, MemberOrigin, MethodData, SiteTarget,
};
pub use decl::simple_name;
pub use expr::{ExprArena, ExprData, ExprKind};
pub use types::{Modifiers, Parameter, PrimitiveType, Type};
