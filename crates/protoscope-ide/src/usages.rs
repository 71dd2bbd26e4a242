//! Implicit usage and find-usages across the prototype/generated boundary.

use std::collections::{HashSet, VecDeque};

use protoscope_augment::{getter_name, property_name};
use protoscope_core::{Cancelled, DeclId, QueryError, QueryResult};
use protoscope_hir::{Database, MethodData};
use protoscope_lookup::Session;

use crate::{contain, CodegenIde};

/// A program element an editor request is about. Members are addressed by
/// their index in the declaring type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Declaration(DeclId),
    Field { decl: DeclId, index: usize },
    Method { decl: DeclId, index: usize },
}

impl Element {
    /// The declaration this element is, or belongs to.
    pub fn declaration(self) -> DeclId {
        match self {
            Element::Declaration(decl)
            | Element::Field { decl, .. }
            | Element::Method { decl, .. } => decl,
        }
    }
}

impl CodegenIde {
    /// Prototypes and their members are read by the generator, so they are
    /// never reported as unused.
    pub fn is_implicit_usage(&self, db: &dyn Database, element: Element) -> Result<bool, Cancelled> {
        if !self.is_codegen_used(db) {
            return Ok(false);
        }
        self.session(db).is_prototype_decl(element.declaration())
    }

    /// Find-usages is offered for prototypes, generated types, and methods of
    /// interfaces that are either.
    pub fn can_find_usages(&self, db: &dyn Database, element: Element) -> Result<bool, Cancelled> {
        let mut lookup = self.session(db);
        let decl = match element {
            Element::Declaration(decl) => decl,
            Element::Method { decl, .. } => {
                let is_interface = match db.declaration(decl) {
                    Ok(data) => data.kind.is_interface(),
                    Err(QueryError::Cancelled) => return Err(Cancelled),
                    Err(_) => false,
                };
                if !is_interface {
                    return Ok(false);
                }
                decl
            }
            Element::Field { .. } => return Ok(false),
        };
        Ok(lookup.is_prototype_decl(decl)? || lookup.is_generated_decl(decl)?)
    }

    /// The elements whose usages stand in for `element`'s: a prototype is
    /// searched through its generated type, a prototype method through the
    /// generated accessors and modifier methods, and a generated method
    /// through the prototype property it comes from.
    pub fn primary_elements(
        &self,
        db: &dyn Database,
        element: Element,
    ) -> Result<Vec<Element>, Cancelled> {
        if !self.is_codegen_used(db) {
            return Ok(Vec::new());
        }
        let mut lookup = self.session(db);
        let result = match element {
            Element::Declaration(decl) => declaration_targets(&mut lookup, decl),
            Element::Method { decl, index } => method_targets(&mut lookup, decl, index),
            Element::Field { .. } => Ok(Vec::new()),
        };
        contain("primary_elements", result)
    }
}

fn declaration_targets(lookup: &mut Session<'_>, id: DeclId) -> QueryResult<Vec<Element>> {
    let db = lookup.db();
    let Some(name) = db.declaration(id)?.qualified_name.as_deref() else {
        return Ok(Vec::new());
    };
    let generated_name = lookup.generated_name_of(name)?;
    let Some(generated) = lookup.find_declaration(&generated_name)? else {
        return Ok(Vec::new());
    };

    let mut targets = Vec::new();
    if lookup.is_generated_decl(id)? {
        if let Some(prototype) = lookup.prototype_class(&generated_name)? {
            targets.push(Element::Declaration(prototype));
        }
    }
    targets.push(Element::Declaration(generated));
    Ok(targets)
}

fn method_targets(lookup: &mut Session<'_>, id: DeclId, index: usize) -> QueryResult<Vec<Element>> {
    let db = lookup.db();
    let decl = db.declaration(id)?;
    let (Some(name), Some(method)) = (decl.qualified_name.as_deref(), decl.methods.get(index)) else {
        return Ok(Vec::new());
    };

    let mut targets = Vec::new();
    if lookup.is_prototype_decl(id)? {
        let generated_name = lookup.generated_name_of(name)?;
        let Some(generated) = lookup.find_declaration(&generated_name)? else {
            return Ok(targets);
        };
        let methods = all_methods(db, generated)?;
        for (owner, index, candidate) in &methods {
            if candidate.name == method.name
                || candidate.name == getter_name(&method.name, &candidate.return_type)
            {
                targets.push(Element::Method {
                    decl: *owner,
                    index: *index,
                });
            }
        }

        // The modifier returned by `with()` carries the fluent setters.
        if let Some((_, _, with)) = methods.iter().find(|(_, _, m)| m.name == "with") {
            if let Some(modifier) = lookup.find_declaration(&with.return_type.canonical_text())? {
                for (owner, index, candidate) in all_methods(db, modifier)? {
                    if candidate.name == method.name {
                        targets.push(Element::Method { decl: owner, index });
                    }
                }
            }
        }
    } else if let Some(prototype) = lookup.prototype_class_of(id)? {
        let property = if method.name.starts_with("get") || method.name.starts_with("is") {
            property_name(&method.name).unwrap_or_else(|| method.name.clone())
        } else {
            method.name.clone()
        };
        for (owner, index, candidate) in all_methods(db, prototype)? {
            if candidate.name == property {
                targets.push(Element::Method { decl: owner, index });
            }
        }
    }
    Ok(targets)
}

/// Methods of `id` and of every supertype the database knows, nearest first.
fn all_methods(db: &dyn Database, id: DeclId) -> QueryResult<Vec<(DeclId, usize, &MethodData)>> {
    let mut methods = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([id]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        let decl = db.declaration(current)?;
        methods.extend(
            decl.methods
                .iter()
                .enumerate()
                .map(|(index, method)| (current, index, method)),
        );
        for name in decl.extends.iter().chain(&decl.implements) {
            if let Some(parent) = db.find_declaration(name)? {
                queue.push_back(parent);
            }
        }
    }
    Ok(methods)
}
