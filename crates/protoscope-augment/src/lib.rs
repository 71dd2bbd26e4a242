//! Synthetic member augmentation.
//!
//! Prototypes describe code that does not exist until the generator runs.
//! To keep resolution and completion working before that, the [`Augmentor`]
//! synthesises the members the generator will add: members inherited
//! through annotation `extends` clauses, bracketless field views of
//! zero-argument methods, and whatever the prototype's enrichers request.

use std::collections::{HashSet, VecDeque};

use protoscope_config::FeaturesConfig;
use protoscope_core::{Cancelled, DeclId, QueryError, QueryResult};
use protoscope_hir::{Database, Declaration, MethodData, Modifiers, Parameter, Type};
use protoscope_lookup::{AugmentType, EnricherDescriptor, Session};

mod accessors;
mod members;

pub use accessors::{capitalize, getter_name, property_name, setter_name};
pub use members::{VirtualConstructor, VirtualField, VirtualMember, VirtualMethod};

use members::MemberKey;

/// The member category a host asks for. Constructors are methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

/// Modifier bits an enricher may request.
const ENRICHER_MODIFIERS: Modifiers = Modifiers::from_bits(
    Modifiers::PUBLIC.bits()
        | Modifiers::PRIVATE.bits()
        | Modifiers::PROTECTED.bits()
        | Modifiers::STATIC.bits()
        | Modifiers::FINAL.bits(),
);

#[derive(Debug, Clone, Default)]
pub struct Augmentor {
    features: FeaturesConfig,
}

impl Augmentor {
    pub fn new(features: FeaturesConfig) -> Self {
        Self { features }
    }

    /// Members of `kind` the generator will add to `id`.
    ///
    /// Never returns a member that the declaration already has, nor two
    /// members with the same signature. Returns nothing while the registry
    /// is mid-registration.
    pub fn augment(
        &self,
        lookup: &mut Session<'_>,
        id: DeclId,
        kind: MemberKind,
    ) -> Result<Vec<VirtualMember>, Cancelled> {
        if lookup.is_registering() {
            return Ok(Vec::new());
        }
        let decl = match lookup.db().declaration(id) {
            Ok(decl) => decl,
            Err(err) => return contain(id, Err(err)),
        };

        let mut members = Vec::new();
        if decl.is_annotation_type() {
            if kind == MemberKind::Method
                && self.features.annotation_inheritance
                && !decl.extends.is_empty()
            {
                let inherited = self.guarded(lookup, id, |lookup| inherited_elements(lookup, decl));
                members.extend(contain(id, inherited)?);
            }
        } else {
            let relevant = lookup.is_prototype_decl(id)? || lookup.is_generated_decl(id)?;
            if relevant && kind == MemberKind::Field && self.features.bracketless_methods {
                let fields =
                    self.guarded(lookup, id, |lookup| bracketless_fields(lookup.db(), decl));
                members.extend(contain(id, fields)?);
            }
            members.extend(enricher_members(lookup, id, decl, kind)?);
        }

        let mut seen = HashSet::new();
        members.retain(|member| seen.insert(member.key()));
        tracing::trace!(decl = ?id, ?kind, count = members.len(), "augmented declaration");
        Ok(members)
    }

    /// Runs `f` unless `id` is already being augmented further up the stack.
    fn guarded(
        &self,
        lookup: &mut Session<'_>,
        id: DeclId,
        f: impl FnOnce(&mut Session<'_>) -> QueryResult<Vec<VirtualMember>>,
    ) -> QueryResult<Vec<VirtualMember>> {
        if !lookup.begin_augmenting(id) {
            return Ok(Vec::new());
        }
        let result = f(lookup);
        lookup.end_augmenting(id);
        result
    }
}

fn contain(id: DeclId, result: QueryResult<Vec<VirtualMember>>) -> Result<Vec<VirtualMember>, Cancelled> {
    match result {
        Ok(members) => Ok(members),
        Err(QueryError::Cancelled) => Err(Cancelled),
        Err(QueryError::IndexNotReady) => Ok(Vec::new()),
        Err(err) => {
            tracing::warn!(decl = ?id, err = %err, "augmentation failed");
            Ok(Vec::new())
        }
    }
}

/// Elements of every annotation type reachable through `extends`, except
/// those declared locally or synthesised earlier.
fn inherited_elements(
    lookup: &mut Session<'_>,
    decl: &Declaration,
) -> QueryResult<Vec<VirtualMember>> {
    let db = lookup.db();
    let mut names: HashSet<&str> = decl.methods.iter().map(|m| m.name.as_str()).collect();
    let mut members = Vec::new();
    let mut seen = HashSet::new();
    let mut queue: VecDeque<&str> = decl.extends.iter().map(String::as_str).collect();
    while let Some(parent) = queue.pop_front() {
        if !seen.insert(parent) {
            continue;
        }
        let Some((_, parent)) = db.find_declaration_data(parent)? else {
            continue;
        };
        if !parent.is_annotation_type() {
            continue;
        }
        for element in parent.methods.iter().filter(|m| !m.origin.is_augmented()) {
            if names.insert(element.name.as_str()) {
                members.push(VirtualMember::Method(VirtualMethod {
                    name: element.name.clone(),
                    return_type: element.return_type.clone(),
                    params: Vec::new(),
                    modifiers: Modifiers::PUBLIC | Modifiers::ABSTRACT,
                    default_value: element.default_value.clone(),
                }));
            }
        }
        queue.extend(parent.extends.iter().map(String::as_str));
    }
    Ok(members)
}

/// One public field per zero-argument, non-void method, so fluent query
/// code may drop the parentheses.
fn bracketless_fields(db: &dyn Database, decl: &Declaration) -> QueryResult<Vec<VirtualMember>> {
    let mut taken: HashSet<String> = decl.fields.iter().map(|f| f.name.clone()).collect();
    let mut members = Vec::new();
    for method in all_methods(db, decl)? {
        if !method.params.is_empty() || method.return_type.is_void() || method.origin.is_augmented() {
            continue;
        }
        if taken.insert(method.name.clone()) {
            members.push(VirtualMember::Field(VirtualField {
                name: method.name.clone(),
                ty: method.return_type.clone(),
                modifiers: Modifiers::PUBLIC,
            }));
        }
    }
    Ok(members)
}

/// Methods of `decl` and of every supertype the host knows.
fn all_methods<'a>(
    db: &'a dyn Database,
    decl: &'a Declaration,
) -> QueryResult<Vec<&'a MethodData>> {
    let mut methods: Vec<&MethodData> = decl.methods.iter().collect();
    let mut seen = HashSet::new();
    let mut queue: VecDeque<&str> = decl
        .extends
        .iter()
        .chain(&decl.implements)
        .map(String::as_str)
        .collect();
    while let Some(name) = queue.pop_front() {
        if !seen.insert(name) {
            continue;
        }
        if let Some((_, parent)) = db.find_declaration_data(name)? {
            methods.extend(parent.methods.iter());
            queue.extend(parent.extends.iter().chain(&parent.implements).map(String::as_str));
        }
    }
    Ok(methods)
}

fn enricher_members(
    lookup: &mut Session<'_>,
    id: DeclId,
    decl: &Declaration,
    kind: MemberKind,
) -> Result<Vec<VirtualMember>, Cancelled> {
    let Some(desc) = lookup.prototype_data_of(id)? else {
        return Ok(Vec::new());
    };
    let mut members = Vec::new();
    for enricher in &desc.enrichers {
        let Some(adds) = enricher.adds else {
            continue;
        };
        let wanted = if adds.adds_fields() {
            MemberKind::Field
        } else {
            MemberKind::Method
        };
        if wanted != kind {
            continue;
        }
        match adds {
            AugmentType::Field => members.extend(enricher_field(decl, enricher)),
            AugmentType::Method => members.extend(enricher_method(decl, enricher)),
            AugmentType::Constructor => members.extend(enricher_constructor(decl, enricher)),
            AugmentType::Getter => members.extend(getters(decl)),
            AugmentType::Setter => members.extend(setters(decl)),
        }
    }
    Ok(members)
}

fn has_name_and_type(enricher: &EnricherDescriptor) -> bool {
    !enricher.name.trim().is_empty() && !enricher.ty.trim().is_empty()
}

fn enricher_field(decl: &Declaration, enricher: &EnricherDescriptor) -> Option<VirtualMember> {
    if !has_name_and_type(enricher) || decl.field(&enricher.name).is_some() {
        return None;
    }
    Some(VirtualMember::Field(VirtualField {
        name: enricher.name.clone(),
        ty: enricher.member_type(),
        modifiers: enricher.modifier & ENRICHER_MODIFIERS,
    }))
}

/// Compares parameter lists the way an editor displays them.
fn same_parameters(a: &[Parameter], b: &[Parameter]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(a, b)| a.ty.presentable_text() == b.ty.presentable_text())
}

fn enricher_method(decl: &Declaration, enricher: &EnricherDescriptor) -> Option<VirtualMember> {
    if !has_name_and_type(enricher) {
        return None;
    }
    let params = enricher.parameters_for(decl);
    if decl
        .methods_named(&enricher.name)
        .any(|existing| same_parameters(&existing.params, &params))
    {
        return None;
    }
    Some(VirtualMember::Method(VirtualMethod {
        name: enricher.name.clone(),
        return_type: enricher.member_type(),
        params,
        modifiers: enricher.modifier & ENRICHER_MODIFIERS,
        default_value: None,
    }))
}

fn enricher_constructor(
    decl: &Declaration,
    enricher: &EnricherDescriptor,
) -> Option<VirtualMember> {
    let params = enricher.parameters_for(decl);
    if decl
        .constructors
        .iter()
        .any(|existing| same_parameters(&existing.params, &params))
    {
        return None;
    }
    Some(VirtualMember::Constructor(VirtualConstructor {
        name: decl.name.clone(),
        params,
        modifiers: enricher.modifier & ENRICHER_MODIFIERS,
    }))
}

fn getters(decl: &Declaration) -> Vec<VirtualMember> {
    decl.fields
        .iter()
        .filter_map(|field| {
            let name = getter_name(&field.name, &field.ty);
            let exists = decl
                .methods_named(&name)
                .any(|m| m.params.is_empty());
            (!exists).then(|| {
                VirtualMember::Method(VirtualMethod {
                    name,
                    return_type: field.ty.clone(),
                    params: Vec::new(),
                    modifiers: Modifiers::PUBLIC,
                    default_value: None,
                })
            })
        })
        .collect()
}

fn setters(decl: &Declaration) -> Vec<VirtualMember> {
    decl.fields
        .iter()
        .filter(|field| !field.is_static())
        .filter_map(|field| {
            let name = setter_name(&field.name);
            let canonical = field.ty.canonical_text();
            let exists = decl.methods_named(&name).any(|m| {
                m.params.len() == 1 && m.params[0].ty.canonical_text() == canonical
            });
            (!exists).then(|| {
                VirtualMember::Method(VirtualMethod {
                    name,
                    return_type: Type::Void,
                    params: vec![Parameter::new(field.name.clone(), field.ty.clone())],
                    modifiers: Modifiers::PUBLIC,
                    default_value: None,
                })
            })
        })
        .collect()
}
