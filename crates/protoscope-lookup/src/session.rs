use std::collections::HashSet;
use std::sync::Arc;

use protoscope_core::{Cancelled, DeclId, Diagnostic, QueryError};
use protoscope_hir::{AnnotationSite, Database, Declaration};

use crate::attributes::{read_annotation, EnricherResolver};
use crate::descriptor::PrototypeDescriptor;
use crate::enricher::EnricherDescriptor;
use crate::error::{LookupError, LookupResult};
use crate::naming;
use crate::registry::{ClassEntry, Registry};
use crate::validation::ValidationDescriptor;

/// Recursion guards for one logical request.
///
/// Lookups re-enter each other (registering a class discovers its template,
/// which may discover the template's own meta-annotations, ...). The guards
/// live with the request rather than with the thread so that nested calls
/// see them and unrelated requests never do.
#[derive(Debug, Default)]
pub struct LookupContext {
    /// Annotations whose template discovery is on the stack.
    pub(crate) in_progress: HashSet<String>,
    /// Declarations whose class registration is on the stack.
    pub(crate) registering_classes: HashSet<String>,
    /// Templates whose default computation is on the stack.
    pub(crate) defaults_in_progress: HashSet<String>,
    pub(crate) validation_in_progress: HashSet<String>,
    /// Nesting depth of class/template registration.
    pub(crate) registering: usize,
    augmenting: HashSet<DeclId>,
}

/// A lookup request against one database snapshot.
pub struct Session<'a> {
    pub(crate) registry: &'a Registry,
    db: &'a dyn Database,
    pub(crate) ctx: LookupContext,
}

impl<'a> Session<'a> {
    pub fn new(registry: &'a Registry, db: &'a dyn Database) -> Self {
        Self {
            registry,
            db,
            ctx: LookupContext::default(),
        }
    }

    pub fn db(&self) -> &'a dyn Database {
        self.db
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// `true` while a class or template registration is on this session's
    /// stack. Member synthesis must not run then, since it would observe a
    /// half-built registry.
    pub fn is_registering(&self) -> bool {
        self.ctx.registering > 0
    }

    /// Marks `decl` as being augmented. Returns `false` if it already is,
    /// i.e. the caller is re-entering itself.
    pub fn begin_augmenting(&mut self, decl: DeclId) -> bool {
        self.ctx.augmenting.insert(decl)
    }

    pub fn end_augmenting(&mut self, decl: DeclId) {
        self.ctx.augmenting.remove(&decl);
    }

    pub fn is_augmenting(&self, decl: DeclId) -> bool {
        self.ctx.augmenting.contains(&decl)
    }

    /// Resolves a name, treating "index not ready" as "not found".
    pub fn find_declaration(&mut self, name: &str) -> Result<Option<DeclId>, Cancelled> {
        let result = self.db.find_declaration(name).map_err(LookupError::from);
        self.contain("find_declaration", name, result)
    }

    pub fn register_declaration(&mut self, id: DeclId) -> Result<(), Cancelled> {
        let result = self.register_class(id).map(|_| ());
        self.contain("register_declaration", &format!("{id:?}"), result)
    }

    /// The prototype descriptor of the named declaration, registering it on
    /// first use.
    pub fn prototype_data(
        &mut self,
        name: &str,
    ) -> Result<Option<Arc<PrototypeDescriptor>>, Cancelled> {
        let result = self.prototype_data_inner(name);
        self.contain("prototype_data", name, result)
    }

    pub fn prototype_data_of(
        &mut self,
        id: DeclId,
    ) -> Result<Option<Arc<PrototypeDescriptor>>, Cancelled> {
        let result = self.register_class(id);
        self.contain("prototype_data", &format!("{id:?}"), result)
    }

    pub fn is_prototype(&mut self, name: &str) -> Result<bool, Cancelled> {
        Ok(self.prototype_data(name)?.is_some())
    }

    pub fn is_prototype_decl(&mut self, id: DeclId) -> Result<bool, Cancelled> {
        Ok(self.prototype_data_of(id)?.is_some())
    }

    /// Template defaults for the named annotation if it is a template.
    pub fn is_prototype_annotation(
        &mut self,
        name: &str,
    ) -> Result<Option<Arc<PrototypeDescriptor>>, Cancelled> {
        let result = self.template(name);
        self.contain("is_prototype_annotation", name, result)
    }

    pub fn is_generated(&mut self, name: &str) -> Result<bool, Cancelled> {
        let result = self.generated_origin(name).map(|origin| origin.is_some());
        self.contain("is_generated", name, result)
    }

    /// Like [`Session::is_generated`], but a nested declaration also counts
    /// as generated when any enclosing declaration is.
    pub fn is_generated_decl(&mut self, id: DeclId) -> Result<bool, Cancelled> {
        let result = self.generated_decl_origin(id).map(|origin| origin.is_some());
        self.contain("is_generated", &format!("{id:?}"), result)
    }

    /// Name of the prototype the named declaration was generated from.
    pub fn prototype_of(&mut self, name: &str) -> Result<Option<String>, Cancelled> {
        let result = self.generated_origin(name);
        self.contain("prototype_of", name, result)
    }

    /// The prototype declaration behind a generated declaration.
    pub fn prototype_class(&mut self, name: &str) -> Result<Option<DeclId>, Cancelled> {
        let result = self
            .generated_origin(name)
            .and_then(|origin| self.origin_declaration(origin));
        self.contain("prototype_class", name, result)
    }

    pub fn prototype_class_of(&mut self, id: DeclId) -> Result<Option<DeclId>, Cancelled> {
        let result = self
            .generated_decl_origin(id)
            .and_then(|origin| self.origin_declaration(origin));
        self.contain("prototype_class", &format!("{id:?}"), result)
    }

    /// Qualified name of the artifact generated from the named prototype.
    pub fn generated_name(&mut self, name: &str, is_nested: bool) -> Result<String, Cancelled> {
        let result = self
            .prototype_data_inner(name)
            .map(|desc| naming::generated_name(desc.as_deref(), name, is_nested));
        match self.contain("generated_name", name, result.map(Some))? {
            Some(generated) => Ok(generated),
            None => Ok(naming::generated_name(None, name, is_nested)),
        }
    }

    /// [`Session::generated_name`] with nesting taken from the declaration.
    pub fn generated_name_of(&mut self, name: &str) -> Result<String, Cancelled> {
        let nested = match self.db.find_declaration_data(name) {
            Ok(Some((_, decl))) => decl.parent.is_some(),
            Ok(None) => false,
            Err(QueryError::Cancelled) => return Err(Cancelled),
            Err(_) => false,
        };
        self.generated_name(name, nested)
    }

    pub fn is_validation_annotation(
        &mut self,
        name: &str,
    ) -> Result<Option<Arc<ValidationDescriptor>>, Cancelled> {
        let result = self
            .validation_descriptor(name)
            .map(|desc| desc.is_validation_annotation().then_some(desc));
        self.contain("is_validation_annotation", name, result)
    }

    /// Diagnostics for one validation-annotation usage.
    pub fn check_for_validation_errors(
        &mut self,
        site: &AnnotationSite,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let result = self.validation_errors(site);
        self.contain("check_for_validation_errors", &format!("{:?}", site.decl), result)
    }

    /// Lets cancellation through and turns every other failure into the
    /// "nothing known" answer.
    fn contain<T: Default>(
        &self,
        operation: &'static str,
        name: &str,
        result: LookupResult<T>,
    ) -> Result<T, Cancelled> {
        match result {
            Ok(value) => Ok(value),
            Err(err) if err.is_cancelled() => Err(Cancelled),
            Err(LookupError::Query(QueryError::IndexNotReady)) => {
                tracing::trace!(operation, name = %name, "index not ready");
                Ok(T::default())
            }
            Err(err) => {
                tracing::warn!(operation, name = %name, err = %err, "prototype lookup failed");
                Ok(T::default())
            }
        }
    }

    pub(crate) fn prototype_data_inner(
        &mut self,
        name: &str,
    ) -> LookupResult<Option<Arc<PrototypeDescriptor>>> {
        let cached = self.registry.classes.read().get(name).cloned();
        if let Some(entry) = cached {
            return Ok(entry.prototype);
        }
        match self.db.find_declaration(name)? {
            Some(id) => self.register_class(id),
            None => Ok(None),
        }
    }

    /// Registers a declaration: the first of its annotations that resolves to
    /// a template decides its prototype descriptor.
    pub(crate) fn register_class(
        &mut self,
        id: DeclId,
    ) -> LookupResult<Option<Arc<PrototypeDescriptor>>> {
        let db = self.db;
        let decl = db.declaration(id)?;
        let Some(name) = decl.qualified_name.as_deref() else {
            return Ok(None);
        };
        let cached = self.registry.classes.read().get(name).cloned();
        if let Some(entry) = cached {
            return Ok(entry.prototype);
        }
        if !self.ctx.registering_classes.insert(name.to_string()) {
            return Ok(None);
        }

        self.ctx.registering += 1;
        let result = self.register_uncached(name, decl);
        self.ctx.registering -= 1;
        self.ctx.registering_classes.remove(name);
        result
    }

    fn register_uncached(
        &mut self,
        name: &str,
        decl: &'a Declaration,
    ) -> LookupResult<Option<Arc<PrototypeDescriptor>>> {
        let epoch = self.registry.epoch();
        let mut prototype = None;
        for annotation in &decl.annotations {
            if let Some(template) = self.template(&annotation.name)? {
                let mut desc = PrototypeDescriptor::clone(&template);
                read_annotation(annotation, &mut desc, self)?;
                prototype = Some(Arc::new(desc));
                break;
            }
        }

        let entry = ClassEntry {
            prototype: prototype.clone(),
        };
        if self
            .registry
            .publish(&self.registry.classes, name.to_string(), entry, epoch)
        {
            self.registry.record_owner(name, decl.file);
            tracing::debug!(name = %name, prototype = prototype.is_some(), "registered declaration");
        }
        self.check_generated(name, decl)?;
        Ok(prototype)
    }
}

impl EnricherResolver for Session<'_> {
    fn resolve_enricher(
        &mut self,
        class_name: &str,
    ) -> Result<Option<Arc<EnricherDescriptor>>, LookupError> {
        Ok(self
            .db
            .find_declaration_data(class_name)?
            .map(|(_, decl)| Arc::new(EnricherDescriptor::from_declaration(class_name, decl))))
    }
}
