//! Recognising declarations produced by the generator and mapping them back
//! to their prototypes.

use protoscope_core::DeclId;
use protoscope_hir::{AttributeValue, Declaration};

use crate::error::LookupResult;
use crate::session::Session;

impl<'a> Session<'a> {
    /// The prototype a declaration was generated from, by name.
    pub(crate) fn generated_origin(&mut self, name: &str) -> LookupResult<Option<String>> {
        let cached = self.registry.generated.read().get(name).cloned();
        if cached.is_some() {
            return Ok(cached);
        }
        if self.registry.non_generated.read().contains(name)
            || self.registry.classes.read().contains_key(name)
        {
            return Ok(None);
        }
        match self.db().find_declaration_data(name)? {
            Some((_, decl)) => self.check_generated(name, decl),
            None => Ok(None),
        }
    }

    /// Like [`Session::generated_origin`]; the enclosing declarations are
    /// consulted first.
    pub(crate) fn generated_decl_origin(&mut self, id: DeclId) -> LookupResult<Option<String>> {
        let decl = self.db().declaration(id)?;
        if let Some(parent) = decl.parent {
            if let Some(origin) = self.generated_decl_origin(parent)? {
                return Ok(Some(origin));
            }
        }
        match decl.qualified_name.as_deref() {
            Some(name) => self.generated_origin(name),
            None => Ok(None),
        }
    }

    /// Resolves (and registers) the prototype declaration named by `origin`.
    pub(crate) fn origin_declaration(&mut self, origin: Option<String>) -> LookupResult<Option<DeclId>> {
        let Some(origin) = origin else {
            return Ok(None);
        };
        let Some(id) = self.db().find_declaration(&origin)? else {
            return Ok(None);
        };
        self.register_class(id)?;
        Ok(Some(id))
    }

    /// Looks for a generated marker naming the originating prototype. The
    /// prototype is registered as a side effect so that navigation from the
    /// generated artifact finds it cached.
    pub(crate) fn check_generated(
        &mut self,
        name: &str,
        decl: &'a Declaration,
    ) -> LookupResult<Option<String>> {
        let cached = self.registry.generated.read().get(name).cloned();
        if cached.is_some() {
            return Ok(cached);
        }
        if self.registry.non_generated.read().contains(name) {
            return Ok(None);
        }

        let epoch = self.registry.epoch();
        let registry = self.registry;
        let origin = registry.config.generated_markers.iter().find_map(|marker| {
            decl.annotations
                .iter()
                .find(|annotation| annotation.name == *marker)?
                .attribute("value")?
                .elements()
                .find_map(AttributeValue::as_str)
        });

        match origin {
            Some(prototype) => {
                if let Some(id) = self.db().find_declaration(prototype)? {
                    self.register_class(id)?;
                }
                if registry.publish(
                    &registry.generated,
                    name.to_string(),
                    prototype.to_string(),
                    epoch,
                ) {
                    registry.record_owner(name, decl.file);
                    tracing::info!(name = %name, prototype = %prototype, "registered generated declaration");
                }
                Ok(Some(prototype.to_string()))
            }
            None => {
                if registry.publish_flag(&registry.non_generated, name, epoch) {
                    registry.record_owner(name, decl.file);
                }
                Ok(None)
            }
        }
    }
}
