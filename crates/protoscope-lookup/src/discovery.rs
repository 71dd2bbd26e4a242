//! Deciding which annotations are generation templates.
//!
//! An annotation is a template if it is one of the root templates, carries
//! the template marker, or is itself annotated with a template. Annotations
//! shipped in dependency archives are taken from the archive's manifest.

use std::path::Path;
use std::sync::Arc;

use protoscope_archive::{Archive, ManifestEntry};
use protoscope_core::FileId;
use protoscope_hir::{Declaration, FileLocation, MemberOrigin};

use crate::attributes::{apply_attribute, read_annotation, AttributeOrigin};
use crate::descriptor::{CustomValue, PrototypeDescriptor, ENUM_KEY};
use crate::error::{LookupError, LookupResult};
use crate::session::Session;
use crate::{ENUM_PROTOTYPE, ROOT_TEMPLATES, TEMPLATE_MARKER};

impl<'a> Session<'a> {
    pub(crate) fn cached_template(&self, name: &str) -> Option<Arc<PrototypeDescriptor>> {
        self.registry.templates.read().get(name).cloned()
    }

    fn is_non_template(&self, name: &str) -> bool {
        self.registry.non_templates.read().contains(name)
    }

    pub(crate) fn template(&mut self, name: &str) -> LookupResult<Option<Arc<PrototypeDescriptor>>> {
        if let Some(template) = self.cached_template(name) {
            return Ok(Some(template));
        }
        if self.is_non_template(name) || self.ctx.in_progress.contains(name) {
            return Ok(None);
        }
        self.discover_annotation(name)
    }

    fn discover_annotation(&mut self, name: &str) -> LookupResult<Option<Arc<PrototypeDescriptor>>> {
        self.ctx.in_progress.insert(name.to_string());
        let result = self.discover_uncached(name);
        self.ctx.in_progress.remove(name);
        result
    }

    fn discover_uncached(&mut self, name: &str) -> LookupResult<Option<Arc<PrototypeDescriptor>>> {
        let db = self.db();
        if ROOT_TEMPLATES.contains(&name) {
            let decl = db.find_declaration_data(name)?.map(|(_, decl)| decl);
            return self.ensure_template(name, decl);
        }
        let Some((_, decl)) = db.find_declaration_data(name)? else {
            return Ok(None);
        };

        let result = match &db.file(decl.file)?.location {
            FileLocation::Archive { archive } => {
                let entries = match self.read_manifest(archive) {
                    Ok(entries) => entries,
                    Err(err) => {
                        tracing::warn!(name = %name, err = %err, "skipping template manifest");
                        return Ok(None);
                    }
                };
                if entries.is_empty() {
                    self.register_non_template(name, None);
                    return Ok(None);
                }
                for entry in entries.iter().filter(|entry| entry.is_template()) {
                    if self.cached_template(&entry.name).is_none() {
                        self.process_prototype(&entry.name)?;
                    }
                }
                match self.cached_template(name) {
                    Some(template) => Some(template),
                    None => self.check_for_non_registered_templates(decl)?,
                }
            }
            FileLocation::Source => self.check_for_non_registered_templates(decl)?,
        };
        if result.is_none() {
            self.register_non_template(name, Some(decl.file));
        }
        Ok(result)
    }

    fn read_manifest(&self, archive: &Path) -> LookupResult<Vec<ManifestEntry>> {
        Archive::new(archive)
            .annotations_manifest(&self.registry.config.manifest_path)
            .map_err(|err| LookupError::Manifest {
                archive: archive.display().to_string(),
                message: format!("{err:#}"),
            })
    }

    /// Walks the annotations of `decl`, discovering unknown ones. `decl`
    /// becomes a template when it carries the marker or any of its
    /// annotations is a template; the others are recorded as non-templates.
    fn check_for_non_registered_templates(
        &mut self,
        decl: &'a Declaration,
    ) -> LookupResult<Option<Arc<PrototypeDescriptor>>> {
        let Some(own) = decl.qualified_name.as_deref() else {
            return Ok(None);
        };
        let mut result = None;
        for annotation in &decl.annotations {
            let name = annotation.name.as_str();
            if name == TEMPLATE_MARKER {
                result = self.ensure_template(own, Some(decl))?;
                continue;
            }
            if self.is_non_template(name) {
                continue;
            }
            let parent = match self.cached_template(name) {
                Some(template) => Some(template),
                None if !self.ctx.in_progress.contains(name) => self.discover_annotation(name)?,
                None => None,
            };
            if parent.is_some() {
                self.registry.record_dependent(name, own);
                result = self.ensure_template(own, Some(decl))?;
            } else {
                self.register_non_template(name, None);
            }
        }
        Ok(result)
    }

    /// Registers a template entry listed in an archive manifest.
    fn process_prototype(&mut self, name: &str) -> LookupResult<()> {
        let db = self.db();
        let decl = db.find_declaration_data(name)?.map(|(_, decl)| decl);
        if ROOT_TEMPLATES.contains(&name) {
            self.ensure_template(name, decl)?;
            return Ok(());
        }
        let Some(decl) = decl else {
            tracing::debug!(name = %name, "manifest template not on the classpath");
            return Ok(());
        };
        if !decl.has_annotation(TEMPLATE_MARKER) {
            self.register_non_template(name, Some(decl.file));
            return Ok(());
        }
        for annotation in &decl.annotations {
            let parent = annotation.name.as_str();
            if parent == TEMPLATE_MARKER
                || self.ctx.in_progress.contains(parent)
                || self.is_non_template(parent)
                || self.registry.known_templates.read().contains(parent)
            {
                continue;
            }
            self.discover_annotation(parent)?;
        }
        self.ensure_template(name, Some(decl))?;
        Ok(())
    }

    /// Registers `name` as a template if it is not cached yet, and caches
    /// its defaults.
    fn ensure_template(
        &mut self,
        name: &str,
        decl: Option<&'a Declaration>,
    ) -> LookupResult<Option<Arc<PrototypeDescriptor>>> {
        if let Some(template) = self.cached_template(name) {
            return Ok(Some(template));
        }
        self.ctx.registering += 1;
        let result = self.register_template(name, decl);
        self.ctx.registering -= 1;
        result.map(Some)
    }

    fn register_template(
        &mut self,
        name: &str,
        decl: Option<&'a Declaration>,
    ) -> LookupResult<Arc<PrototypeDescriptor>> {
        let is_new = self.registry.known_templates.write().insert(name.to_string());
        if is_new {
            tracing::info!(name = %name, "registered prototype template");
            // A new template may turn cached "plain" declarations and
            // annotations into prototypes.
            self.registry.invalidate_all();
        }

        let epoch = self.registry.epoch();
        let defaults = Arc::new(self.template_defaults(name, decl)?);
        if self
            .registry
            .publish(&self.registry.templates, name.to_string(), defaults.clone(), epoch)
        {
            if let Some(decl) = decl {
                self.registry.record_owner(name, decl.file);
            }
        }
        Ok(defaults)
    }

    /// Defaults inherited from the parent template, overlaid with the
    /// parent usage's attributes and then this template's element defaults.
    fn template_defaults(
        &mut self,
        name: &str,
        decl: Option<&'a Declaration>,
    ) -> LookupResult<PrototypeDescriptor> {
        if !self.ctx.defaults_in_progress.insert(name.to_string()) {
            return Ok(PrototypeDescriptor::default());
        }
        let result = self.template_defaults_uncached(name, decl);
        self.ctx.defaults_in_progress.remove(name);
        result
    }

    fn template_defaults_uncached(
        &mut self,
        name: &str,
        decl: Option<&'a Declaration>,
    ) -> LookupResult<PrototypeDescriptor> {
        let db = self.db();
        let parent = decl.and_then(|decl| {
            let known = self.registry.known_templates.read();
            decl.annotations
                .iter()
                .find(|annotation| annotation.name != name && known.contains(&annotation.name))
        });

        let mut desc = match parent {
            Some(parent) => {
                let mut desc = match self.cached_template(&parent.name) {
                    Some(template) => PrototypeDescriptor::clone(&template),
                    None => {
                        let parent_decl = db
                            .find_declaration_data(&parent.name)?
                            .map(|(_, decl)| decl);
                        self.template_defaults(&parent.name, parent_decl)?
                    }
                };
                read_annotation(parent, &mut desc, self)?;
                desc
            }
            None => PrototypeDescriptor::default(),
        };
        if name == ENUM_PROTOTYPE {
            desc.set_custom(ENUM_KEY, CustomValue::Flag(true));
        }

        if let Some(decl) = decl {
            for method in decl.methods.iter().filter(|m| m.origin == MemberOrigin::Source) {
                if let Some(default) = &method.default_value {
                    apply_attribute(
                        name,
                        &method.name,
                        default,
                        AttributeOrigin::TemplateDefault,
                        &mut desc,
                        self,
                    )?;
                }
            }
        }
        Ok(desc)
    }

    pub(crate) fn register_non_template(&mut self, name: &str, file: Option<FileId>) {
        if self.registry.known_templates.read().contains(name) {
            return;
        }
        if self.registry.non_templates.write().insert(name.to_string()) {
            if let Some(file) = file {
                self.registry.record_owner(name, file);
            }
            tracing::trace!(name = %name, "registered non-template annotation");
        }
    }
}
