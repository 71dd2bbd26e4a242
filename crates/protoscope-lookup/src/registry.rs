use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use protoscope_config::{ProtoscopeConfig, DEFAULT_GENERATED_MARKER, DEFAULT_MANIFEST_PATH};
use protoscope_core::{Cancelled, FileId, ModuleId, QueryError};
use protoscope_hir::Database;

use crate::descriptor::PrototypeDescriptor;
use crate::session::Session;
use crate::validation::ValidationDescriptor;
use crate::KNOWN_NON_TEMPLATES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Path of the template manifest inside dependency archives.
    pub manifest_path: String,
    /// Annotations whose `value` names the prototype a type was generated from.
    pub generated_markers: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
            generated_markers: vec![DEFAULT_GENERATED_MARKER.to_string()],
        }
    }
}

impl From<&ProtoscopeConfig> for RegistryConfig {
    fn from(config: &ProtoscopeConfig) -> Self {
        Self {
            manifest_path: config.discovery.manifest_path.clone(),
            generated_markers: config.discovery.generated_markers.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ClassEntry {
    pub(crate) prototype: Option<Arc<PrototypeDescriptor>>,
}

/// Caches for one workspace.
///
/// Lookups populate the caches lazily from many threads at once. Every
/// computation records the cache epoch before it starts and only publishes
/// if no invalidation happened in the meantime, so an invalidated entry is
/// never resurrected by a computation that raced with it.
pub struct Registry {
    pub(crate) config: RegistryConfig,
    epoch: AtomicU64,
    /// Declaration name → its resolved prototype, if any.
    pub(crate) classes: RwLock<HashMap<String, ClassEntry>>,
    /// Template annotation name → template defaults.
    pub(crate) templates: RwLock<HashMap<String, Arc<PrototypeDescriptor>>>,
    /// Every annotation ever registered as a template. Survives blanket
    /// invalidation so re-discovery does not re-trigger it.
    pub(crate) known_templates: RwLock<HashSet<String>>,
    pub(crate) non_templates: RwLock<HashSet<String>>,
    /// Generated declaration name → originating prototype name.
    pub(crate) generated: RwLock<HashMap<String, String>>,
    pub(crate) non_generated: RwLock<HashSet<String>>,
    pub(crate) validators: RwLock<HashMap<String, Arc<ValidationDescriptor>>>,
    /// Name → file of the declaration a cache entry was computed from.
    owners: RwLock<HashMap<String, FileId>>,
    /// Annotation name → templates and validation annotations whose cached
    /// answer was derived from it.
    dependents: RwLock<HashMap<String, HashSet<String>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            epoch: AtomicU64::new(0),
            classes: RwLock::default(),
            templates: RwLock::default(),
            known_templates: RwLock::default(),
            non_templates: RwLock::new(seed_non_templates()),
            generated: RwLock::default(),
            non_generated: RwLock::default(),
            validators: RwLock::default(),
            owners: RwLock::default(),
            dependents: RwLock::default(),
        }
    }

    pub fn open(config: &ProtoscopeConfig) -> Self {
        tracing::debug!(
            manifest_path = %config.discovery.manifest_path,
            markers = ?config.discovery.generated_markers,
            "opening prototype registry"
        );
        Self::new(RegistryConfig::from(config))
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Starts a lookup session against `db`.
    pub fn session<'a>(&'a self, db: &'a dyn Database) -> Session<'a> {
        Session::new(self, db)
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Inserts `value` unless an invalidation happened since `epoch`, or
    /// another thread already published the key. Returns whether the cache
    /// now holds this computation's value.
    pub(crate) fn publish<K: Eq + Hash, V>(
        &self,
        map: &RwLock<HashMap<K, V>>,
        key: K,
        value: V,
        epoch: u64,
    ) -> bool {
        let mut guard = map.write();
        if self.epoch() != epoch {
            return false;
        }
        guard.entry(key).or_insert(value);
        true
    }

    pub(crate) fn publish_flag(&self, set: &RwLock<HashSet<String>>, key: &str, epoch: u64) -> bool {
        let mut guard = set.write();
        if self.epoch() != epoch {
            return false;
        }
        guard.insert(key.to_string());
        true
    }

    pub(crate) fn record_owner(&self, name: &str, file: FileId) {
        self.owners.write().insert(name.to_string(), file);
    }

    /// Records that the cached answer for `dependent` was read from `parent`.
    pub(crate) fn record_dependent(&self, parent: &str, dependent: &str) {
        self.dependents
            .write()
            .entry(parent.to_string())
            .or_default()
            .insert(dependent.to_string());
    }

    /// `names` plus everything transitively derived from them.
    fn with_dependents(&self, names: BTreeSet<String>) -> BTreeSet<String> {
        let dependents = self.dependents.read();
        let mut queue: Vec<String> = names.iter().cloned().collect();
        let mut all = names;
        while let Some(name) = queue.pop() {
            for dependent in dependents.get(&name).into_iter().flatten() {
                if all.insert(dependent.clone()) {
                    queue.push(dependent.clone());
                }
            }
        }
        all
    }

    /// Drops every derived entry. Run whenever a new template appears, since
    /// it may reclassify declarations and annotations cached before it.
    pub(crate) fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.templates.write().clear();
        self.classes.write().clear();
        self.generated.write().clear();
        self.non_generated.write().clear();
        *self.non_templates.write() = seed_non_templates();
        tracing::debug!("cleared prototype caches");
    }

    /// Removes every entry computed from a declaration of `file`, and every
    /// template or validation entry derived from one, and returns the build
    /// modules affected so the host may schedule a rebuild.
    ///
    /// Entries are rebuilt lazily on the next lookup.
    pub fn refresh_cache(
        &self,
        db: &dyn Database,
        file: FileId,
    ) -> Result<BTreeSet<ModuleId>, Cancelled> {
        let mut names: BTreeSet<String> = self
            .owners
            .read()
            .iter()
            .filter(|(_, owner)| **owner == file)
            .map(|(name, _)| name.clone())
            .collect();
        match declared_names(db, file) {
            Ok(declared) => names.extend(declared),
            Err(QueryError::Cancelled) => return Err(Cancelled),
            Err(err) => tracing::trace!(?file, err = %err, "declarations unavailable during refresh"),
        }
        let names = self.with_dependents(names);

        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut removed = false;
        let mut template_removed = false;
        for name in &names {
            if self.classes.write().remove(name).is_some() {
                tracing::debug!(name = %name, "removed from classes cache");
                removed = true;
            }
            if self.templates.write().remove(name).is_some() {
                tracing::debug!(name = %name, "removed from templates cache");
                removed = true;
            }
            if self.known_templates.write().remove(name) {
                template_removed = true;
                removed = true;
            }
            if self.non_templates.write().remove(name) {
                tracing::debug!(name = %name, "removed from non-templates cache");
                removed = true;
            }
            if self.generated.write().remove(name).is_some() {
                tracing::debug!(name = %name, "removed from generated cache");
                removed = true;
            }
            if self.non_generated.write().remove(name) {
                tracing::debug!(name = %name, "removed from non-generated cache");
                removed = true;
            }
            if self.validators.write().remove(name).is_some() {
                tracing::debug!(name = %name, "removed from validators cache");
                removed = true;
            }
            self.owners.write().remove(name);
            self.dependents.write().remove(name);
        }
        if template_removed {
            // Declarations in other files may have been resolved against
            // the edited template.
            self.invalidate_all();
        }

        let mut modules = BTreeSet::new();
        if removed {
            match db.file(file) {
                Ok(data) => modules.extend(data.module),
                Err(QueryError::Cancelled) => return Err(Cancelled),
                Err(err) => tracing::trace!(?file, err = %err, "file unavailable during refresh"),
            }
        }
        Ok(modules)
    }

    /// Forgets everything; the registry is back to its freshly opened state.
    pub fn close(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.classes.write().clear();
        self.templates.write().clear();
        self.known_templates.write().clear();
        *self.non_templates.write() = seed_non_templates();
        self.generated.write().clear();
        self.non_generated.write().clear();
        self.validators.write().clear();
        self.owners.write().clear();
        self.dependents.write().clear();
        tracing::debug!("closed prototype registry");
    }
}

fn seed_non_templates() -> HashSet<String> {
    KNOWN_NON_TEMPLATES.iter().map(|s| s.to_string()).collect()
}

fn declared_names(db: &dyn Database, file: FileId) -> Result<Vec<String>, QueryError> {
    let mut names = Vec::new();
    for id in db.declarations_in_file(file)? {
        if let Some(name) = &db.declaration(id)?.qualified_name {
            names.push(name.clone());
        }
    }
    Ok(names)
}
