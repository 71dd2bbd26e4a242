//! Editor front ends over the prototype lookup engine.
//!
//! [`CodegenIde`] owns the [`Registry`] of one workspace and turns lookup
//! answers into things an editor can show: highlights with tooltips,
//! inspections with quick fixes, implicit-usage and find-usages answers,
//! references out of string literals, line markers, and cache refreshes when
//! files are saved. Every entry point borrows the host's [`Database`] for the
//! duration of the call only.
//!
//! Like the lookup engine, every entry point returns `Result<_, Cancelled>`
//! and answers "nothing" for any other failure.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use protoscope_augment::{Augmentor, MemberKind, VirtualMember};
use protoscope_config::{ConfigError, FeaturesConfig, ProtoscopeConfig};
use protoscope_core::{Cancelled, DeclId, FileId, ModuleId, QueryError, QueryResult};
use protoscope_hir::Database;
use protoscope_lookup::{Registry, Session};

mod annotator;
mod filter;
mod inspections;
mod markers;
mod references;
mod usages;

pub use annotator::{Highlight, HighlightKind, HIGHLIGHT_METHODS};
pub use filter::ANNOTATION_EXTENDS_ERROR;
pub use inspections::{ENRICHER_TARGET_CODE, PROTOTYPE_USED_CODE, STRATEGY_TARGET_CODE};
pub use markers::{LineMarker, GENERATE_FILES};
pub use references::{LiteralReference, DEFAULT_ANNOTATION};
pub use usages::Element;

pub struct CodegenIde {
    registry: Registry,
    augmentor: Augmentor,
    features: FeaturesConfig,
    /// Whether the classpath carries the generator. Computed on first use,
    /// forgotten on [`CodegenIde::close`].
    codegen_used: RwLock<Option<bool>>,
}

impl CodegenIde {
    pub fn new(registry: Registry, features: FeaturesConfig) -> Self {
        Self {
            registry,
            augmentor: Augmentor::new(features.clone()),
            features,
            codegen_used: RwLock::new(None),
        }
    }

    /// Starts logging as `[logging]` asks and opens a registry for `config`.
    pub fn open(config: &ProtoscopeConfig) -> Self {
        protoscope_config::init_tracing(&config.logging);
        Self::new(Registry::open(config), config.features.clone())
    }

    /// Opens the workspace at `root` with its `protoscope.toml`, or with
    /// defaults when it has none.
    pub fn open_workspace(root: &Path) -> Result<Self, ConfigError> {
        let (config, path) = protoscope_config::load_for_workspace(root)?;
        let ide = Self::open(&config);
        match path {
            Some(path) => tracing::info!(path = %path.display(), "opened workspace with configuration"),
            None => tracing::info!(root = %root.display(), "opened workspace with default configuration"),
        }
        Ok(ide)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn features(&self) -> &FeaturesConfig {
        &self.features
    }

    pub fn session<'a>(&'a self, db: &'a dyn Database) -> Session<'a> {
        self.registry.session(db)
    }

    /// Whether one of the project's classpath archives is the generator's
    /// own jar.
    pub fn is_codegen_used(&self, db: &dyn Database) -> bool {
        let cached = *self.codegen_used.read();
        if let Some(used) = cached {
            return used;
        }
        let used = db
            .classpath_archives()
            .iter()
            .any(|path| protoscope_archive::is_codegen_archive(path));
        tracing::debug!(used, "detected code generator usage");
        *self.codegen_used.write() = Some(used);
        used
    }

    /// The generator version on the classpath, read from the jar name.
    pub fn codegen_version(&self, db: &dyn Database) -> Option<String> {
        let archives: Vec<PathBuf> = db.classpath_archives();
        protoscope_archive::codegen_version(archives.iter().map(PathBuf::as_path))
    }

    /// Virtual members of `kind` the generator will add to `decl`.
    pub fn augment(
        &self,
        db: &dyn Database,
        decl: DeclId,
        kind: MemberKind,
    ) -> Result<Vec<VirtualMember>, Cancelled> {
        let mut lookup = self.session(db);
        self.augmentor.augment(&mut lookup, decl, kind)
    }

    /// Drops cached answers computed from the saved Java sources and returns
    /// the build modules they belong to. Rebuilding them is up to the host.
    pub fn on_files_saved(
        &self,
        db: &dyn Database,
        files: &[FileId],
    ) -> Result<BTreeSet<ModuleId>, Cancelled> {
        let mut modules = BTreeSet::new();
        for &file in files {
            match db.file(file) {
                Ok(data) if data.is_java_source() => {}
                Ok(_) => continue,
                Err(QueryError::Cancelled) => return Err(Cancelled),
                Err(err) => {
                    tracing::trace!(?file, err = %err, "saved file unavailable");
                    continue;
                }
            }
            modules.extend(self.registry.refresh_cache(db, file)?);
        }
        if !modules.is_empty() {
            tracing::debug!(?modules, "refreshed prototype caches after save");
        }
        Ok(modules)
    }

    /// Forgets everything, including codegen detection.
    pub fn close(&self) {
        self.registry.close();
        *self.codegen_used.write() = None;
    }
}

/// Lets cancellation through and answers "nothing" for any other failure.
fn contain<T: Default>(operation: &'static str, result: QueryResult<T>) -> Result<T, Cancelled> {
    match result {
        Ok(value) => Ok(value),
        Err(QueryError::Cancelled) => Err(Cancelled),
        Err(QueryError::IndexNotReady) => {
            tracing::trace!(operation, "index not ready");
            Ok(T::default())
        }
        Err(err) => {
            tracing::warn!(operation, err = %err, "editor query failed");
            Ok(T::default())
        }
    }
}

/// `path:offset` of a declaration's name, the form navigation links use.
fn navigation_target(db: &dyn Database, id: DeclId) -> QueryResult<String> {
    let decl = db.declaration(id)?;
    let file = db.file(decl.file)?;
    let offset = decl.name_span.or(decl.span).map_or(0, |span| span.start);
    Ok(format!("{}:{offset}", file.path.display()))
}

/// The innermost declaration of `file` whose range covers `offset`.
fn declaration_at(db: &dyn Database, file: FileId, offset: usize) -> QueryResult<Option<DeclId>> {
    let mut best: Option<(DeclId, usize)> = None;
    for id in db.declarations_in_file(file)? {
        let Some(span) = db.declaration(id)?.span else {
            continue;
        };
        if span.contains(offset) && best.map_or(true, |(_, len)| span.len() < len) {
            best = Some((id, span.len()));
        }
    }
    Ok(best.map(|(id, _)| id))
}
