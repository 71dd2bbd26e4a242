use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use protoscope_core::{DeclId, FileId, ModuleId, QueryError, QueryResult, Span};

use crate::decl::Declaration;
use crate::expr::ExprArena;
use crate::types::Type;

/// Where a file lives: editable project source, or inside a dependency
/// archive (a JAR or an exploded class directory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLocation {
    Source,
    Archive { archive: PathBuf },
}

/// A type reference in source, resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub qualified_name: String,
    pub span: Span,
    /// The innermost declaration containing the reference.
    pub enclosing: Option<DeclId>,
}

#[derive(Debug, Clone)]
pub struct FileData {
    pub path: PathBuf,
    pub location: FileLocation,
    pub module: Option<ModuleId>,
    pub references: Vec<TypeReference>,
    pub exprs: ExprArena,
}

impl FileData {
    pub fn source(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            location: FileLocation::Source,
            module: None,
            references: Vec::new(),
            exprs: ExprArena::default(),
        }
    }

    pub fn in_archive(archive: impl Into<PathBuf>, entry: impl Into<PathBuf>) -> Self {
        Self {
            location: FileLocation::Archive {
                archive: archive.into(),
            },
            ..Self::source(entry)
        }
    }

    pub fn with_module(mut self, module: ModuleId) -> Self {
        self.module = Some(module);
        self
    }

    pub fn is_java_source(&self) -> bool {
        self.location == FileLocation::Source
            && self.path.extension().is_some_and(|ext| ext == "java")
    }
}

/// Structural query interface onto the host's program model.
///
/// Every query may fail with [`QueryError::IndexNotReady`] while the host is
/// indexing, or [`QueryError::Cancelled`] when the host abandons the request.
pub trait Database {
    fn find_declaration(&self, qualified_name: &str) -> QueryResult<Option<DeclId>>;
    fn declaration(&self, id: DeclId) -> QueryResult<&Declaration>;
    fn file(&self, id: FileId) -> QueryResult<&FileData>;
    fn declarations_in_file(&self, file: FileId) -> QueryResult<Vec<DeclId>>;

    /// Dependency archives on the project classpath.
    fn classpath_archives(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    fn find_declaration_data(
        &self,
        qualified_name: &str,
    ) -> QueryResult<Option<(DeclId, &Declaration)>> {
        match self.find_declaration(qualified_name)? {
            Some(id) => Ok(Some((id, self.declaration(id)?))),
            None => Ok(None),
        }
    }
}

/// Simple in-memory database for tests and for hosts that lower their own
/// trees into this model.
pub struct MemoryDatabase {
    next_file: u32,
    next_decl: u32,
    files: HashMap<FileId, FileData>,
    decls: HashMap<DeclId, Declaration>,
    by_name: HashMap<String, DeclId>,
    archives: Vec<PathBuf>,
    index_ready: AtomicBool,
    cancelled: AtomicBool,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self {
            next_file: 0,
            next_decl: 0,
            files: HashMap::new(),
            decls: HashMap::new(),
            by_name: HashMap::new(),
            archives: Vec::new(),
            index_ready: AtomicBool::new(true),
            cancelled: AtomicBool::new(false),
        }
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file: FileData) -> FileId {
        let id = FileId::new(self.next_file);
        self.next_file += 1;
        self.files.insert(id, file);
        id
    }

    pub fn file_mut(&mut self, id: FileId) -> Option<&mut FileData> {
        self.files.get_mut(&id)
    }

    pub fn add_declaration(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId::new(self.next_decl);
        self.next_decl += 1;
        if let Some(name) = &decl.qualified_name {
            self.by_name.insert(name.clone(), id);
        }
        self.decls.insert(id, decl);
        id
    }

    /// Replaces a declaration in place, keeping its id (an edit to the file).
    pub fn update_declaration(&mut self, id: DeclId, decl: Declaration) {
        if let Some(old) = self.decls.get(&id).and_then(|d| d.qualified_name.clone()) {
            self.by_name.remove(&old);
        }
        if let Some(name) = &decl.qualified_name {
            self.by_name.insert(name.clone(), id);
        }
        self.decls.insert(id, decl);
    }

    pub fn remove_declaration(&mut self, id: DeclId) -> Option<Declaration> {
        let decl = self.decls.remove(&id)?;
        if let Some(name) = &decl.qualified_name {
            if self.by_name.get(name) == Some(&id) {
                self.by_name.remove(name);
            }
        }
        Some(decl)
    }

    pub fn declaration_mut(&mut self, id: DeclId) -> Option<&mut Declaration> {
        self.decls.get_mut(&id)
    }

    pub fn add_classpath_archive(&mut self, path: impl Into<PathBuf>) {
        self.archives.push(path.into());
    }

    pub fn set_index_ready(&self, ready: bool) {
        self.index_ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_cancelled(&self, cancelled: bool) {
        self.cancelled.store(cancelled, Ordering::SeqCst);
    }

    fn check(&self) -> QueryResult<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(QueryError::Cancelled);
        }
        if !self.index_ready.load(Ordering::SeqCst) {
            return Err(QueryError::IndexNotReady);
        }
        Ok(())
    }
}

impl Database for MemoryDatabase {
    fn find_declaration(&self, qualified_name: &str) -> QueryResult<Option<DeclId>> {
        self.check()?;
        Ok(self.by_name.get(qualified_name).copied())
    }

    fn declaration(&self, id: DeclId) -> QueryResult<&Declaration> {
        self.check()?;
        self.decls
            .get(&id)
            .ok_or_else(|| QueryError::unresolved(format!("declaration {id:?}")))
    }

    fn file(&self, id: FileId) -> QueryResult<&FileData> {
        self.check()?;
        self.files
            .get(&id)
            .ok_or_else(|| QueryError::unresolved(format!("file {id:?}")))
    }

    fn declarations_in_file(&self, file: FileId) -> QueryResult<Vec<DeclId>> {
        self.check()?;
        let mut ids: Vec<_> = self
            .decls
            .iter()
            .filter(|(_, decl)| decl.file == file)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn classpath_archives(&self) -> Vec<PathBuf> {
        self.archives.clone()
    }
}

/// Whether a value of type `from` can be assigned to the type named `to`:
/// identity, any reference type to `java.lang.Object`, boxing of primitives,
/// or a walk over the supertypes known to `db`.
pub fn is_assignable(db: &dyn Database, from: &Type, to: &str) -> QueryResult<bool> {
    if from.canonical_text() == to {
        return Ok(true);
    }
    let start = match from {
        Type::Void => return Ok(false),
        Type::Primitive(p) => return Ok(p.wrapper() == to || to == "java.lang.Object"),
        Type::Array(_) => return Ok(to == "java.lang.Object"),
        Type::Named(name) => name,
    };
    if to == "java.lang.Object" {
        return Ok(true);
    }

    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start.clone()]);
    while let Some(name) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            continue;
        }
        if name == to {
            return Ok(true);
        }
        if let Some((_, decl)) = db.find_declaration_data(&name)? {
            queue.extend(decl.extends.iter().cloned());
            queue.extend(decl.implements.iter().cloned());
        }
    }
    Ok(false)
}
