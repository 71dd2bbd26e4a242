mod editor;
mod inspections;
mod workspace;

use std::io::Write;

use protoscope_config::{FeaturesConfig, DEFAULT_GENERATED_MARKER};
use protoscope_core::{DeclId, FileId, ModuleId, Span};
use protoscope_hir::{
    Annotation, AttributeValue, DeclKind, Declaration, FileData, MemoryDatabase, TypeReference,
};
use protoscope_ide::CodegenIde;
use protoscope_lookup::{Registry, CODE_PROTOTYPE};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub const MODULE: ModuleId = ModuleId::new(3);

pub const PROTOTYPE_PATH: &str = "src/main/java/com/x/FooPrototype.java";
pub const GENERATED_PATH: &str = "src/main/java/com/x/Foo.java";

/// An in-memory project; `src` holds the prototypes.
pub struct Workspace {
    pub db: MemoryDatabase,
    pub src: FileId,
    _jars: Option<TempDir>,
}

impl Workspace {
    pub fn new() -> Self {
        let mut db = MemoryDatabase::new();
        let src = db.add_file(FileData::source(PROTOTYPE_PATH).with_module(MODULE));
        Self {
            db,
            src,
            _jars: None,
        }
    }

    /// A project whose classpath carries the generator's jar.
    pub fn with_codegen() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("code-generator-1.2.13.jar");
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&jar).unwrap());
        zip.start_file("META-INF/MANIFEST.MF", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"Manifest-Version: 1.0\r\nImplementation-Vendor: Binis Belev\r\n\r\n")
            .unwrap();
        zip.finish().unwrap();

        let mut ws = Self::new();
        ws.db.add_classpath_archive(jar);
        ws._jars = Some(dir);
        ws
    }

    pub fn file(&mut self, path: &str) -> FileId {
        self.db.add_file(FileData::source(path).with_module(MODULE))
    }

    pub fn add(&mut self, decl: Declaration) -> DeclId {
        self.db.add_declaration(decl)
    }

    /// Records a type reference written at `start` inside `enclosing`.
    pub fn reference(&mut self, file: FileId, name: &str, start: usize, enclosing: DeclId) -> Span {
        let span = Span::new(start, start + name.rsplit('.').next().unwrap().len());
        self.db.file_mut(file).unwrap().references.push(TypeReference {
            qualified_name: name.to_string(),
            span,
            enclosing: Some(enclosing),
        });
        span
    }
}

pub fn ide() -> CodegenIde {
    CodegenIde::new(Registry::default(), FeaturesConfig::default())
}

pub fn text(value: &str) -> AttributeValue {
    AttributeValue::String(value.to_string())
}

/// `@CodePrototype public interface FooPrototype`, name at 17..29.
pub fn prototype(name: &str, file: FileId) -> Declaration {
    Declaration::new(DeclKind::Interface, name, file)
        .with_annotation(Annotation::new(CODE_PROTOTYPE))
        .with_span(Span::new(0, 200))
        .with_name_span(Span::new(17, 17 + name.rsplit('.').next().unwrap().len()))
}

/// `@Generated("<origin>") public interface Foo`, name at 50..53.
pub fn generated(name: &str, file: FileId, origin: &str) -> Declaration {
    Declaration::new(DeclKind::Interface, name, file)
        .with_annotation(Annotation::new(DEFAULT_GENERATED_MARKER).with_attr("value", text(origin)))
        .with_span(Span::new(0, 200))
        .with_name_span(Span::new(50, 50 + name.rsplit('.').next().unwrap().len()))
}

pub fn plain(name: &str, file: FileId) -> Declaration {
    Declaration::new(DeclKind::Class, name, file)
        .with_span(Span::new(0, 200))
        .with_name_span(Span::new(13, 13 + name.rsplit('.').next().unwrap().len()))
}
