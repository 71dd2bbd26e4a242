mod generated;
mod invalidation;

use protoscope_config::DEFAULT_GENERATED_MARKER;
use protoscope_core::{DeclId, FileId, ModuleId};
use protoscope_hir::{
    Annotation, AttributeValue, DeclKind, Declaration, FileData, MemoryDatabase, MethodData, Type,
};
use protoscope_lookup::TEMPLATE_MARKER;

pub const STRATEGY_ENUM: &str = "net.binis.codegen.annotation.type.GenerationStrategy";

pub fn strategy(constant: &str) -> AttributeValue {
    AttributeValue::enum_constant(STRATEGY_ENUM, constant)
}

pub fn text(value: &str) -> AttributeValue {
    AttributeValue::String(value.to_string())
}

/// An in-memory project with one source module.
pub struct Workspace {
    pub db: MemoryDatabase,
    pub src: FileId,
}

impl Workspace {
    pub fn new() -> Self {
        let mut db = MemoryDatabase::new();
        let src = db.add_file(
            FileData::source("src/main/java/com/x/Prototypes.java").with_module(ModuleId::new(7)),
        );
        Self { db, src }
    }

    pub fn source_file(&mut self, path: &str) -> FileId {
        self.db
            .add_file(FileData::source(path).with_module(ModuleId::new(7)))
    }

    pub fn add(&mut self, decl: Declaration) -> DeclId {
        self.db.add_declaration(decl)
    }
}

/// A user-defined template: `@CodePrototypeTemplate @interface <name>`.
pub fn template(name: &str, file: FileId, default_strategy: &str) -> Declaration {
    Declaration::new(DeclKind::AnnotationType, name, file)
        .with_annotation(Annotation::new(TEMPLATE_MARKER))
        .with_annotation(Annotation::new("java.lang.annotation.Target"))
        .with_method(MethodData::element(
            "strategy",
            Type::named(STRATEGY_ENUM),
            Some(strategy(default_strategy)),
        ))
        .with_method(MethodData::element(
            "interfaceName",
            Type::string(),
            Some(text("")),
        ))
}

pub fn prototype(name: &str, file: FileId, annotation: Annotation) -> Declaration {
    Declaration::new(DeclKind::Interface, name, file).with_annotation(annotation)
}

pub fn generated(name: &str, file: FileId, origin: &str) -> Declaration {
    Declaration::new(DeclKind::Class, name, file)
        .with_annotation(Annotation::new(DEFAULT_GENERATED_MARKER).with_attr("value", text(origin)))
}
