use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use protoscope_augment::{MemberKind, VirtualMember};
use protoscope_config::DEFAULT_GENERATED_MARKER;
use protoscope_core::{Diagnostic, Span};
use protoscope_hir::{
    Annotation, AnnotationAttribute, AttributeValue, DeclKind, Declaration, FieldData, FileData,
    MethodData, Modifiers, Type,
};
use protoscope_ide::{
    LineMarker, LiteralReference, ANNOTATION_EXTENDS_ERROR, DEFAULT_ANNOTATION, GENERATE_FILES,
};
use protoscope_lookup::{CODE_AUGMENT, CODE_PROTOTYPE};

use super::{ide, plain, prototype, text, Workspace, GENERATED_PATH, MODULE};

fn quoted(name: &str, value: &str, start: usize) -> AnnotationAttribute {
    AnnotationAttribute {
        name: name.to_string(),
        value: text(value),
        span: Some(Span::new(start, start + value.len() + 2)),
    }
}

#[test]
fn marker_and_default_literals_resolve_to_declarations() {
    let mut ws = Workspace::new();
    let gen_file = ws.file(GENERATED_PATH);
    let proto = ws.add(prototype("com.x.FooPrototype", ws.src));

    let mut marker = Annotation::new(DEFAULT_GENERATED_MARKER);
    marker.attributes.push(quoted("value", "com.x.FooPrototype", 12));
    marker.attributes.push(quoted("comments", "com.x.FooPrototype", 40));
    let mut default = Annotation::new(DEFAULT_ANNOTATION);
    default.attributes.push(quoted("value", "com.x.FooPrototype", 90));
    let mut missing = Annotation::new(DEFAULT_ANNOTATION);
    missing.attributes.push(quoted("value", "com.x.Missing", 130));
    ws.add(
        Declaration::new(DeclKind::Interface, "com.x.Foo", gen_file)
            .with_annotation(marker)
            .with_method(
                MethodData::new("type", Type::string())
                    .with_annotation(default)
                    .with_annotation(missing),
            ),
    );

    assert_eq!(
        ide().literal_references(&ws.db, gen_file).unwrap(),
        vec![
            LiteralReference {
                span: Span::new(13, 31),
                name: "com.x.FooPrototype".to_string(),
                target: proto,
            },
            LiteralReference {
                span: Span::new(91, 109),
                name: "com.x.FooPrototype".to_string(),
                target: proto,
            },
        ]
    );
}

/// A prototype whose constructor enricher takes its private fields and
/// silences the host's complaint about them.
fn suppressing_workspace(ws: &mut Workspace) {
    ws.add(
        Declaration::new(DeclKind::Class, "e.AllArgs", ws.src).with_annotation(
            Annotation::new(CODE_AUGMENT)
                .with_attr("adds", AttributeValue::enum_constant("AugmentType", "CONSTRUCTOR"))
                .with_attr(
                    "parameters",
                    AttributeValue::Annotation(Box::new(
                        Annotation::new("CodeAugmentParameters")
                            .with_attr("filter", text("FIELDS|PRIVATE"))
                            .with_attr("suppresses", text("Variable '{name}' of type {type} is never assigned")),
                    )),
                ),
        ),
    );
    let mut proto = prototype("com.x.FooPrototype", ws.src)
        .with_field(FieldData::new("count", Type::int()));
    proto.annotations[0] = Annotation::new(CODE_PROTOTYPE)
        .with_attr("enrichers", AttributeValue::Class("e.AllArgs".to_string()));
    ws.add(proto);
    ws.add(
        Declaration::new(DeclKind::AnnotationType, "com.x.Ext", ws.src)
            .with_extends("com.x.Base")
            .with_span(Span::new(300, 400)),
    );
    ws.add(
        Declaration::new(DeclKind::Class, "com.x.Plain", ws.src).with_span(Span::new(500, 600)),
    );
}

#[test]
fn enricher_suppressions_and_annotation_extends_are_filtered() {
    let mut ws = Workspace::with_codegen();
    suppressing_workspace(&mut ws);
    let ide = ide();
    let accept = |message: &str, at: usize| {
        let diagnostic = Diagnostic::error("host", message, Some(Span::new(at, at + 3)));
        ide.accept_diagnostic(&ws.db, ws.src, &diagnostic).unwrap()
    };

    assert!(!accept("Variable 'count' of type int is never assigned", 50));
    assert!(accept("Variable 'other' of type int is never assigned", 50));
    assert!(!accept(ANNOTATION_EXTENDS_ERROR, 310));
    assert!(accept(ANNOTATION_EXTENDS_ERROR, 510));
    assert!(accept("Variable 'count' of type int is never assigned", 700));
}

#[test]
fn host_diagnostics_pass_without_the_generator() {
    let mut ws = Workspace::new();
    suppressing_workspace(&mut ws);
    let diagnostic = Diagnostic::error("host", ANNOTATION_EXTENDS_ERROR, Some(Span::new(310, 313)));
    assert!(ide().accept_diagnostic(&ws.db, ws.src, &diagnostic).unwrap());
}

#[test]
fn prototypes_get_a_generate_marker() {
    let mut ws = Workspace::new();
    let proto = ws.add(prototype("com.x.FooPrototype", ws.src));
    ws.add(plain("com.x.Helper", ws.src));

    assert_eq!(
        ide().line_markers(&ws.db, ws.src).unwrap(),
        vec![LineMarker {
            decl: proto,
            span: Some(Span::new(17, 29)),
            tooltip: GENERATE_FILES,
            module: Some(MODULE),
        }]
    );
}

#[test]
fn saving_a_prototype_refreshes_its_module() {
    let mut ws = Workspace::new();
    let resources = ws
        .db
        .add_file(FileData::source("src/main/resources/app.properties").with_module(MODULE));
    let proto = ws.add(prototype("com.x.FooPrototype", ws.src));

    let ide = ide();
    // The first lookup registers the root template, which resets the caches.
    assert!(ide.session(&ws.db).is_prototype("com.x.FooPrototype").unwrap());
    assert!(ide.session(&ws.db).is_prototype("com.x.FooPrototype").unwrap());

    let mut edited = prototype("com.x.FooPrototype", ws.src);
    edited.annotations.clear();
    ws.db.update_declaration(proto, edited);

    assert_eq!(ide.on_files_saved(&ws.db, &[resources]).unwrap(), BTreeSet::new());
    assert!(ide.session(&ws.db).is_prototype("com.x.FooPrototype").unwrap());

    assert_eq!(
        ide.on_files_saved(&ws.db, &[resources, ws.src]).unwrap(),
        BTreeSet::from([MODULE])
    );
    assert!(!ide.session(&ws.db).is_prototype("com.x.FooPrototype").unwrap());
}

#[test]
fn augmentation_runs_through_the_workspace_registry() {
    let mut ws = Workspace::new();
    let proto = ws.add(
        prototype("com.x.FooPrototype", ws.src)
            .with_method(MethodData::new("title", Type::string()))
            .with_method(
                MethodData::new("touch", Type::Void).with_modifiers(Modifiers::PUBLIC),
            ),
    );

    let fields = ide().augment(&ws.db, proto, MemberKind::Field).unwrap();
    let names: Vec<&str> = fields.iter().map(VirtualMember::name).collect();
    assert_eq!(names, vec!["title"]);
}
