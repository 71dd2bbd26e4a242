use pretty_assertions::assert_eq;
use protoscope_config::FeaturesConfig;
use protoscope_core::{Diagnostic, QuickFix, Severity, Span, TextEdit};
use protoscope_hir::{Annotation, AttributeValue, DeclKind, Declaration, FieldData, Type};
use protoscope_ide::{
    CodegenIde, ENRICHER_TARGET_CODE, PROTOTYPE_USED_CODE, STRATEGY_TARGET_CODE,
};
use protoscope_lookup::{Registry, CODE_AUGMENT, CODE_PROTOTYPE, VALIDATION_ROOTS};

use super::{generated, ide, plain, prototype, Workspace, GENERATED_PATH};

const SERVICE_PATH: &str = "src/main/java/com/x/Service.java";

#[test]
fn prototype_used_from_plain_code_is_rewritten_to_generated_type() {
    let mut ws = Workspace::new();
    let gen_file = ws.file(GENERATED_PATH);
    let service_file = ws.file(SERVICE_PATH);
    ws.add(prototype("com.x.FooPrototype", ws.src));
    ws.add(generated("com.x.Foo", gen_file, "com.x.FooPrototype"));
    let service = ws.add(plain("com.x.Service", service_file));
    let span = ws.reference(service_file, "com.x.FooPrototype", 40, service);

    let diagnostics = ide().prototype_usage_diagnostics(&ws.db, service_file).unwrap();
    assert_eq!(
        diagnostics,
        vec![Diagnostic::warning(
            PROTOTYPE_USED_CODE,
            "Prototype 'FooPrototype' is used directly, use the generated 'Foo' instead",
            Some(span),
        )
        .with_fix(QuickFix {
            title: "Replace with 'com.x.Foo'".to_string(),
            edits: vec![TextEdit::new(service_file, span, "com.x.Foo")],
        })]
    );
}

#[test]
fn no_fix_without_generated_type() {
    let mut ws = Workspace::new();
    let service_file = ws.file(SERVICE_PATH);
    ws.add(prototype("com.x.FooPrototype", ws.src));
    let service = ws.add(plain("com.x.Service", service_file));
    ws.reference(service_file, "com.x.FooPrototype", 40, service);

    let diagnostics = ide().prototype_usage_diagnostics(&ws.db, service_file).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].fixes.is_empty());
}

#[test]
fn prototypes_may_reference_each_other() {
    let mut ws = Workspace::new();
    ws.add(prototype("com.x.FooPrototype", ws.src));
    let bar = ws.add(prototype("com.x.BarPrototype", ws.src));
    ws.reference(ws.src, "com.x.FooPrototype", 120, bar);

    assert_eq!(ide().prototype_usage_diagnostics(&ws.db, ws.src).unwrap(), Vec::new());
}

#[test]
fn prototype_usage_inspection_can_be_disabled() {
    let mut ws = Workspace::new();
    let service_file = ws.file(SERVICE_PATH);
    ws.add(prototype("com.x.FooPrototype", ws.src));
    let service = ws.add(plain("com.x.Service", service_file));
    ws.reference(service_file, "com.x.FooPrototype", 40, service);

    let ide = CodegenIde::new(
        Registry::default(),
        FeaturesConfig {
            prototype_usage_inspection: false,
            ..FeaturesConfig::default()
        },
    );
    assert_eq!(ide.diagnostics(&ws.db, service_file).unwrap(), Vec::new());
}

#[test]
fn enricher_on_unsupported_kind_is_reported_at_its_severity() {
    let mut ws = Workspace::new();
    ws.add(
        Declaration::new(DeclKind::Class, "e.ClassOnly", ws.src).with_annotation(
            Annotation::new(CODE_AUGMENT)
                .with_attr("adds", AttributeValue::enum_constant("AugmentType", "FIELD"))
                .with_attr(
                    "targets",
                    AttributeValue::Array(vec![
                        AttributeValue::enum_constant("AugmentTargetType", "CLASS"),
                        AttributeValue::enum_constant("AugmentTargetType", "ENUM"),
                    ]),
                )
                .with_attr(
                    "severity",
                    AttributeValue::enum_constant("AugmentTargetTypeSeverity", "WARNING"),
                )
                .with_attr("description", AttributeValue::String("class-only counter".into())),
        ),
    );
    let mut proto = prototype("com.x.FooPrototype", ws.src);
    proto.annotations[0] = Annotation::new(CODE_PROTOTYPE)
        .with_attr("enrichers", AttributeValue::Class("e.ClassOnly".to_string()));
    ws.add(proto);

    assert_eq!(
        ide().enricher_diagnostics(&ws.db, ws.src).unwrap(),
        vec![Diagnostic::new(
            Severity::Warning,
            ENRICHER_TARGET_CODE,
            "Enricher 'ClassOnly (class-only counter)' can't be applied to interface. \
             Allowed targets: class, enum",
            Some(Span::new(17, 29)),
        )]
    );
}

#[test]
fn prototype_strategy_requires_an_interface() {
    let mut ws = Workspace::new();
    let mut proto = prototype("com.x.FooPrototype", ws.src);
    proto.kind = DeclKind::Class;
    ws.add(proto);
    let mut plain_strategy = prototype("com.x.BarPrototype", ws.src);
    plain_strategy.kind = DeclKind::Class;
    plain_strategy.annotations[0] = Annotation::new(CODE_PROTOTYPE).with_attr(
        "strategy",
        AttributeValue::enum_constant(
            "net.binis.codegen.annotation.type.GenerationStrategy",
            "PLAIN",
        ),
    );
    ws.add(plain_strategy);

    let diagnostics = ide().enricher_diagnostics(&ws.db, ws.src).unwrap();
    assert_eq!(
        diagnostics,
        vec![Diagnostic::error(
            STRATEGY_TARGET_CODE,
            "@CodePrototype can only be applied to interfaces",
            Some(Span::new(17, 29)),
        )]
    );
}

#[test]
fn validation_annotations_are_checked_across_the_file() {
    let mut ws = Workspace::new();
    let service_file = ws.file("src/main/java/com/x/Service.java");
    let validate = Annotation::new(VALIDATION_ROOTS[0]).with_span(Span::new(20, 29));
    ws.add(
        plain("com.x.Service", service_file)
            .with_field(FieldData::new("name", Type::string()).with_annotation(validate)),
    );

    let codes: Vec<&str> = ide()
        .diagnostics(&ws.db, service_file)
        .unwrap()
        .iter()
        .map(|d| d.code)
        .collect();
    assert_eq!(codes, vec!["validation-context", "validation-placement"]);
}

#[test]
fn cancellation_reaches_the_caller() {
    let mut ws = Workspace::new();
    ws.add(prototype("com.x.FooPrototype", ws.src));
    ws.db.set_cancelled(true);
    assert!(ide().diagnostics(&ws.db, ws.src).is_err());
}
