use pretty_assertions::assert_eq;
use protoscope_config::DEFAULT_GENERATED_MARKER;
use protoscope_hir::{Annotation, AttributeValue, DeclKind, Declaration};
use protoscope_lookup::{Registry, RegistryConfig, CODE_PROTOTYPE};

use super::{generated, prototype, text, Workspace};

#[test]
fn generated_marker_points_back_to_prototype() {
    let mut ws = Workspace::new();
    let proto = ws.add(prototype(
        "com.x.FooPrototype",
        ws.src,
        Annotation::new(CODE_PROTOTYPE),
    ));
    let foo = ws.add(generated("com.x.Foo", ws.src, "com.x.FooPrototype"));

    let registry = Registry::default();
    let mut lookup = registry.session(&ws.db);
    assert!(lookup.is_generated("com.x.Foo").unwrap());
    assert_eq!(lookup.prototype_class("com.x.Foo").unwrap(), Some(proto));
    assert_eq!(lookup.prototype_class_of(foo).unwrap(), Some(proto));
    assert_eq!(
        lookup.prototype_of("com.x.Foo").unwrap().as_deref(),
        Some("com.x.FooPrototype")
    );
    assert!(!lookup.is_generated("com.x.FooPrototype").unwrap());
    assert!(lookup.is_prototype("com.x.FooPrototype").unwrap());
}

#[test]
fn nested_declarations_inherit_generated_status() {
    let mut ws = Workspace::new();
    ws.add(prototype("com.x.FooPrototype", ws.src, Annotation::new(CODE_PROTOTYPE)));
    let outer = ws.add(generated("com.x.Foo", ws.src, "com.x.FooPrototype"));
    let inner = ws.add(
        Declaration::new(DeclKind::Interface, "com.x.Foo.Modify", ws.src).with_parent(outer),
    );

    let registry = Registry::default();
    let mut lookup = registry.session(&ws.db);
    assert!(lookup.is_generated_decl(inner).unwrap());
    assert!(!lookup.is_generated("com.x.Foo.Modify").unwrap());
    assert_eq!(lookup.prototype_class_of(inner).unwrap(), lookup.find_declaration("com.x.FooPrototype").unwrap());
}

#[test]
fn array_valued_markers_and_custom_markers() {
    let mut ws = Workspace::new();
    ws.add(
        Declaration::new(DeclKind::Class, "com.x.Bar", ws.src).with_annotation(
            Annotation::new(DEFAULT_GENERATED_MARKER)
                .with_attr("value", AttributeValue::Array(vec![text("com.x.BarPrototype")])),
        ),
    );
    ws.add(
        Declaration::new(DeclKind::Class, "com.x.Baz", ws.src).with_annotation(
            Annotation::new("com.x.Made").with_attr("value", text("com.x.BazPrototype")),
        ),
    );

    let registry = Registry::default();
    let mut lookup = registry.session(&ws.db);
    assert_eq!(
        lookup.prototype_of("com.x.Bar").unwrap().as_deref(),
        Some("com.x.BarPrototype")
    );
    // The prototype itself is not in the project; the generated type still
    // is generated, it just has nowhere to navigate to.
    assert_eq!(lookup.prototype_class("com.x.Bar").unwrap(), None);
    assert!(!lookup.is_generated("com.x.Baz").unwrap());

    let custom = Registry::new(RegistryConfig {
        generated_markers: vec!["com.x.Made".to_string()],
        ..RegistryConfig::default()
    });
    let mut lookup = custom.session(&ws.db);
    assert!(lookup.is_generated("com.x.Baz").unwrap());
    assert!(!lookup.is_generated("com.x.Bar").unwrap());
}

#[test]
fn plain_declarations_are_not_generated() {
    let mut ws = Workspace::new();
    let plain = ws.add(Declaration::new(DeclKind::Class, "com.x.Plain", ws.src));

    let registry = Registry::default();
    let mut lookup = registry.session(&ws.db);
    assert!(!lookup.is_generated_decl(plain).unwrap());
    assert_eq!(lookup.prototype_of("com.x.Plain").unwrap(), None);
    assert_eq!(lookup.prototype_class_of(plain).unwrap(), None);
    assert!(!lookup.is_generated("com.x.Unknown").unwrap());
}
