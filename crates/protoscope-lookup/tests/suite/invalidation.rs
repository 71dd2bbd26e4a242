use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use protoscope_core::{Cancelled, ModuleId};
use protoscope_hir::{Annotation, DeclKind, Declaration};
use protoscope_lookup::{GenerationStrategy, Registry, TEMPLATE_MARKER};

use super::{generated, prototype, strategy, template, Workspace};

#[test]
fn refresh_forgets_entries_from_the_file() {
    let mut ws = Workspace::new();
    let other = ws.source_file("src/main/java/com/x/Other.java");
    ws.add(template("com.x.Tmpl", ws.src, "PROTOTYPE"));
    ws.add(template("com.x.Impl", ws.src, "IMPLEMENTATION"));
    let foo = ws.add(prototype("com.x.FooPrototype", other, Annotation::new("com.x.Tmpl")));

    let registry = Registry::default();
    {
        let mut lookup = registry.session(&ws.db);
        // The first lookup registers the template, which resets the caches.
        assert!(lookup.is_prototype("com.x.FooPrototype").unwrap());
        assert_eq!(lookup.generated_name("com.x.FooPrototype", false).unwrap(), "com.x.Foo");
    }

    ws.db.update_declaration(
        foo,
        prototype("com.x.FooPrototype", other, Annotation::new("com.x.Impl")),
    );
    // Until the host reports the edit the cached answer stands.
    assert_eq!(
        registry.session(&ws.db).generated_name("com.x.FooPrototype", false).unwrap(),
        "com.x.Foo"
    );

    let modules = registry.refresh_cache(&ws.db, other).unwrap();
    assert_eq!(modules, BTreeSet::from([ModuleId::new(7)]));
    let mut lookup = registry.session(&ws.db);
    let desc = lookup.prototype_data("com.x.FooPrototype").unwrap().unwrap();
    assert_eq!(desc.strategy, GenerationStrategy::Implementation);
    assert_eq!(lookup.generated_name("com.x.FooPrototype", false).unwrap(), "com.x.FooImpl");
}

#[test]
fn refreshing_a_template_reclassifies_its_users() {
    let mut ws = Workspace::new();
    let templates = ws.source_file("src/main/java/com/x/Tmpl.java");
    let tmpl = ws.add(template("com.x.Tmpl", templates, "PROTOTYPE"));
    ws.add(prototype("com.x.FooPrototype", ws.src, Annotation::new("com.x.Tmpl")));

    let registry = Registry::default();
    assert!(registry.session(&ws.db).is_prototype("com.x.FooPrototype").unwrap());

    let mut edited = template("com.x.Tmpl", templates, "PROTOTYPE");
    edited.methods[0].default_value = Some(strategy("PLAIN"));
    ws.db.update_declaration(tmpl, edited);
    registry.refresh_cache(&ws.db, templates).unwrap();

    let desc = registry
        .session(&ws.db)
        .prototype_data("com.x.FooPrototype")
        .unwrap()
        .unwrap();
    assert_eq!(desc.strategy, GenerationStrategy::Plain);
}

#[test]
fn refresh_reports_nothing_when_nothing_was_cached() {
    let mut ws = Workspace::new();
    ws.add(generated("com.x.Foo", ws.src, "com.x.FooPrototype"));
    let registry = Registry::default();
    assert!(registry.refresh_cache(&ws.db, ws.src).unwrap().is_empty());

    assert!(registry.session(&ws.db).is_generated("com.x.Foo").unwrap());
    assert_eq!(registry.refresh_cache(&ws.db, ws.src).unwrap().len(), 1);
    assert!(registry.refresh_cache(&ws.db, ws.src).unwrap().is_empty());
}

#[test]
fn close_returns_to_a_fresh_registry() {
    let mut ws = Workspace::new();
    ws.add(template("com.x.Tmpl", ws.src, "PROTOTYPE"));
    let foo = ws.add(prototype("com.x.FooPrototype", ws.src, Annotation::new("com.x.Tmpl")));

    let registry = Registry::default();
    assert!(registry.session(&ws.db).is_prototype("com.x.FooPrototype").unwrap());
    registry.close();

    ws.db.remove_declaration(foo);
    let mut lookup = registry.session(&ws.db);
    assert!(!lookup.is_prototype("com.x.FooPrototype").unwrap());
}

#[test]
fn cancellation_reaches_the_caller() {
    let mut ws = Workspace::new();
    ws.add(template("com.x.Tmpl", ws.src, "PROTOTYPE"));
    ws.add(prototype("com.x.FooPrototype", ws.src, Annotation::new("com.x.Tmpl")));

    let registry = Registry::default();
    ws.db.set_cancelled(true);
    {
        let mut lookup = registry.session(&ws.db);
        assert_eq!(lookup.prototype_data("com.x.FooPrototype"), Err(Cancelled));
        assert_eq!(lookup.is_generated("com.x.FooPrototype"), Err(Cancelled));
        assert!(!lookup.is_registering());
    }
    assert_eq!(registry.refresh_cache(&ws.db, ws.src), Err(Cancelled));

    ws.db.set_cancelled(false);
    assert!(registry.session(&ws.db).is_prototype("com.x.FooPrototype").unwrap());
}

#[test]
fn unready_index_answers_nothing_and_caches_nothing() {
    let mut ws = Workspace::new();
    ws.add(template("com.x.Tmpl", ws.src, "PROTOTYPE"));
    ws.add(prototype("com.x.FooPrototype", ws.src, Annotation::new("com.x.Tmpl")));

    let registry = Registry::default();
    ws.db.set_index_ready(false);
    assert_eq!(registry.session(&ws.db).prototype_data("com.x.FooPrototype"), Ok(None));

    ws.db.set_index_ready(true);
    assert!(registry.session(&ws.db).is_prototype("com.x.FooPrototype").unwrap());
}

#[test]
fn malformed_usage_is_not_cached() {
    let mut ws = Workspace::new();
    ws.add(template("com.x.Tmpl", ws.src, "PROTOTYPE"));
    let foo = ws.add(prototype(
        "com.x.FooPrototype",
        ws.src,
        Annotation::new("com.x.Tmpl").with_attr("strategy", strategy("SIDEWAYS")),
    ));

    let registry = Registry::default();
    assert_eq!(registry.session(&ws.db).prototype_data("com.x.FooPrototype"), Ok(None));

    ws.db.update_declaration(
        foo,
        prototype("com.x.FooPrototype", ws.src, Annotation::new("com.x.Tmpl")),
    );
    assert!(registry.session(&ws.db).is_prototype("com.x.FooPrototype").unwrap());
}

#[test]
fn templates_built_on_an_edited_meta_annotation_are_rediscovered() {
    let mut ws = Workspace::new();
    let metas = ws.source_file("src/main/java/com/x/Meta.java");
    let meta = ws.add(
        Declaration::new(DeclKind::AnnotationType, "com.x.Meta", metas)
            .with_annotation(Annotation::new(TEMPLATE_MARKER)),
    );
    ws.add(
        Declaration::new(DeclKind::AnnotationType, "com.x.Tmpl", ws.src)
            .with_annotation(Annotation::new("com.x.Meta")),
    );
    ws.add(prototype("com.x.FooPrototype", ws.src, Annotation::new("com.x.Tmpl")));

    let registry = Registry::default();
    assert!(registry.session(&ws.db).is_prototype_annotation("com.x.Tmpl").unwrap().is_some());

    ws.db.update_declaration(
        meta,
        Declaration::new(DeclKind::AnnotationType, "com.x.Meta", metas),
    );
    registry.refresh_cache(&ws.db, metas).unwrap();

    let mut lookup = registry.session(&ws.db);
    assert_eq!(lookup.is_prototype_annotation("com.x.Tmpl").unwrap(), None);
    assert!(!lookup.is_prototype("com.x.FooPrototype").unwrap());
}

#[test]
fn validation_annotations_follow_an_edited_meta_annotation() {
    const VALIDATE: &str = "net.binis.codegen.annotation.validation.Validate";
    let mut ws = Workspace::new();
    let checks = ws.source_file("src/main/java/com/x/Checked.java");
    let checked = ws.add(
        Declaration::new(DeclKind::AnnotationType, "com.x.Checked", checks)
            .with_annotation(Annotation::new(VALIDATE)),
    );
    ws.add(
        Declaration::new(DeclKind::AnnotationType, "com.x.NotBlank", ws.src)
            .with_annotation(Annotation::new("com.x.Checked")),
    );

    let registry = Registry::default();
    assert!(registry.session(&ws.db).is_validation_annotation("com.x.NotBlank").unwrap().is_some());

    ws.db.update_declaration(
        checked,
        Declaration::new(DeclKind::AnnotationType, "com.x.Checked", checks),
    );
    assert_eq!(
        registry.refresh_cache(&ws.db, checks).unwrap(),
        BTreeSet::from([ModuleId::new(7)])
    );
    assert_eq!(registry.session(&ws.db).is_validation_annotation("com.x.NotBlank").unwrap(), None);
}
