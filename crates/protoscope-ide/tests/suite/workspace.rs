use pretty_assertions::assert_eq;
use protoscope_config::DEFAULT_GENERATED_MARKER;
use protoscope_ide::CodegenIde;
use tempfile::tempdir;

/// The only test in this binary that installs the global subscriber.
#[test]
fn workspace_configuration_drives_logging_and_features() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("protoscope.log");
    std::fs::write(
        dir.path().join("protoscope.toml"),
        format!(
            "[logging]\nlevel = \"warning\"\nstderr = false\nfile = '{}'\n\n\
             [features]\nfluent_highlighting = false\n\n\
             [discovery]\ngenerated_markers = [\"com.x.Generated\"]\n",
            log.display()
        ),
    )
    .unwrap();

    let ide = CodegenIde::open_workspace(dir.path()).unwrap();
    assert!(!ide.features().fluent_highlighting);
    assert!(ide.features().prototype_usage_inspection);
    assert_eq!(ide.registry().config().generated_markers, vec!["com.x.Generated"]);
    assert!(log.is_file());

    let bare = tempdir().unwrap();
    let defaults = CodegenIde::open_workspace(bare.path()).unwrap();
    assert!(defaults.features().fluent_highlighting);
    assert_eq!(
        defaults.registry().config().generated_markers,
        vec![DEFAULT_GENERATED_MARKER]
    );
}

#[test]
fn malformed_configuration_is_reported() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("protoscope.toml"), "[features]\nunknown = true\n").unwrap();
    assert!(CodegenIde::open_workspace(dir.path()).is_err());
}
