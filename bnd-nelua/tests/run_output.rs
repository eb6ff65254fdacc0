//! `run` writes the bindings to disk; config errors surface with context.

use std::path::Path;

#[test]
fn run_writes_to_override_path() {
    let config = Path::new(env!("CARGO_MANIFEST_DIR")).join("../tests/fixtures/shapes/bnd-nelua.toml");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("shapes.nelua");

    let written = bnd_nelua::run(&config, Some(&out)).expect("run shapes");
    assert_eq!(written, out);

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("## linklib 'shapes'\nglobal shapes = @record{ }\n"));
    assert!(text.contains("global function canvas_close(a0: *Canvas) <cimport> end"));
}

#[test]
fn missing_config_is_reported() {
    let err = bnd_nelua::generate(Path::new("/nonexistent/bnd-nelua.toml"))
        .expect_err("config does not exist");
    let msg = format!("{err:#}");
    assert!(msg.contains("loading config"), "{msg}");
    assert!(msg.contains("/nonexistent/bnd-nelua.toml"), "{msg}");
}
