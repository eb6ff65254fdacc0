//! Integration test: fatal errors abort generation and keep their kind in
//! the error chain.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bnd_nelua::Error;

// libclang allows one `Clang` instance at a time.
static CLANG: Mutex<()> = Mutex::new(());

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../tests/fixtures/errors")
        .join(name)
}

fn generate_err(config: &str) -> anyhow::Error {
    let _guard = CLANG.lock().unwrap_or_else(|e| e.into_inner());
    bnd_nelua::generate(&fixture(config)).expect_err("generation should fail")
}

fn bnd_error(err: &anyhow::Error) -> &Error {
    err.chain()
        .find_map(|e| e.downcast_ref::<Error>())
        .unwrap_or_else(|| panic!("no bnd_nelua::Error in chain: {err:#}"))
}

#[test]
fn unsupported_field_type_is_fatal() {
    let err = generate_err("unsupported.toml");
    match bnd_error(&err) {
        Error::UnsupportedTypeKind { kind, .. } => assert!(kind.contains("Complex"), "{kind}"),
        other => panic!("expected UnsupportedTypeKind, got {other:?}"),
    }
    assert!(format!("{err:#}").contains("complex.h"), "{err:#}");
}

#[test]
fn missing_header_is_a_parse_failure() {
    let err = generate_err("missing.toml");
    match bnd_error(&err) {
        Error::ParseFailure { path, .. } => assert!(path.ends_with("absent.h"), "{path:?}"),
        other => panic!("expected ParseFailure, got {other:?}"),
    }
}
