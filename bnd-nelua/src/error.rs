//! Error taxonomy for the header → binding pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while turning a header into binding declarations.
///
/// `ParseFailure` and `UnsupportedTypeKind` abort the whole run.
/// `UnrecognizedTypedefShape` is only ever logged: the offending typedef is
/// skipped and the walk continues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to initialize libclang: {0}")]
    LibclangInit(String),

    #[error("failed to parse {}: {reason}", path.display())]
    ParseFailure { path: PathBuf, reason: String },

    #[error("unsupported clang type kind {kind} (`{spelling}`)")]
    UnsupportedTypeKind { kind: String, spelling: String },

    #[error("unrecognized typedef shape for `{name}`")]
    UnrecognizedTypedefShape { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
