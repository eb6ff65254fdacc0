//! bnd-nelua — C header → Nelua binding generator.
//!
//! Parses C headers via libclang, collects their typedefs, enums, structs and
//! function prototypes into one ordered registry, and emits the equivalent
//! Nelua declarations.
//!
//! # Quick start
//!
//! Generate a `.nelua` file from a config:
//!
//! ```no_run
//! use std::path::Path;
//!
//! // Reads config TOML, parses headers, writes the bindings.
//! bnd_nelua::run(Path::new("bnd-nelua.toml"), None).unwrap();
//! ```
//!
//! Or get the text without writing to disk:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let bindings = bnd_nelua::generate(Path::new("bnd-nelua.toml")).unwrap();
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub mod ast;
pub mod clang_ast;
pub mod config;
pub mod emit;
pub mod error;
pub mod model;
pub mod translate;
pub mod walk;

pub use error::Error;
pub use model::Registry;
pub use walk::Walker;

/// Run the full pipeline: load config, parse C headers, emit bindings, and
/// write the output file.
///
/// `config_path` is the path to a `bnd-nelua.toml` configuration file.
/// `output` optionally overrides the output file path from the config.
///
/// Returns the path the bindings were written to.
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let bindings = generate_from_config(&cfg, base_dir)?;

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => base_dir.join(&cfg.output.file),
    };
    std::fs::write(&output_path, &bindings)
        .with_context(|| format!("writing output to {}", output_path.display()))?;

    info!(
        path = %output_path.display(),
        size = bindings.len(),
        "wrote bindings"
    );

    Ok(output_path)
}

/// Parse a `bnd-nelua.toml` config file, walk the referenced C headers, and
/// return the generated bindings without writing to disk.
pub fn generate(config_path: &Path) -> Result<String> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    generate_from_config(&cfg, base_dir)
}

/// Generate bindings from an already-loaded [`config::Config`].
///
/// `base_dir` is the directory relative to which header paths in the config
/// are resolved (typically the parent directory of the TOML file).
pub fn generate_from_config(cfg: &config::Config, base_dir: &Path) -> Result<String> {
    info!(
        library = %cfg.output.library,
        headers = cfg.headers.len(),
        "loaded configuration"
    );

    let clang = clang::Clang::new().map_err(Error::LibclangInit)?;
    let index = clang::Index::new(&clang, false, false);
    let args = cfg.parser_args();

    // One registry for the whole run: later headers resolve names declared
    // by earlier ones.
    let mut registry = Registry::new();
    for header in &cfg.headers {
        let path = config::resolve_header(header, base_dir, &cfg.include_paths);
        // libclang reports locations by the path it opened; keep it canonical
        // so the walker's file filter matches.
        let path = std::fs::canonicalize(&path).unwrap_or(path);
        let root = clang_ast::parse_header(&index, &path, &args)
            .with_context(|| format!("processing {}", path.display()))?;

        let before = registry.len();
        Walker::new(&mut registry, path.clone()).walk(&root);
        info!(
            header = %path.display(),
            entities = registry.len() - before,
            "walked header"
        );
    }

    let bindings = emit::emit(
        &mut registry,
        &cfg.output.library,
        cfg.output.namespace(),
    );

    info!(entities = registry.len(), size = bindings.len(), "generated bindings");

    Ok(bindings)
}
