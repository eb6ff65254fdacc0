//! Configuration types for `bnd-nelua.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub output: OutputConfig,
    /// Headers to bind, processed in order against one shared registry, so a
    /// later header may refer to types declared by an earlier one. Only
    /// declarations located in each header itself are emitted.
    pub headers: Vec<PathBuf>,
    /// Additional directories to search when resolving header paths.  Each
    /// entry is tried in order after `base_dir` (the TOML file's parent
    /// directory).  Also injected as `-I` flags for clang.
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// Extra clang arguments applied to every header (e.g. `-DFOO`).
    #[serde(default)]
    pub clang_args: Vec<String>,
}

/// Output settings.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Native library to link (`## linklib '<library>'`).
    pub library: String,
    /// Name of the record anchoring the library's namespace. Defaults to
    /// `library`.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Output file path (e.g. `clang.nelua`).
    #[serde(default = "default_output_file")]
    pub file: PathBuf,
}

impl OutputConfig {
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(&self.library)
    }
}

fn default_output_file() -> PathBuf {
    PathBuf::from("bindings.nelua")
}

impl Config {
    /// Clang arguments: the configured ones plus a `-I` per include path.
    pub fn parser_args(&self) -> Vec<String> {
        let mut args = self.clang_args.clone();
        for inc in &self.include_paths {
            let flag = format!("-I{}", inc.display());
            if !args.contains(&flag) {
                args.push(flag);
            }
        }
        args
    }
}

/// Resolve a header path by searching `base_dir` first, then each
/// `include_paths` entry.  Absolute paths are returned as-is.  If the
/// file is not found anywhere, falls back to `base_dir.join(path)` so
/// that the caller gets a meaningful error from clang.
pub fn resolve_header(path: &Path, base_dir: &Path, include_paths: &[PathBuf]) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let candidate = base_dir.join(path);
    if candidate.exists() {
        return candidate;
    }
    for inc in include_paths {
        let candidate = inc.join(path);
        if candidate.exists() {
            return candidate;
        }
    }
    base_dir.join(path)
}

/// Load and parse a `bnd-nelua.toml` configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
    parse_config(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))
}

fn parse_config(content: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(content)?)
}
