//! `config.toml` configuration.
//!
//! ```toml
//! [bridge]
//! max_depth = 128          # deeper nesting converts to null
//! int_overflow = "saturate" # or "nearest"
//!
//! [interpreter]
//! dialect = "standard"     # or "extended"
//! default_function = "main"
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use starlark::syntax::Dialect;
use thiserror::Error;

// ── Public API ────────────────────────────────────────────────────────────────

/// Error loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bridge: BridgeConfig,
    pub interpreter: InterpreterConfig,
}

/// Value bridge limits and policies.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Nesting deeper than this converts to null.  Bounds cyclic inputs.
    pub max_depth: usize,
    /// What to do with Starlark ints that do not fit in an `i64`.
    pub int_overflow: IntOverflow,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self { max_depth: 128, int_overflow: IntOverflow::default() }
    }
}

/// Policy for Starlark integers outside the `i64` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntOverflow {
    /// Clamp to `i64::MIN` / `i64::MAX`.
    #[default]
    Saturate,
    /// Use the nearest double to the exact value.
    Nearest,
}

/// Interpreter settings for each invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    pub dialect: DialectName,
    /// Function called when the host passes no function name.
    pub default_function: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self { dialect: DialectName::default(), default_function: "main".to_owned() }
    }
}

/// Starlark dialect selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectName {
    #[default]
    Standard,
    /// Standard plus top-level `if`/`for`, f-strings and friends.
    Extended,
}

impl DialectName {
    pub fn dialect(self) -> Dialect {
        match self {
            DialectName::Standard => Dialect::Standard,
            DialectName::Extended => Dialect::Extended,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML configuration string.
    pub fn load_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a configuration file from disk.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
        Self::load_str(&s)
    }
}

// ── Path resolution ───────────────────────────────────────────────────────────

/// Determine which configuration file to load, if any.
///
/// Priority: `--config` flag → `STARJS_CONFIG` env var → `config.toml` in
/// the platform config directory (only if it exists).
#[cfg(feature = "cli")]
pub fn resolve_config_path(cli_override: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(p) = cli_override {
        return Some(p.clone());
    }
    if let Ok(p) = std::env::var("STARJS_CONFIG") {
        return Some(PathBuf::from(p));
    }
    directories::ProjectDirs::from("", "", "starjs")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .filter(|p| p.exists())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_default() {
        let c = Config::load_str("").unwrap();
        assert_eq!(c, Config::default());
        assert_eq!(c.bridge.max_depth, 128);
        assert_eq!(c.bridge.int_overflow, IntOverflow::Saturate);
        assert_eq!(c.interpreter.default_function, "main");
        assert_eq!(c.interpreter.dialect, DialectName::Standard);
    }

    #[test]
    fn full_file() {
        let c = Config::load_str(
            "[bridge]\nmax_depth = 8\nint_overflow = \"nearest\"\n\
             [interpreter]\ndialect = \"extended\"\ndefault_function = \"entry\"\n",
        )
        .unwrap();
        assert_eq!(c.bridge.max_depth, 8);
        assert_eq!(c.bridge.int_overflow, IntOverflow::Nearest);
        assert_eq!(c.interpreter.dialect, DialectName::Extended);
        assert_eq!(c.interpreter.default_function, "entry");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let c = Config::load_str("[bridge]\nmax_depth = 4\n").unwrap();
        assert_eq!(c.bridge.max_depth, 4);
        assert_eq!(c.bridge.int_overflow, IntOverflow::Saturate);
        assert_eq!(c.interpreter, InterpreterConfig::default());
    }

    #[test]
    fn unknown_key_is_an_error() {
        assert!(matches!(Config::load_str("[bridge]\ndepth = 4\n"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn bad_policy_is_an_error() {
        assert!(Config::load_str("[bridge]\nint_overflow = \"wrap\"\n").is_err());
    }

    #[test]
    fn load_file_reads_disk() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[interpreter]\ndefault_function = \"go\"").unwrap();
        let c = Config::load_file(f.path()).unwrap();
        assert_eq!(c.interpreter.default_function, "go");
    }

    #[test]
    fn load_file_missing() {
        let err = Config::load_file(Path::new("/nonexistent/starjs.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn explicit_path_wins() {
        let p = PathBuf::from("/tmp/explicit.toml");
        assert_eq!(resolve_config_path(Some(&p)), Some(p));
    }
}
