//! Settings from the config file and the environment.
//!
//! Command-line flags win over environment variables, which win over the
//! config file. The data directory falls back to a list of conventional
//! locations and finally the current directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

/// Data directory override.
pub const DATA_DIR_ENV: &str = "TABLATOR_DATA_DIR";
/// Enables debug output when set to a true word.
pub const VERBOSE_ENV: &str = "TABLATOR_VERBOSE";
/// Enables trace output when set to a true word.
pub const TRACE_ENV: &str = "TABLATOR_TRACE";

const SYSTEM_DATA_DIRS: &[&str] = &["/usr/local/share/tablator", "/usr/share/tablator"];

/// Tool settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Directory holding the table files.
    pub data_dir: Option<PathBuf>,
    /// Debug output.
    pub verbose: bool,
    /// Trace output.
    pub trace: bool,
    /// File these settings were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Parse a TOML config; `origin` names the source in error messages.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("invalid config {}: {e}", origin.display()))
    }

    /// Read the config file.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried, and a missing file there yields the default settings.
    pub fn load(path: Option<&Path>, env: &impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_path(env) {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        match fs::read_to_string(&path) {
            Ok(text) => {
                let mut config = Self::from_toml_str(&text, &path)?;
                config.data_dir = config.data_dir.map(|dir| expand_home(&dir, env));
                config.source = Some(path);
                Ok(config)
            }
            Err(e) if required || e.kind() != std::io::ErrorKind::NotFound => {
                Err(format!("cannot read config {}: {e}", path.display()))
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// Apply `TABLATOR_VERBOSE` and `TABLATOR_TRACE`.
    pub fn with_env(mut self, env: &impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        if let Some(on) = env_bool(VERBOSE_ENV, env)? {
            self.verbose = on;
        }
        if let Some(on) = env_bool(TRACE_ENV, env)? {
            self.trace = on;
        }
        Ok(self)
    }

    /// Apply command-line switches; a switch can only turn output on.
    pub fn with_flags(mut self, verbose: bool, trace: bool) -> Self {
        self.verbose |= verbose;
        self.trace |= trace;
        self
    }

    /// Override the data directory.
    pub fn with_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.data_dir = dir;
        }
        self
    }

    /// The data directory to use.
    ///
    /// Tried in order: the configured directory, `TABLATOR_DATA_DIR`, the
    /// first existing conventional location, then the current directory.
    pub fn resolve_data_dir(&self, env: &impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        if let Some(dir) = non_empty_var(DATA_DIR_ENV, env) {
            debug!(var = DATA_DIR_ENV, dir = %dir, "data directory from environment");
            return PathBuf::from(dir);
        }
        if let Some(dir) = conventional_data_dirs(env).into_iter().find(|d| d.is_dir()) {
            debug!(dir = %dir.display(), "found data directory");
            return dir;
        }
        PathBuf::from(".")
    }
}

/// Where the config file is looked for when `--config` is not given.
pub fn default_path(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let base = non_empty_var("XDG_CONFIG_HOME", env)
        .map(PathBuf::from)
        .or_else(|| non_empty_var("HOME", env).map(|home| Path::new(&home).join(".config")))?;
    Some(base.join("tablator").join("config.toml"))
}

/// Candidate data directories, most specific first.
pub fn conventional_data_dirs(env: &impl Fn(&str) -> Option<String>) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(xdg) = non_empty_var("XDG_DATA_HOME", env) {
        dirs.push(Path::new(&xdg).join("tablator"));
    }
    if let Some(home) = non_empty_var("HOME", env) {
        dirs.push(Path::new(&home).join(".local/share/tablator"));
    }
    dirs.extend(SYSTEM_DATA_DIRS.iter().map(PathBuf::from));
    dirs
}

/// Interpret a yes/no word, ignoring case.
pub fn parse_bool(word: &str) -> Option<bool> {
    match word.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" | "1" | "enable" => Some(true),
        "no" | "false" | "off" | "0" | "disable" => Some(false),
        _ => None,
    }
}

fn env_bool(var: &str, env: &impl Fn(&str) -> Option<String>) -> Result<Option<bool>, String> {
    match non_empty_var(var, env) {
        None => Ok(None),
        Some(value) => parse_bool(&value)
            .map(Some)
            .ok_or_else(|| format!("{var}: expected yes or no, got \"{value}\"")),
    }
}

fn non_empty_var(var: &str, env: &impl Fn(&str) -> Option<String>) -> Option<String> {
    env(var).filter(|v| !v.is_empty())
}

fn expand_home(path: &Path, env: &impl Fn(&str) -> Option<String>) -> PathBuf {
    match (path.strip_prefix("~"), non_empty_var("HOME", env)) {
        (Ok(rest), Some(home)) => Path::new(&home).join(rest),
        _ => path.to_path_buf(),
    }
}
