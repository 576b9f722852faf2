//! Named environment variables and their defaults.
//!
//! Every variable is read through an [`EnvSource`] so that resolution can be
//! exercised against an in-memory environment ([`MapEnv`]) as well as the real
//! process environment ([`ProcessEnv`]).
//!
//! ## Variables
//! - `JANIS_CONFIGPATH` - Config file (default: `~/.janis/janis.conf`)
//! - `JANIS_CONFIGDIR` - Config directory (default: `~/.janis/`)
//! - `JANIS_EXCECUTIONDIR` - Execution directory (default: `~/janis/execution/`)
//! - `JANIS_SEARCHPATH` - Extra search path, appended to `searchPaths`
//! - `JANIS_RECIPEPATHS` - Comma separated recipe files
//! - `JANIS_RECIPEDIRECTORY` - Comma separated recipe directories
//! - `JANIS_CROMWELLJAR` - Cromwell jar

use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read access to environment variables and the user's home directory.
pub trait EnvSource: Send + Sync {
    /// Value of the variable, if set.
    fn var(&self, key: &str) -> Option<String>;

    /// The home directory defaults are rooted in.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Shared handle to an environment source.
pub type SharedEnv = Arc<dyn EnvSource>;

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

impl ProcessEnv {
    pub fn shared() -> SharedEnv {
        Arc::new(ProcessEnv)
    }
}

/// In-memory environment, used by tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
    home: Option<PathBuf>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn shared(self) -> SharedEnv {
        Arc::new(self)
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}

/// A resolved variable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Single(String),
    List(Vec<String>),
}

impl EnvValue {
    pub fn into_string(self) -> Option<String> {
        match self {
            EnvValue::Single(s) => Some(s),
            EnvValue::List(items) => items.into_iter().next(),
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            EnvValue::Single(s) => vec![s],
            EnvValue::List(items) => items,
        }
    }
}

/// The fixed set of environment variables the configuration reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvVariable {
    ConfigPath,
    ConfigDir,
    ExecDir,
    SearchPath,
    RecipePaths,
    RecipeDirectory,
    EngineJarPath,
}

impl std::fmt::Display for EnvVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl EnvVariable {
    pub const ALL: [EnvVariable; 7] = [
        EnvVariable::ConfigPath,
        EnvVariable::ConfigDir,
        EnvVariable::ExecDir,
        EnvVariable::SearchPath,
        EnvVariable::RecipePaths,
        EnvVariable::RecipeDirectory,
        EnvVariable::EngineJarPath,
    ];

    /// Name of the environment variable.
    pub fn key(&self) -> &'static str {
        match self {
            EnvVariable::ConfigPath => "JANIS_CONFIGPATH",
            EnvVariable::ConfigDir => "JANIS_CONFIGDIR",
            // Misspelling is load-bearing: existing installs export this name.
            EnvVariable::ExecDir => "JANIS_EXCECUTIONDIR",
            EnvVariable::SearchPath => "JANIS_SEARCHPATH",
            EnvVariable::RecipePaths => "JANIS_RECIPEPATHS",
            EnvVariable::RecipeDirectory => "JANIS_RECIPEDIRECTORY",
            EnvVariable::EngineJarPath => "JANIS_CROMWELLJAR",
        }
    }

    /// Whether the raw value is a comma separated list.
    pub fn is_list(&self) -> bool {
        matches!(self, EnvVariable::RecipePaths | EnvVariable::RecipeDirectory)
    }

    /// Hard-coded default for this variable.
    ///
    /// Variables without a default rule return [`ConfigError::UnhandledVariable`].
    pub fn default_value(&self, env: &dyn EnvSource) -> ConfigResult<EnvValue> {
        let home = env.home_dir().unwrap_or_default();
        let under_home = |rel: &str| EnvValue::Single(home.join(rel).to_string_lossy().into_owned());

        match self {
            EnvVariable::ConfigDir => Ok(under_home(".janis/")),
            EnvVariable::ExecDir => Ok(under_home("janis/execution/")),
            EnvVariable::ConfigPath => Ok(under_home(".janis/janis.conf")),
            EnvVariable::RecipePaths | EnvVariable::RecipeDirectory => Ok(EnvValue::List(vec![])),
            EnvVariable::SearchPath | EnvVariable::EngineJarPath => {
                Err(ConfigError::UnhandledVariable { name: self.key() })
            }
        }
    }

    /// Look the variable up, optionally falling back to its default.
    ///
    /// An empty value counts as unset.
    pub fn resolve(&self, env: &dyn EnvSource, include_default: bool) -> ConfigResult<Option<EnvValue>> {
        let raw = env.var(self.key()).filter(|v| !v.is_empty());

        match raw {
            Some(value) if self.is_list() => Ok(Some(EnvValue::List(split_list(&value)))),
            Some(value) => Ok(Some(EnvValue::Single(value))),
            None if include_default => self.default_value(env).map(Some),
            None => Ok(None),
        }
    }

    pub fn resolve_string(&self, env: &dyn EnvSource, include_default: bool) -> ConfigResult<Option<String>> {
        Ok(self.resolve(env, include_default)?.and_then(EnvValue::into_string))
    }

    pub fn resolve_list(&self, env: &dyn EnvSource, include_default: bool) -> ConfigResult<Vec<String>> {
        Ok(self
            .resolve(env, include_default)?
            .map(EnvValue::into_list)
            .unwrap_or_default())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Expand a leading `~` against the source's home directory.
pub fn expand_home(path: &str, env: &dyn EnvSource) -> PathBuf {
    let home = || env.home_dir().unwrap_or_default();
    if path == "~" {
        return home();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home().join(rest),
        None => Path::new(path).to_path_buf(),
    }
}
