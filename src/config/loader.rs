//! Configuration loader with layered resolution.
//!
//! Every field resolves as: document value (if set) > environment variable
//! (if set) > hard-coded default. The environment and hard-coded layers are
//! folded into a defaults document first, so each section only ever compares
//! two layers.

use super::merge::{as_string, as_string_list, is_truthy, section, value_for};
use super::recipes::RecipeStore;
use super::types::{CromwellConfig, DEFAULT_ENGINE, EnvironmentConfig, TemplateConfig, keys};
use crate::engines::EngineType;
use crate::env::{EnvSource, EnvVariable, ProcessEnv, SharedEnv, expand_home};
use crate::error::{ConfigError, ConfigResult};
use crate::templates::{EnvironmentTemplate, TemplateRegistry};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the database file kept in the config directory.
const DB_FILE: &str = "janis.db";

/// Fully resolved configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JanisConfiguration {
    pub config_dir: PathBuf,
    pub execution_dir: PathBuf,
    pub search_paths: Vec<String>,
    pub engine: String,
    pub environment: EnvironmentConfig,
    pub cromwell: CromwellConfig,
    pub template: TemplateConfig,
    pub recipes: RecipeStore,
}

/// Environment variable value, or its default.
fn env_or_default(var: EnvVariable, env: &dyn EnvSource) -> Option<String> {
    match var.resolve_string(env, true) {
        Ok(value) => value,
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

/// Hard-coded defaults with environment overrides applied.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Defaults {
    config_dir: Option<String>,
    execution_dir: Option<String>,
    search_paths: Vec<String>,
    engine: &'static str,
    environment: EnvironmentConfig,
    cromwell: CromwellConfig,
    template: TemplateConfig,
    recipes: RecipeDefaults,
}

#[derive(Debug, Default, Serialize)]
struct RecipeDefaults {
    recipes: Map<String, Value>,
    paths: Vec<String>,
    directories: Vec<String>,
}

impl Defaults {
    fn resolve(env: &dyn EnvSource) -> Self {
        Self {
            config_dir: env_or_default(EnvVariable::ConfigDir, env),
            execution_dir: env_or_default(EnvVariable::ExecDir, env),
            search_paths: vec![expand_home("~/janis/", env).to_string_lossy().into_owned()],
            engine: DEFAULT_ENGINE,
            environment: EnvironmentConfig::default(),
            cromwell: CromwellConfig {
                // Found under the config dir or downloaded at launch when unset
                jar_path: EnvVariable::EngineJarPath.resolve_string(env, false).ok().flatten(),
                config_path: None,
            },
            template: TemplateConfig::default(),
            recipes: RecipeDefaults::default(),
        }
    }
}

/// The defaults layer as a document.
pub fn default_document(env: &dyn EnvSource) -> Value {
    serde_json::to_value(Defaults::resolve(env)).unwrap_or_default()
}

impl JanisConfiguration {
    /// Resolve a configuration from an optional document.
    ///
    /// Never fails: anything missing or malformed falls back to defaults.
    pub fn build(doc: Option<&Value>, env: SharedEnv) -> Self {
        let defaults = default_document(env.as_ref());
        let doc = match doc {
            Some(d) if d.is_object() => Some(d),
            Some(Value::Null) | None => None,
            Some(other) => {
                warn!("Ignoring configuration document that is not a mapping: {}", other);
                None
            }
        };
        debug!(from_document = doc.is_some(), "Instantiating JanisConfiguration");

        let path_for = |key: &str| {
            value_for(doc, key, Some(&defaults))
                .and_then(as_string)
                .map(PathBuf::from)
                .unwrap_or_default()
        };
        let config_dir = path_for(keys::CONFIG_DIR);
        let execution_dir = path_for(keys::EXECUTION_DIR);

        let engine = value_for(doc, keys::ENGINE, Some(&defaults))
            .and_then(as_string)
            .unwrap_or_else(|| DEFAULT_ENGINE.to_string());

        let sub = |key: &str| (section(doc, key), section(Some(&defaults), key));

        let (d, def) = sub(keys::ENVIRONMENT);
        let environment = EnvironmentConfig::build(d, def);
        let (d, def) = sub(keys::CROMWELL);
        let cromwell = CromwellConfig::build(d, def);
        let (d, def) = sub(keys::TEMPLATE);
        let template = TemplateConfig::build(d, def);
        let (d, def) = sub(keys::RECIPES);
        let recipes = RecipeStore::build(d, def, Arc::clone(&env));

        let mut search_paths = value_for(doc, keys::SEARCH_PATHS, Some(&defaults))
            .map(as_string_list)
            .unwrap_or_default();
        if let Ok(Some(env_path)) = EnvVariable::SearchPath.resolve_string(env.as_ref(), false)
            && !search_paths.contains(&env_path)
        {
            search_paths.push(env_path);
        }

        Self {
            config_dir,
            execution_dir,
            search_paths,
            engine,
            environment,
            cromwell,
            template,
            recipes,
        }
    }

    /// Configuration with no backing document.
    pub fn defaults(env: SharedEnv) -> Self {
        Self::build(None, env)
    }

    /// Path of the runner's database.
    pub fn db_path(&self) -> PathBuf {
        self.config_dir.join(DB_FILE)
    }

    /// The configured engine as a typed value.
    pub fn engine_type(&self) -> ConfigResult<EngineType> {
        self.engine.parse()
    }

    /// Construct the configured environment template.
    ///
    /// Templates that take an `executionDir` get this configuration's
    /// execution directory unless the template section sets a truthy one.
    pub fn environment_template(&self, registry: &TemplateRegistry) -> ConfigResult<Box<dyn EnvironmentTemplate>> {
        let mut params = self.template.params.clone();
        if !params.get(keys::EXECUTION_DIR).is_some_and(is_truthy) {
            params.insert(
                keys::EXECUTION_DIR.to_string(),
                Value::String(self.execution_dir.to_string_lossy().into_owned()),
            );
        }
        registry.resolve(&self.template.id, &params)
    }

    /// The resolved configuration as a document with the same keys it was read from.
    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Read and parse a configuration document.
///
/// An empty file is a missing document.
pub fn read_document(path: &Path) -> ConfigResult<Option<Value>> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let value: Value = serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?;
    Ok(Some(value).filter(|v| !v.is_null()))
}

/// Configuration loader that locates the backing document.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Loaded configuration
    config: JanisConfiguration,
    /// Path to the config file that was used (if any)
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load using the process environment, trying `candidates` first.
    pub fn load(candidates: &[PathBuf]) -> Self {
        Self::initial_configuration(candidates, ProcessEnv::shared())
    }

    /// Candidate document paths in the order they are tried: the given paths,
    /// then `JANIS_CONFIGPATH`, then `~/.janis/janis.conf`.
    pub fn candidate_paths(explicit: &[PathBuf], env: &dyn EnvSource) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = explicit.to_vec();
        if let Ok(Some(from_env)) = EnvVariable::ConfigPath.resolve_string(env, false) {
            paths.push(PathBuf::from(from_env));
        }
        if let Ok(default) = EnvVariable::ConfigPath.default_value(env)
            && let Some(default) = default.into_string()
        {
            paths.push(PathBuf::from(default));
        }

        paths
            .into_iter()
            .map(|p| expand_home(&p.to_string_lossy(), env))
            .collect()
    }

    /// Use the first candidate that exists and parses; defaults if none does.
    pub fn initial_configuration(candidates: &[PathBuf], env: SharedEnv) -> Self {
        for path in Self::candidate_paths(candidates, env.as_ref()) {
            if !path.exists() {
                continue;
            }
            match read_document(&path) {
                Ok(doc) => {
                    info!("Loading configuration from {}", path.display());
                    return Self {
                        config: JanisConfiguration::build(doc.as_ref(), env),
                        config_path: Some(path),
                    };
                }
                Err(e) => warn!("Skipping configuration: {}", e),
            }
        }

        debug!("No configuration file found, using defaults");
        Self::defaults_only(env)
    }

    /// Load from `path`, or from `JANIS_CONFIGPATH` (falling back to its default).
    pub fn from_path(path: Option<&Path>, env: SharedEnv) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env_or_default(EnvVariable::ConfigPath, env.as_ref()).map(PathBuf::from))
            .map(|p| expand_home(&p.to_string_lossy(), env.as_ref()));

        if let Some(path) = path.filter(|p| p.exists()) {
            match read_document(&path) {
                Ok(doc) => {
                    info!("Loading configuration from {}", path.display());
                    return Self {
                        config: JanisConfiguration::build(doc.as_ref(), env),
                        config_path: Some(path),
                    };
                }
                Err(e) => warn!("Using default configuration: {}", e),
            }
        }

        Self::defaults_only(env)
    }

    /// No backing document.
    pub fn defaults_only(env: SharedEnv) -> Self {
        Self {
            config: JanisConfiguration::defaults(env),
            config_path: None,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &JanisConfiguration {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> JanisConfiguration {
        self.config
    }

    /// Get the config file path that was used.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
