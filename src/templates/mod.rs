//! Environment templates.
//!
//! A template turns a description of where workflows run (a laptop, a Slurm
//! cluster with Singularity) into the backend profile an engine consumes.
//! Templates are looked up by id in a [`TemplateRegistry`] and constructed
//! from the `template` section of the configuration, minus its `id`.

mod local;
mod slurm;

pub use local::LocalTemplate;
pub use slurm::{SlurmSingularityTemplate, SpartanTemplate};

use crate::engines::{BackendProfile, EngineType};
use crate::error::{ConfigError, ConfigResult};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parameters forwarded to a template constructor.
pub type TemplateParams = Map<String, Value>;

/// Produces a backend profile for an engine.
pub trait EnvironmentTemplate: Send + Sync {
    /// Id the template is registered under.
    fn id(&self) -> &str;

    /// Backend profile for `engine`, or [`ConfigError::UnsupportedEngine`].
    fn engine_config(&self, engine: EngineType) -> ConfigResult<BackendProfile>;
}

/// Builds a template from its parameters.
pub type TemplateFactory =
    Box<dyn Fn(&TemplateParams) -> ConfigResult<Box<dyn EnvironmentTemplate>> + Send + Sync>;

/// Maps template ids to factories.
pub struct TemplateRegistry {
    factories: BTreeMap<String, TemplateFactory>,
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with the bundled templates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(LocalTemplate::ID, |params| {
            Ok(Box::new(LocalTemplate::from_params(params)?))
        });
        registry.register(SlurmSingularityTemplate::ID, |params| {
            Ok(Box::new(SlurmSingularityTemplate::from_params(params)?))
        });
        registry.register(SpartanTemplate::ID, |params| {
            Ok(Box::new(SpartanTemplate::from_params(params)?))
        });
        registry
    }

    /// Register (or replace) the factory for `id`.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(&TemplateParams) -> ConfigResult<Box<dyn EnvironmentTemplate>> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Construct the template registered under `id`.
    pub fn resolve(&self, id: &str, params: &TemplateParams) -> ConfigResult<Box<dyn EnvironmentTemplate>> {
        let factory = self.factories.get(id).ok_or_else(|| ConfigError::UnknownTemplate {
            id: id.to_string(),
            known: self.ids(),
        })?;
        tracing::debug!(template = id, params = params.len(), "Resolving template");
        factory(params)
    }
}

/// Deserialize template parameters into a typed parameter struct.
pub(crate) fn params_into<T: DeserializeOwned>(id: &str, params: &TemplateParams) -> ConfigResult<T> {
    serde_json::from_value(Value::Object(params.clone())).map_err(|source| {
        ConfigError::InvalidTemplateParams {
            id: id.to_string(),
            source,
        }
    })
}

/// A parameter that may be given as one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(items) => items,
        }
    }
}
