//! Typed configuration sections.
//!
//! Each section is built from its slice of the document and the matching
//! slice of the computed defaults.

use super::merge::{as_string, value_for};
use serde::Serialize;
use serde_json::{Map, Value};

/// Document keys.
pub mod keys {
    pub const CONFIG_DIR: &str = "configDir";
    pub const EXECUTION_DIR: &str = "executionDir";
    pub const SEARCH_PATHS: &str = "searchPaths";
    pub const ENGINE: &str = "engine";
    pub const ENVIRONMENT: &str = "environment";
    pub const CROMWELL: &str = "cromwell";
    pub const TEMPLATE: &str = "template";
    pub const RECIPES: &str = "recipes";

    // environment
    pub const DEFAULT: &str = "default";

    // cromwell
    pub const JAR: &str = "jar";
    pub const CONFIG_PATH: &str = "configPath";

    // template
    pub const ID: &str = "id";

    // recipes
    pub const RECIPE_PATHS: &str = "paths";
    pub const RECIPE_DIRECTORIES: &str = "directories";
}

/// Template used when neither the document nor the defaults name one.
pub const DEFAULT_TEMPLATE_ID: &str = "local";

/// Default engine type.
pub const DEFAULT_ENGINE: &str = "cromwell";

/// Selects a named environment profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentConfig {
    pub default: Option<String>,
}

impl EnvironmentConfig {
    pub fn build(doc: Option<&Value>, defaults: Option<&Value>) -> Self {
        Self {
            default: value_for(doc, keys::DEFAULT, defaults).and_then(as_string),
        }
    }
}

/// Cromwell binaries and config.
///
/// Both paths may stay unset; the runner finds or downloads a jar at launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CromwellConfig {
    #[serde(rename = "jar")]
    pub jar_path: Option<String>,
    pub config_path: Option<String>,
}

impl CromwellConfig {
    pub fn build(doc: Option<&Value>, defaults: Option<&Value>) -> Self {
        Self {
            jar_path: value_for(doc, keys::JAR, defaults).and_then(as_string),
            config_path: value_for(doc, keys::CONFIG_PATH, defaults).and_then(as_string),
        }
    }
}

/// Template selection plus the parameters forwarded to the template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateConfig {
    pub id: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_TEMPLATE_ID.to_string(),
            params: Map::new(),
        }
    }
}

impl TemplateConfig {
    /// `id` is a directive, so it is removed from the forwarded parameters.
    pub fn build(doc: Option<&Value>, defaults: Option<&Value>) -> Self {
        let id = value_for(doc, keys::ID, defaults)
            .and_then(as_string)
            .unwrap_or_else(|| DEFAULT_TEMPLATE_ID.to_string());

        let mut params = doc
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        params.remove(keys::ID);

        Self { id, params }
    }
}
