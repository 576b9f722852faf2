//! Structured error types for configuration resolution.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Contract violations
    UnhandledVariable,
    UnknownTemplate,
    UnsupportedEngine,
    UnknownEngine,
    InvalidTemplateParams,

    // Lookup errors
    RecipeNotFound,

    // I/O and parsing
    IoError,
    ParseError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            ErrorCode::UnhandledVariable => "UNHANDLED_VARIABLE",
            ErrorCode::UnknownTemplate => "UNKNOWN_TEMPLATE",
            ErrorCode::UnsupportedEngine => "UNSUPPORTED_ENGINE",
            ErrorCode::UnknownEngine => "UNKNOWN_ENGINE",
            ErrorCode::InvalidTemplateParams => "INVALID_TEMPLATE_PARAMS",
            ErrorCode::RecipeNotFound => "RECIPE_NOT_FOUND",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::ParseError => "PARSE_ERROR",
        };
        f.write_str(code)
    }
}

/// Errors raised while resolving configuration, recipes and templates.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A default was requested for an environment variable that has none.
    #[error("Couldn't determine default() for '{name}'")]
    UnhandledVariable { name: &'static str },

    #[error("Couldn't find recipe '{name}' in recipes, expected one of: {}", known.join(", "))]
    UnknownRecipe { name: String, known: Vec<String> },

    #[error("Couldn't find a template with id '{id}', expected one of: {}", known.join(", "))]
    UnknownTemplate { id: String, known: Vec<String> },

    #[error("The {template} template does not have a configuration for {engine}")]
    UnsupportedEngine { template: String, engine: String },

    #[error("Unknown engine type '{0}', expected one of: cromwell, cwltool, toil")]
    UnknownEngine(String),

    #[error("Invalid parameters for template '{id}': {source}")]
    InvalidTemplateParams {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Couldn't read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::UnhandledVariable { .. } => ErrorCode::UnhandledVariable,
            ConfigError::UnknownRecipe { .. } => ErrorCode::RecipeNotFound,
            ConfigError::UnknownTemplate { .. } => ErrorCode::UnknownTemplate,
            ConfigError::UnsupportedEngine { .. } => ErrorCode::UnsupportedEngine,
            ConfigError::UnknownEngine(_) => ErrorCode::UnknownEngine,
            ConfigError::InvalidTemplateParams { .. } => ErrorCode::InvalidTemplateParams,
            ConfigError::Io { .. } => ErrorCode::IoError,
            ConfigError::Parse { .. } => ErrorCode::ParseError,
        }
    }

    // Convenience constructors

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        ConfigError::Parse {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported_engine(template: &str, engine: impl std::fmt::Display) -> Self {
        ConfigError::UnsupportedEngine {
            template: template.to_string(),
            engine: engine.to_string(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
