//! Execution engines and the backend profiles handed to them.

pub mod cromwell;

use crate::error::ConfigError;
use cromwell::CromwellConfiguration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Workflow execution engines a backend profile can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    Cromwell,
    Cwltool,
    Toil,
}

impl EngineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineType::Cromwell => "cromwell",
            EngineType::Cwltool => "cwltool",
            EngineType::Toil => "toil",
        }
    }
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cromwell" => Ok(EngineType::Cromwell),
            "cwltool" => Ok(EngineType::Cwltool),
            "toil" => Ok(EngineType::Toil),
            _ => Err(ConfigError::UnknownEngine(s.to_string())),
        }
    }
}

/// Engine-specific configuration produced by an environment template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BackendProfile {
    Cromwell(CromwellConfiguration),
    /// No override: the engine runs with its built-in configuration.
    EngineDefault(EngineType),
}

impl BackendProfile {
    pub fn as_cromwell(&self) -> Option<&CromwellConfiguration> {
        match self {
            BackendProfile::Cromwell(config) => Some(config),
            BackendProfile::EngineDefault(_) => None,
        }
    }
}
