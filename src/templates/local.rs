use super::{EnvironmentTemplate, TemplateParams, params_into};
use crate::engines::cromwell::{CromwellConfiguration, Provider};
use crate::engines::{BackendProfile, EngineType};
use crate::error::ConfigResult;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct LocalParams {
    #[serde(default)]
    execution_dir: Option<String>,
}

/// Runs everything on the current machine.
#[derive(Debug, Clone, Default)]
pub struct LocalTemplate {
    pub execution_dir: Option<String>,
}

impl LocalTemplate {
    pub const ID: &'static str = "local";

    pub fn from_params(params: &TemplateParams) -> ConfigResult<Self> {
        let params: LocalParams = params_into(Self::ID, params)?;
        Ok(Self {
            execution_dir: params.execution_dir,
        })
    }
}

impl EnvironmentTemplate for LocalTemplate {
    fn id(&self) -> &str {
        Self::ID
    }

    fn engine_config(&self, engine: EngineType) -> ConfigResult<BackendProfile> {
        match engine {
            EngineType::Cromwell => {
                let mut provider = Provider::local();
                provider.config.root = self.execution_dir.clone();
                Ok(BackendProfile::Cromwell(CromwellConfiguration::with_provider(
                    "Local", provider,
                )))
            }
            other => Ok(BackendProfile::EngineDefault(other)),
        }
    }
}
