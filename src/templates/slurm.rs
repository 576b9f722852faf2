//! Slurm-backed templates that run containers through Singularity.

use super::{EnvironmentTemplate, OneOrMany, TemplateParams, params_into};
use crate::engines::cromwell::{
    CromwellConfiguration, Filesystems, Localization, Provider, SlurmSingularity,
};
use crate::engines::{BackendProfile, EngineType};
use crate::error::{ConfigError, ConfigResult};
use serde::Deserialize;

/// Pull an image into `$image`; `${docker}` is filled in by Cromwell per job.
const SINGULARITY_PULL: &str = "singularity pull $image docker://${docker}";

/// Localization preference on a shared cluster filesystem.
const CLUSTER_LOCALIZATION: [Localization; 4] = [
    Localization::CachedCopy,
    Localization::HardLink,
    Localization::SoftLink,
    Localization::Copy,
];

fn cluster_config(provider_name: &str, options: SlurmSingularity, execution_dir: &str) -> CromwellConfiguration {
    let mut provider = Provider::slurm_singularity(options);
    provider.config.root = Some(execution_dir.to_string());
    provider.config.filesystems = Some(Filesystems::local(CLUSTER_LOCALIZATION.to_vec()));
    CromwellConfiguration::with_provider(provider_name, provider)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SlurmSingularityParams {
    execution_dir: String,
    container_dir: String,
    #[serde(default)]
    queues: Option<OneOrMany>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    singularity_load_instructions: Option<String>,
    #[serde(default = "default_build_instructions")]
    build_instructions: String,
    #[serde(default = "default_provider_name")]
    provider_name: String,
}

fn default_build_instructions() -> String {
    SINGULARITY_PULL.to_string()
}

fn default_provider_name() -> String {
    "slurm-singularity".to_string()
}

/// Any Slurm cluster with Singularity available.
#[derive(Debug, Clone)]
pub struct SlurmSingularityTemplate {
    pub execution_dir: String,
    pub container_dir: String,
    pub queues: Vec<String>,
    pub email: Option<String>,
    pub singularity_load_instructions: Option<String>,
    pub build_instructions: String,
    pub provider_name: String,
}

impl SlurmSingularityTemplate {
    pub const ID: &'static str = "slurm_singularity";

    pub fn from_params(params: &TemplateParams) -> ConfigResult<Self> {
        let p: SlurmSingularityParams = params_into(Self::ID, params)?;
        Ok(Self {
            execution_dir: p.execution_dir,
            container_dir: p.container_dir,
            queues: p.queues.map(OneOrMany::into_vec).unwrap_or_default(),
            email: p.email,
            singularity_load_instructions: p.singularity_load_instructions,
            build_instructions: p.build_instructions,
            provider_name: p.provider_name,
        })
    }

    pub fn cromwell(&self) -> CromwellConfiguration {
        cluster_config(
            &self.provider_name,
            SlurmSingularity {
                load_instructions: self.singularity_load_instructions.clone(),
                container_dir: self.container_dir.clone(),
                build_instructions: self.build_instructions.clone(),
                job_email: self.email.clone(),
                job_queues: self.queues.clone(),
            },
            &self.execution_dir,
        )
    }
}

impl EnvironmentTemplate for SlurmSingularityTemplate {
    fn id(&self) -> &str {
        Self::ID
    }

    fn engine_config(&self, engine: EngineType) -> ConfigResult<BackendProfile> {
        match engine {
            EngineType::Cromwell => Ok(BackendProfile::Cromwell(self.cromwell())),
            other => Err(ConfigError::unsupported_engine(Self::ID, other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SpartanParams {
    execution_dir: String,
    #[serde(default = "default_spartan_queues")]
    queues: OneOrMany,
    #[serde(default)]
    email: Option<String>,
    #[serde(default = "default_spartan_container_dir")]
    container_dir: String,
    #[serde(default = "default_spartan_singularity_version")]
    singularity_version: String,
}

fn default_spartan_queues() -> OneOrMany {
    OneOrMany::One("physical".to_string())
}

fn default_spartan_container_dir() -> String {
    "/config/binaries/singularity/containers_devel/janis/".to_string()
}

fn default_spartan_singularity_version() -> String {
    "3.2.0-spartan_gcc-6.2.0".to_string()
}

/// The University of Melbourne's Spartan cluster.
#[derive(Debug, Clone)]
pub struct SpartanTemplate {
    pub execution_dir: String,
    pub queues: Vec<String>,
    pub email: Option<String>,
    pub container_dir: String,
    pub singularity_version: String,
}

impl SpartanTemplate {
    pub const ID: &'static str = "spartan";
    pub const PROVIDER: &'static str = "slurm-spartan";

    pub fn from_params(params: &TemplateParams) -> ConfigResult<Self> {
        let p: SpartanParams = params_into(Self::ID, params)?;
        Ok(Self {
            execution_dir: p.execution_dir,
            queues: p.queues.into_vec(),
            email: p.email,
            container_dir: p.container_dir,
            singularity_version: p.singularity_version,
        })
    }

    pub fn cromwell(&self) -> CromwellConfiguration {
        cluster_config(
            Self::PROVIDER,
            SlurmSingularity {
                load_instructions: Some(format!(
                    "module load Singularity/{}",
                    self.singularity_version
                )),
                container_dir: self.container_dir.clone(),
                build_instructions: SINGULARITY_PULL.to_string(),
                job_email: self.email.clone(),
                job_queues: self.queues.clone(),
            },
            &self.execution_dir,
        )
    }
}

impl EnvironmentTemplate for SpartanTemplate {
    fn id(&self) -> &str {
        Self::ID
    }

    fn engine_config(&self, engine: EngineType) -> ConfigResult<BackendProfile> {
        match engine {
            EngineType::Cromwell => Ok(BackendProfile::Cromwell(self.cromwell())),
            other => Err(ConfigError::unsupported_engine(Self::ID, other)),
        }
    }
}
