//! Cromwell backend configuration.
//!
//! Field names serialise to the keys Cromwell reads from its config file
//! (`backend.providers.<name>.config.submit-docker` and friends). Cromwell
//! parses HOCON, which accepts the JSON produced here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Actor factory for shared-filesystem backends configured by shell commands.
pub const CONFIG_BACKEND_FACTORY: &str =
    "cromwell.backend.impl.sfs.config.ConfigBackendLifecycleActorFactory";

/// Pulls in Cromwell's bundled defaults ahead of our overrides.
const INCLUDE_APPLICATION: &str = r#"include required(classpath("application"))"#;

/// Top-level Cromwell configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CromwellConfiguration {
    pub backend: Backend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backend {
    /// Name of the provider jobs are sent to.
    pub default: String,
    pub providers: BTreeMap<String, Provider>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Provider {
    pub actor_factory: String,
    pub config: ProviderConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_in_background: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesystems: Option<Filesystems>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_attributes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_docker: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kill: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_alive: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id_regex: Option<String>,

    /// Queues jobs may be submitted to; rendered into the runtime attributes.
    #[serde(skip)]
    pub job_queues: Vec<String>,

    /// Address notified when a job ends or fails; rendered into the submit commands.
    #[serde(skip)]
    pub job_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filesystems {
    pub local: LocalFilesystem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalFilesystem {
    /// Mechanisms tried in order when making an input available to a job.
    pub localization: Vec<Localization>,
}

impl Filesystems {
    pub fn local(localization: Vec<Localization>) -> Self {
        Self {
            local: LocalFilesystem { localization },
        }
    }
}

/// A way of making an input file available inside a job's directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Localization {
    CachedCopy,
    HardLink,
    SoftLink,
    Copy,
}

/// Settings for a Slurm provider that runs containers through Singularity.
#[derive(Debug, Clone, Default)]
pub struct SlurmSingularity {
    /// Shell lines that make `singularity` available (e.g. `module load`).
    pub load_instructions: Option<String>,
    /// Directory holding pulled `.sif` images.
    pub container_dir: String,
    /// Shell lines that produce `$image` from `${docker}` when it is missing.
    pub build_instructions: String,
    pub job_email: Option<String>,
    pub job_queues: Vec<String>,
}

impl Provider {
    /// Run jobs directly on this machine.
    pub fn local() -> Self {
        Self {
            actor_factory: CONFIG_BACKEND_FACTORY.to_string(),
            config: ProviderConfig {
                run_in_background: Some(true),
                filesystems: Some(Filesystems::local(vec![
                    Localization::HardLink,
                    Localization::SoftLink,
                    Localization::Copy,
                ])),
                runtime_attributes: Some("String? docker\nString? docker_user".to_string()),
                submit: Some("/usr/bin/env bash ${script}".to_string()),
                submit_docker: Some(
                    r#"docker run --rm -i ${"--user " + docker_user} --entrypoint ${job_shell} -v ${cwd}:${docker_cwd} ${docker} ${docker_script}"#
                        .to_string(),
                ),
                ..Default::default()
            },
        }
    }

    /// Submit jobs with `sbatch`, running containers through Singularity.
    pub fn slurm_singularity(opts: SlurmSingularity) -> Self {
        let queue_attribute = if opts.job_queues.is_empty() {
            "String? queue".to_string()
        } else {
            format!("String? queue = \"{}\"", opts.job_queues.join(","))
        };
        let runtime_attributes = [
            "Int runtime_minutes = 1440",
            queue_attribute.as_str(),
            "Int? cpu = 1",
            "Int memory_mb = 3500",
            "String? docker",
        ]
        .join("\n");

        // An empty address would leave `--mail-user` without a value
        let job_email = opts.job_email.filter(|email| !email.is_empty());
        let email_flags = job_email
            .as_deref()
            .map(|email| format!(" --mail-user {email} --mail-type END,FAIL"))
            .unwrap_or_default();
        let sbatch = format!(
            "sbatch -J ${{job_name}} -D ${{cwd}} -o ${{out}} -e ${{err}} -t ${{runtime_minutes}} \
             ${{\"-p \" + queue}} ${{\"-n \" + cpu}} --mem=${{memory_mb}}{email_flags}"
        );

        let mut docker_lines: Vec<String> = Vec::new();
        if let Some(load) = &opts.load_instructions {
            docker_lines.push(load.clone());
        }
        docker_lines.push("docker_subbed=$(sed -e 's/[^A-Za-z0-9._-]/_/g' <<< ${docker})".to_string());
        docker_lines.push(format!(
            "image={}/$docker_subbed.sif",
            opts.container_dir.trim_end_matches('/')
        ));
        docker_lines.push("if [ ! -f \"$image\" ]; then".to_string());
        docker_lines.push(format!("  {}", opts.build_instructions));
        docker_lines.push("fi".to_string());
        docker_lines.push(format!(
            "{sbatch} --wrap \"singularity exec --bind ${{cwd}}:${{docker_cwd}} $image ${{job_shell}} ${{docker_script}}\""
        ));

        Self {
            actor_factory: CONFIG_BACKEND_FACTORY.to_string(),
            config: ProviderConfig {
                runtime_attributes: Some(runtime_attributes),
                submit: Some(format!("{sbatch} --wrap \"/usr/bin/env bash ${{script}}\"")),
                submit_docker: Some(docker_lines.join("\n")),
                kill: Some("scancel ${job_id}".to_string()),
                check_alive: Some("squeue -j ${job_id}".to_string()),
                job_id_regex: Some(r"Submitted batch job (\d+).*".to_string()),
                job_queues: opts.job_queues,
                job_email,
                ..Default::default()
            },
        }
    }
}

impl CromwellConfiguration {
    /// A configuration whose only (and default) provider is `provider`.
    pub fn with_provider(name: impl Into<String>, provider: Provider) -> Self {
        let name = name.into();
        let mut providers = BTreeMap::new();
        providers.insert(name.clone(), provider);
        Self {
            backend: Backend {
                default: name,
                providers,
            },
        }
    }

    pub fn default_provider(&self) -> Option<&Provider> {
        self.backend.providers.get(&self.backend.default)
    }

    /// Render as a Cromwell config file layered over the bundled defaults.
    pub fn to_hocon(&self) -> serde_json::Result<String> {
        let mut out = format!("{INCLUDE_APPLICATION}\n\n");
        if let Value::Object(sections) = serde_json::to_value(self)? {
            for (key, value) in sections {
                out.push_str(&format!("{key}: {}\n", serde_json::to_string_pretty(&value)?));
            }
        }
        Ok(out)
    }
}
