//! Integration tests for template selection and backend profiles.

use janis_config::config::JanisConfiguration;
use janis_config::engines::{BackendProfile, EngineType};
use janis_config::env::MapEnv;
use janis_config::error::{ConfigError, ConfigResult, ErrorCode};
use janis_config::templates::{EnvironmentTemplate, TemplateParams, TemplateRegistry};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

fn configure(doc: Value) -> JanisConfiguration {
    let env = MapEnv::new().with_home("/home/tester");
    JanisConfiguration::build(Some(&doc), env.shared())
}

/// Records the parameters it was built with.
struct Recording;

impl EnvironmentTemplate for Recording {
    fn id(&self) -> &str {
        "recording"
    }

    fn engine_config(&self, engine: EngineType) -> ConfigResult<BackendProfile> {
        Ok(BackendProfile::EngineDefault(engine))
    }
}

fn recording_registry(seen: Arc<Mutex<Option<TemplateParams>>>) -> TemplateRegistry {
    let mut registry = TemplateRegistry::with_builtins();
    registry.register("recording", move |params| {
        *seen.lock().unwrap() = Some(params.clone());
        Ok(Box::new(Recording))
    });
    registry
}

mod selection_tests {
    use super::*;

    #[test]
    fn template_id_is_not_forwarded() {
        let seen = Arc::new(Mutex::new(None));
        let registry = recording_registry(Arc::clone(&seen));
        let config = configure(json!({
            "executionDir": "/scratch",
            "template": {"id": "recording", "foo": "bar"},
        }));

        let template = config.environment_template(&registry).unwrap();
        assert_eq!(template.id(), "recording");

        let params = seen.lock().unwrap().clone().unwrap();
        assert_eq!(params.get("foo"), Some(&json!("bar")));
        assert!(!params.contains_key("id"));
    }

    #[test]
    fn execution_dir_is_supplied_from_configuration() {
        let seen = Arc::new(Mutex::new(None));
        let registry = recording_registry(Arc::clone(&seen));
        let config = configure(json!({
            "executionDir": "/scratch",
            "template": {"id": "recording"},
        }));

        config.environment_template(&registry).unwrap();
        let params = seen.lock().unwrap().clone().unwrap();
        assert_eq!(params.get("executionDir"), Some(&json!("/scratch")));
    }

    #[test]
    fn template_section_execution_dir_wins() {
        let seen = Arc::new(Mutex::new(None));
        let registry = recording_registry(Arc::clone(&seen));
        let config = configure(json!({
            "executionDir": "/scratch",
            "template": {"id": "recording", "executionDir": "/elsewhere"},
        }));

        config.environment_template(&registry).unwrap();
        let params = seen.lock().unwrap().clone().unwrap();
        assert_eq!(params.get("executionDir"), Some(&json!("/elsewhere")));
    }

    #[test]
    fn unknown_template_id_is_an_error() {
        let config = configure(json!({"template": {"id": "pbs"}}));
        let err = config
            .environment_template(&TemplateRegistry::with_builtins())
            .err()
            .unwrap();

        assert_eq!(err.code(), ErrorCode::UnknownTemplate);
        assert!(err.to_string().contains("local, slurm_singularity, spartan"));
    }

    #[test]
    fn unexpected_parameter_is_rejected() {
        let config = configure(json!({"template": {"id": "spartan", "partition": "gpu"}}));
        let err = config
            .environment_template(&TemplateRegistry::with_builtins())
            .err()
            .unwrap();

        assert!(matches!(err, ConfigError::InvalidTemplateParams { ref id, .. } if id == "spartan"));
    }
}

mod spartan_tests {
    use super::*;

    fn spartan_profile(template: Value) -> BackendProfile {
        let config = configure(json!({"executionDir": "/data/janis/exec", "template": template}));
        let template = config
            .environment_template(&TemplateRegistry::with_builtins())
            .unwrap();
        template.engine_config(EngineType::Cromwell).unwrap()
    }

    #[test]
    fn default_spartan_profile() {
        let profile = spartan_profile(json!({"id": "spartan"}));
        let cromwell = profile.as_cromwell().unwrap();
        assert_eq!(cromwell.backend.default, "slurm-spartan");

        let provider = cromwell.default_provider().unwrap();
        assert_eq!(provider.config.root.as_deref(), Some("/data/janis/exec"));
        assert_eq!(provider.config.job_queues, vec!["physical"]);
        assert_eq!(provider.config.job_email, None);

        let docker = provider.config.submit_docker.as_deref().unwrap();
        assert!(docker.starts_with("module load Singularity/3.2.0-spartan_gcc-6.2.0\n"));
        assert!(docker.contains("image=/config/binaries/singularity/containers_devel/janis/$docker_subbed.sif"));
        assert!(docker.contains("singularity pull $image docker://${docker}"));
    }

    #[test]
    fn single_queue_string_is_one_queue() {
        let profile = spartan_profile(json!({"id": "spartan", "queues": "snowy"}));
        let provider = profile.as_cromwell().unwrap().default_provider().unwrap();

        assert_eq!(provider.config.job_queues, vec!["snowy"]);
        assert!(provider.config.runtime_attributes.as_deref().unwrap().contains("String? queue = \"snowy\""));
    }

    #[test]
    fn queues_and_email_reach_sbatch() {
        let profile = spartan_profile(json!({
            "id": "spartan",
            "queues": ["physical", "gpgpu"],
            "email": "me@example.org",
        }));
        let provider = profile.as_cromwell().unwrap().default_provider().unwrap();

        assert_eq!(provider.config.job_queues, vec!["physical", "gpgpu"]);
        assert!(provider.config.runtime_attributes.as_deref().unwrap().contains("\"physical,gpgpu\""));
        assert!(provider.config.submit.as_deref().unwrap().contains("--mail-user me@example.org"));
    }

    #[test]
    fn empty_email_adds_no_mail_flags() {
        let profile = spartan_profile(json!({"id": "spartan", "email": ""}));
        let provider = profile.as_cromwell().unwrap().default_provider().unwrap();

        assert_eq!(provider.config.job_email, None);
        assert!(!provider.config.submit.as_deref().unwrap().contains("--mail"));
        assert!(!provider.config.submit_docker.as_deref().unwrap().contains("--mail"));
    }

    #[test]
    fn null_execution_dir_uses_configuration() {
        let profile = spartan_profile(json!({"id": "spartan", "executionDir": null}));
        let provider = profile.as_cromwell().unwrap().default_provider().unwrap();

        assert_eq!(provider.config.root.as_deref(), Some("/data/janis/exec"));
    }

    #[test]
    fn spartan_has_no_profile_for_other_engines() {
        let config = configure(json!({"template": {"id": "spartan"}}));
        let template = config
            .environment_template(&TemplateRegistry::with_builtins())
            .unwrap();

        for engine in [EngineType::Cwltool, EngineType::Toil] {
            let err = template.engine_config(engine).unwrap_err();
            assert_eq!(err.code(), ErrorCode::UnsupportedEngine);
            assert_eq!(
                err.to_string(),
                format!("The spartan template does not have a configuration for {engine}")
            );
        }
    }

    #[test]
    fn spartan_profile_renders_as_cromwell_config() {
        let profile = spartan_profile(json!({"id": "spartan"}));
        let hocon = profile.as_cromwell().unwrap().to_hocon().unwrap();

        assert!(hocon.starts_with("include required(classpath(\"application\"))"));
        assert!(hocon.contains("backend: {"));
        assert!(hocon.contains("\"slurm-spartan\""));
        assert!(hocon.contains("\"job-id-regex\""));
    }
}

mod local_tests {
    use super::*;

    #[test]
    fn default_template_is_local() {
        let config = configure(json!({"executionDir": "/scratch"}));
        let template = config
            .environment_template(&TemplateRegistry::with_builtins())
            .unwrap();
        assert_eq!(template.id(), "local");

        let profile = template.engine_config(EngineType::Cromwell).unwrap();
        let provider = profile.as_cromwell().unwrap().default_provider().unwrap();
        assert_eq!(provider.config.root.as_deref(), Some("/scratch"));
    }

    #[test]
    fn local_leaves_other_engines_on_defaults() {
        let config = configure(json!({}));
        let template = config
            .environment_template(&TemplateRegistry::with_builtins())
            .unwrap();

        assert_eq!(
            template.engine_config(EngineType::Toil).unwrap(),
            BackendProfile::EngineDefault(EngineType::Toil)
        );
    }
}
