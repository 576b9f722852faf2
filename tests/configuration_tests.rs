//! Integration tests for layered configuration resolution.
//!
//! Precedence is document > environment variable > hard-coded default.

use janis_config::config::{ConfigLoader, JanisConfiguration};
use janis_config::env::{MapEnv, SharedEnv};
use serde_json::{Value, json};
use std::path::PathBuf;
use tempfile::TempDir;

const HOME: &str = "/home/tester";

fn home_env() -> MapEnv {
    MapEnv::new().with_home(HOME)
}

fn build(doc: Option<Value>, env: MapEnv) -> JanisConfiguration {
    let env: SharedEnv = env.shared();
    JanisConfiguration::build(doc.as_ref(), env)
}

mod defaults_tests {
    use super::*;

    #[test]
    fn every_defaulted_key_uses_hard_coded_value() {
        let config = build(None, home_env());

        assert_eq!(config.config_dir, PathBuf::from("/home/tester/.janis/"));
        assert_eq!(config.execution_dir, PathBuf::from("/home/tester/janis/execution/"));
        assert_eq!(config.search_paths, vec!["/home/tester/janis/"]);
        assert_eq!(config.engine, "cromwell");
        assert_eq!(config.environment.default, None);
        assert_eq!(config.cromwell.jar_path, None);
        assert_eq!(config.cromwell.config_path, None);
        assert_eq!(config.template.id, "local");
        assert!(config.template.params.is_empty());
        assert!(config.recipes.recipes.is_empty());
        assert!(config.recipes.recipe_paths.is_empty());
    }

    #[test]
    fn repeated_builds_do_not_share_state() {
        let doc = json!({
            "engine": "toil",
            "searchPaths": ["/custom"],
            "template": {"id": "spartan", "queues": "gpu"},
            "recipes": {"recipes": {"hg38": {"reference": "/ref"}}},
        });
        let customised = build(Some(doc), home_env());
        assert_eq!(customised.engine, "toil");

        let from_empty = build(Some(json!({})), home_env());
        let from_none = build(None, home_env());
        assert_eq!(from_empty.to_document(), from_none.to_document());
        assert_eq!(from_empty.engine, "cromwell");
        assert!(from_empty.recipes.recipes.is_empty());
    }
}

mod environment_override_tests {
    use super::*;

    #[test]
    fn environment_overrides_hard_coded_defaults() {
        let env = home_env()
            .with_var("JANIS_CONFIGDIR", "/etc/janis/")
            .with_var("JANIS_EXCECUTIONDIR", "/scratch/exec/")
            .with_var("JANIS_CROMWELLJAR", "/opt/cromwell-50.jar");
        let config = build(None, env);

        assert_eq!(config.config_dir, PathBuf::from("/etc/janis/"));
        assert_eq!(config.execution_dir, PathBuf::from("/scratch/exec/"));
        assert_eq!(config.cromwell.jar_path.as_deref(), Some("/opt/cromwell-50.jar"));
        assert_eq!(config.db_path(), PathBuf::from("/etc/janis/janis.db"));
    }

    #[test]
    fn document_overrides_environment() {
        let env = home_env()
            .with_var("JANIS_CONFIGDIR", "/etc/janis/")
            .with_var("JANIS_CROMWELLJAR", "/opt/cromwell-50.jar");
        let doc = json!({
            "configDir": "/doc/config",
            "cromwell": {"jar": "/doc/cromwell.jar", "configPath": "/doc/cromwell.conf"},
        });
        let config = build(Some(doc), env);

        assert_eq!(config.config_dir, PathBuf::from("/doc/config"));
        assert_eq!(config.cromwell.jar_path.as_deref(), Some("/doc/cromwell.jar"));
        assert_eq!(config.cromwell.config_path.as_deref(), Some("/doc/cromwell.conf"));
    }

    #[test]
    fn missing_section_falls_back_to_defaults() {
        let doc = json!({"engine": "cwltool"});
        let env = home_env().with_var("JANIS_CROMWELLJAR", "/opt/cromwell.jar");
        let config = build(Some(doc), env);

        assert_eq!(config.engine, "cwltool");
        assert_eq!(config.cromwell.jar_path.as_deref(), Some("/opt/cromwell.jar"));
        assert_eq!(config.template.id, "local");
    }
}

mod search_path_tests {
    use super::*;

    #[test]
    fn environment_search_path_is_appended() {
        let env = home_env().with_var("JANIS_SEARCHPATH", "/shared/janis/");
        let config = build(Some(json!({"searchPaths": ["/a", "/b"]})), env);
        assert_eq!(config.search_paths, vec!["/a", "/b", "/shared/janis/"]);
    }

    #[test]
    fn environment_search_path_appears_once() {
        let env = home_env().with_var("JANIS_SEARCHPATH", "/b");
        let config = build(Some(json!({"searchPaths": ["/a", "/b"]})), env);
        assert_eq!(config.search_paths, vec!["/a", "/b"]);
    }

    #[test]
    fn environment_search_path_added_to_defaults() {
        let env = home_env().with_var("JANIS_SEARCHPATH", "/shared/janis/");
        let config = build(None, env);
        assert_eq!(config.search_paths, vec!["/home/tester/janis/", "/shared/janis/"]);
    }

    #[test]
    fn scalar_search_path_is_coerced_to_list() {
        let config = build(Some(json!({"searchPaths": "/only"})), home_env());
        assert_eq!(config.search_paths, vec!["/only"]);
    }
}

/// Falsy document values are treated as absent. These tests pin that
/// behavior: a document cannot switch a defaulted field off.
mod falsy_value_tests {
    use super::*;

    #[test]
    fn empty_search_paths_are_not_honored() {
        let config = build(Some(json!({"searchPaths": []})), home_env());
        assert_eq!(config.search_paths, vec!["/home/tester/janis/"]);
    }

    #[test]
    fn empty_engine_is_not_honored() {
        let config = build(Some(json!({"engine": ""})), home_env());
        assert_eq!(config.engine, "cromwell");
    }

    #[test]
    fn zero_and_false_fall_through() {
        let config = build(Some(json!({"configDir": 0, "executionDir": false})), home_env());
        assert_eq!(config.config_dir, PathBuf::from("/home/tester/.janis/"));
        assert_eq!(config.execution_dir, PathBuf::from("/home/tester/janis/execution/"));
    }

    #[test]
    fn non_string_scalars_are_stringified() {
        let config = build(Some(json!({"environment": {"default": 42}})), home_env());
        assert_eq!(config.environment.default.as_deref(), Some("42"));
    }
}

mod loader_tests {
    use super::*;

    #[test]
    fn yaml_document_is_resolved() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("janis.conf");
        std::fs::write(
            &path,
            r#"
engine: cromwell
executionDir: /scratch/janis
searchPaths: /data/janis
environment:
  default: spartan
template:
  id: spartan
  queues: [physical, snowy]
  email: me@example.org
recipes:
  paths: /data/recipes.yaml
"#,
        )
        .unwrap();

        let loader = ConfigLoader::initial_configuration(&[path.clone()], home_env().shared());
        let config = loader.config();

        assert_eq!(loader.config_path(), Some(path.as_path()));
        assert_eq!(config.execution_dir, PathBuf::from("/scratch/janis"));
        assert_eq!(config.search_paths, vec!["/data/janis"]);
        assert_eq!(config.environment.default.as_deref(), Some("spartan"));
        assert_eq!(config.template.id, "spartan");
        assert_eq!(config.template.params.get("queues"), Some(&json!(["physical", "snowy"])));
        assert!(!config.template.params.contains_key("id"));
        assert_eq!(config.recipes.recipe_paths, vec!["/data/recipes.yaml"]);
    }

    #[test]
    fn default_config_path_under_home_is_discovered() {
        let temp = TempDir::new().unwrap();
        let janis_dir = temp.path().join(".janis");
        std::fs::create_dir_all(&janis_dir).unwrap();
        std::fs::write(janis_dir.join("janis.conf"), "engine: toil\n").unwrap();

        let env = MapEnv::new().with_home(temp.path());
        let loader = ConfigLoader::initial_configuration(&[], env.shared());

        assert_eq!(loader.config_path(), Some(janis_dir.join("janis.conf").as_path()));
        assert_eq!(loader.config().engine, "toil");
    }

    #[test]
    fn explicit_path_beats_environment_path() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("explicit.conf");
        let from_env = temp.path().join("env.conf");
        std::fs::write(&explicit, "engine: cwltool\n").unwrap();
        std::fs::write(&from_env, "engine: toil\n").unwrap();

        let env = home_env().with_var("JANIS_CONFIGPATH", from_env.display().to_string());
        let loader = ConfigLoader::initial_configuration(&[explicit], env.clone().shared());
        assert_eq!(loader.config().engine, "cwltool");

        let loader = ConfigLoader::initial_configuration(&[], env.shared());
        assert_eq!(loader.config().engine, "toil");
    }

    #[test]
    fn resolved_document_uses_document_keys() {
        let config = build(None, home_env());
        let doc = config.to_document();

        for key in ["configDir", "executionDir", "searchPaths", "engine", "environment", "cromwell", "template", "recipes"] {
            assert!(doc.get(key).is_some(), "missing {key}");
        }
        assert_eq!(doc["recipes"], json!({"recipes": {}, "paths": [], "directories": []}));
    }
}
