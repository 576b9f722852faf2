//! janis-config
//!
//! Resolves the runner configuration once and answers questions about it:
//! the resolved document, recipes, and the backend profile for an engine.

use anyhow::Result;
use clap::Parser;
use janis_config::cli::{Cli, Command, DocumentFormat, ProfileFormat, render_document, render_profile};
use janis_config::config::{ConfigLoader, JanisConfiguration};
use janis_config::engines::EngineType;
use janis_config::error::ConfigError;
use janis_config::logging::{self, LogTarget};
use janis_config::templates::TemplateRegistry;
use serde::Serialize;
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let target: LogTarget = match cli.log.parse() {
        Ok(target) => target,
        Err(never) => match never {},
    };
    if let Err(e) = logging::init(&target, cli.verbose) {
        eprintln!("Failed to initialise logging: {e}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ConfigError>() {
                Some(config_err) => eprintln!("error[{}]: {}", config_err.code(), config_err),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Configuration is resolved once and passed down by reference
    let loader = ConfigLoader::load(&cli.config);
    match loader.config_path() {
        Some(path) => debug!("Using configuration from {}", path.display()),
        None => debug!("Using default configuration"),
    }
    let config = loader.into_config();
    let registry = TemplateRegistry::with_builtins();

    match cli.command {
        Command::Show { format } => print_document(&config.to_document(), format),
        Command::Recipe { names, reload } => run_recipe(&config, &names, reload),
        Command::Backend { engine, format } => run_backend(&config, &registry, engine.as_deref(), format),
        Command::Templates => {
            for id in registry.ids() {
                println!("{id}");
            }
            Ok(())
        }
    }
}

fn run_recipe(config: &JanisConfiguration, names: &[String], reload: bool) -> Result<()> {
    if reload {
        config.recipes.load(true);
    }
    let recipe = match names {
        [single] => config.recipes.get_recipe(single)?,
        many => config.recipes.get_recipes(many),
    };
    print_document(&recipe, DocumentFormat::Yaml)
}

fn run_backend(
    config: &JanisConfiguration,
    registry: &TemplateRegistry,
    engine: Option<&str>,
    format: ProfileFormat,
) -> Result<()> {
    let engine: EngineType = match engine {
        Some(name) => name.parse()?,
        None => config.engine_type()?,
    };
    let template = config.environment_template(registry)?;
    let profile = template.engine_config(engine)?;

    print!("{}", render_profile(template.id(), &profile, format)?);
    Ok(())
}

fn print_document<T: Serialize>(value: &T, format: DocumentFormat) -> Result<()> {
    print!("{}", render_document(value, format)?);
    Ok(())
}
