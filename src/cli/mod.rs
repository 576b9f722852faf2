//! CLI command definitions for janis-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::engines::BackendProfile;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

/// Output format for resolved documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

/// Output format for backend profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProfileFormat {
    /// Cromwell config file, layered over Cromwell's bundled defaults
    #[default]
    Hocon,
    Json,
    Yaml,
}

/// Resolve Janis configuration, recipes and engine backend profiles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to try before JANIS_CONFIGPATH and ~/.janis/janis.conf (repeatable)
    #[arg(short, long, global = true)]
    pub config: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved configuration
    Show {
        #[arg(long, value_enum, default_value_t)]
        format: DocumentFormat,
    },

    /// Print one recipe, or the merge of several in the given order
    Recipe {
        #[arg(required = true)]
        names: Vec<String>,

        /// Re-read recipe sources before the lookup
        #[arg(long)]
        reload: bool,
    },

    /// Print the backend profile the configured template produces
    Backend {
        /// Engine to configure (defaults to the configured engine)
        #[arg(short, long)]
        engine: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        format: ProfileFormat,
    },

    /// List registered template ids
    Templates,
}

/// Render a document in the requested format.
pub fn render_document<T: Serialize>(value: &T, format: DocumentFormat) -> anyhow::Result<String> {
    Ok(match format {
        DocumentFormat::Yaml => serde_yaml::to_string(value)?,
        DocumentFormat::Json => format!("{}\n", serde_json::to_string_pretty(value)?),
    })
}

/// Render the backend profile `template_id` produced.
///
/// HOCON output for an engine left on its defaults is a single comment line.
pub fn render_profile(template_id: &str, profile: &BackendProfile, format: ProfileFormat) -> anyhow::Result<String> {
    match (profile, format) {
        (BackendProfile::Cromwell(cromwell), ProfileFormat::Hocon) => Ok(cromwell.to_hocon()?),
        (BackendProfile::EngineDefault(engine), ProfileFormat::Hocon) => Ok(format!(
            "# {template_id} template leaves {engine} on its built-in configuration\n"
        )),
        (_, ProfileFormat::Json) => render_document(profile, DocumentFormat::Json),
        (_, ProfileFormat::Yaml) => render_document(profile, DocumentFormat::Yaml),
    }
}
