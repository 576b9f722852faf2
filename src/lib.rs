//! Janis configuration library.
//!
//! Resolves runner configuration from files, environment variables and
//! defaults, serves recipe presets, and turns environment templates into
//! engine backend profiles.

pub mod cli;
pub mod config;
pub mod engines;
pub mod env;
pub mod error;
pub mod logging;
pub mod templates;
