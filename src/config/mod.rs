//! Layered configuration.
//!
//! Resolves the runner's configuration from three layers, field by field:
//! 1. **Document** - `~/.janis/janis.conf` or an explicit path (YAML)
//! 2. **Environment** - `JANIS_*` variables
//! 3. **Defaults** - hard-coded, rooted in the user's home directory
//!
//! ## Document keys
//! - `configDir`, `executionDir`, `searchPaths`, `engine`
//! - `environment.default`
//! - `cromwell.jar`, `cromwell.configPath`
//! - `template.id` plus template-specific parameters
//! - `recipes.recipes`, `recipes.paths`, `recipes.directories`

mod loader;
mod merge;
mod recipes;
mod types;

pub use loader::{ConfigLoader, JanisConfiguration, default_document, read_document};
pub use merge::{as_string, as_string_list, is_truthy, section, value_for};
pub use recipes::{RecipeBook, RecipeStore};
pub use types::*;
