//! Named configuration presets ("recipes").
//!
//! Recipes come from three places, later sources overwriting same-named
//! recipes from earlier ones:
//! 1. **Inline** - the document's `recipes.recipes` mapping
//! 2. **Files** - `JANIS_RECIPEPATHS` then `recipes.paths`; each file maps recipe name to document
//! 3. **Directories** - `JANIS_RECIPEDIRECTORY` then `recipes.directories`; one recipe per file
//!
//! Loading is lazy: the first lookup reads every source. A file that can't be
//! read or parsed is logged and skipped.

use super::loader::read_document;
use super::merge::{as_string_list, update, value_for};
use super::types::keys;
use crate::env::{EnvSource, EnvVariable, SharedEnv, expand_home};
use crate::error::{ConfigError, ConfigResult};
use arc_swap::ArcSwapOption;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Loaded recipes by name, in name order.
pub type RecipeBook = BTreeMap<String, Value>;

/// Extensions picked up from recipe directories.
const RECIPE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Lazily loaded recipe store.
#[derive(Serialize)]
pub struct RecipeStore {
    /// Recipes declared inline in the document.
    pub recipes: BTreeMap<String, Value>,
    /// Recipe files declared in the document.
    #[serde(rename = "paths")]
    pub recipe_paths: Vec<String>,
    /// Recipe directories declared in the document.
    #[serde(rename = "directories")]
    pub recipe_directories: Vec<String>,
    #[serde(skip)]
    env: SharedEnv,
    #[serde(skip)]
    loaded: ArcSwapOption<RecipeBook>,
}

impl std::fmt::Debug for RecipeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeStore")
            .field("recipes", &self.recipes)
            .field("recipe_paths", &self.recipe_paths)
            .field("recipe_directories", &self.recipe_directories)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl Clone for RecipeStore {
    fn clone(&self) -> Self {
        Self {
            recipes: self.recipes.clone(),
            recipe_paths: self.recipe_paths.clone(),
            recipe_directories: self.recipe_directories.clone(),
            env: Arc::clone(&self.env),
            loaded: ArcSwapOption::new(self.loaded.load_full()),
        }
    }
}

impl RecipeStore {
    pub fn new(
        recipes: BTreeMap<String, Value>,
        recipe_paths: Vec<String>,
        recipe_directories: Vec<String>,
        env: SharedEnv,
    ) -> Self {
        Self {
            recipes,
            recipe_paths,
            recipe_directories,
            env,
            loaded: ArcSwapOption::empty(),
        }
    }

    /// Build the section from the document's `recipes` mapping and its defaults.
    pub fn build(doc: Option<&Value>, defaults: Option<&Value>, env: SharedEnv) -> Self {
        let recipes = value_for(doc, keys::RECIPES, defaults)
            .and_then(Value::as_object)
            .map(|m| m.clone().into_iter().collect())
            .unwrap_or_default();
        let recipe_paths = value_for(doc, keys::RECIPE_PATHS, defaults)
            .map(as_string_list)
            .unwrap_or_default();
        let recipe_directories = value_for(doc, keys::RECIPE_DIRECTORIES, defaults)
            .map(as_string_list)
            .unwrap_or_default();

        Self::new(recipes, recipe_paths, recipe_directories, env)
    }

    /// Whether the sources have been read.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load().is_some()
    }

    /// Read every recipe source.
    ///
    /// Does nothing once loaded unless `force` is set or no recipe files or
    /// directories are configured. Concurrent first loads each build the same
    /// book; the last store wins.
    pub fn load(&self, force: bool) {
        if !force && self.is_loaded() && self.has_sources() {
            return;
        }
        let book = self.read_sources();
        debug!(count = book.len(), "Loaded recipes");
        self.loaded.store(Some(Arc::new(book)));
    }

    fn book(&self) -> Arc<RecipeBook> {
        self.load(false);
        self.loaded.load_full().unwrap_or_default()
    }

    fn has_sources(&self) -> bool {
        !self.file_paths().is_empty() || !self.directory_paths().is_empty()
    }

    /// Recipe file paths in load order: environment first, then the document.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.ordered_sources(EnvVariable::RecipePaths, &self.recipe_paths)
    }

    /// Recipe directories in load order: environment first, then the document.
    pub fn directory_paths(&self) -> Vec<PathBuf> {
        self.ordered_sources(EnvVariable::RecipeDirectory, &self.recipe_directories)
    }

    fn ordered_sources(&self, var: EnvVariable, from_doc: &[String]) -> Vec<PathBuf> {
        let env: &dyn EnvSource = self.env.as_ref();
        let from_env = var.resolve_list(env, true).unwrap_or_default();
        from_env
            .iter()
            .chain(from_doc)
            .map(|p| expand_home(p, env))
            .collect()
    }

    fn read_sources(&self) -> RecipeBook {
        let mut book = self.recipes.clone();

        for path in self.file_paths() {
            match read_recipe_file(&path) {
                Ok(recipes) => book.extend(recipes),
                Err(e) => error!("Couldn't load recipe '{}': {}", path.display(), e),
            }
        }

        for dir in self.directory_paths() {
            match read_recipe_directory(&dir) {
                Ok(recipes) => book.extend(recipes),
                Err(e) => error!("Couldn't load recipe directory '{}': {}", dir.display(), e),
            }
        }

        book
    }

    /// Names of every known recipe, sorted.
    pub fn names(&self) -> Vec<String> {
        self.book().keys().cloned().collect()
    }

    /// Look up a single recipe. A recipe with a null body is an empty mapping.
    pub fn get_recipe(&self, name: &str) -> ConfigResult<Value> {
        let book = self.book();
        match book.get(name) {
            Some(Value::Null) => Ok(Value::Object(Map::new())),
            Some(recipe) => Ok(recipe.clone()),
            None => Err(ConfigError::UnknownRecipe {
                name: name.to_string(),
                known: book.keys().cloned().collect(),
            }),
        }
    }

    /// Merge several recipes in request order; later names overwrite earlier keys.
    ///
    /// Unknown names are logged and skipped.
    pub fn get_recipes<S: AsRef<str>>(&self, names: &[S]) -> Value {
        let book = self.book();
        let mut merged = Map::new();

        for name in names {
            let name = name.as_ref();
            match book.get(name) {
                Some(Value::Object(recipe)) => update(&mut merged, recipe.clone()),
                Some(Value::Null) => {}
                Some(_) => warn!("Recipe '{}' is not a mapping, skipping", name),
                None => warn!("Couldn't find '{}' in known recipes", name),
            }
        }

        Value::Object(merged)
    }
}

/// A recipe file is a mapping of recipe name to recipe document.
fn read_recipe_file(path: &Path) -> ConfigResult<RecipeBook> {
    match read_document(path)? {
        Some(Value::Object(map)) => Ok(map.into_iter().collect()),
        None => Ok(RecipeBook::new()),
        Some(_) => Err(ConfigError::io(
            path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "expected a mapping of recipe name to document",
            ),
        )),
    }
}

/// Every recipe-like file in `dir` becomes a recipe named after its stem.
fn read_recipe_directory(dir: &Path) -> ConfigResult<RecipeBook> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::io(dir, e))?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| RECIPE_EXTENSIONS.contains(&ext))
        })
        .collect();
    files.sort();

    let mut book = RecipeBook::new();
    for file in files {
        let Some(name) = file.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match read_document(&file) {
            Ok(recipe) => {
                book.insert(name.to_string(), recipe.unwrap_or_default());
            }
            Err(e) => error!("Couldn't load recipe '{}': {}", file.display(), e),
        }
    }

    Ok(book)
}
