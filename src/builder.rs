use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::EnvfigError;
use crate::file;
use crate::ops::{self, ConfigResult};
use crate::parse::parse;
use crate::resolve::{self, ResolveInput};
use crate::schema::Schema;
use crate::shared::SharedStore;
use crate::store::ConfigStore;
use crate::types::{ConfigAction, SearchPath};
use crate::unknown::mask_if_sensitive;

const DEFAULT_APP_NAME: &str = "musicbot";
const DEFAULT_ENV_FILE: &str = ".env";
const DEFAULT_SAMPLE_FILE: &str = ".env.sample";

/// Entry point for building a configuration store.
pub struct Envfig;

impl Envfig {
    pub fn builder() -> EnvfigBuilder {
        EnvfigBuilder::new()
    }
}

#[derive(Debug, Default)]
pub struct EnvfigBuilder {
    schema: Option<Arc<Schema>>,
    root: Option<PathBuf>,
    env_file: Option<String>,
    sample_file: Option<String>,
    app_name: Option<String>,
    search_paths: Option<Vec<SearchPath>>,
    comments_file: Option<PathBuf>,
    env_vars: Option<Vec<(String, String)>>,
    no_env: bool,
}

impl EnvfigBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// The key schema. Defaults to [`Schema::musicbot`].
    pub fn schema(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Directory holding the env files. Defaults to the working directory.
    pub fn root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root = Some(dir.into());
        self
    }

    /// Override the env file name (default: `.env`).
    pub fn env_file(mut self, name: &str) -> Self {
        self.env_file = Some(name.to_string());
        self
    }

    /// Override the sample file name (default: `.env.sample`).
    pub fn sample_file(mut self, name: &str) -> Self {
        self.sample_file = Some(name.to_string());
        self
    }

    /// Name used for the platform config directory (default: `musicbot`).
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Replace the directories searched for path-valued keys.
    /// Priority-ascending: the last entry wins.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = Some(paths);
        self
    }

    /// Append one search path (highest priority so far).
    pub fn add_search_path(mut self, path: SearchPath) -> Self {
        let mut paths = self.effective_search_paths();
        paths.push(path);
        self.search_paths = Some(paths);
        self
    }

    /// JSON `key -> comment` map replacing schema docs, e.g. `config_comments.json`.
    pub fn comments_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.comments_file = Some(path.into());
        self
    }

    /// Use these variables instead of the process environment.
    pub fn env_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env_vars = Some(vars.into_iter().collect());
        self
    }

    /// Ignore the process environment entirely.
    pub fn no_env(mut self) -> Self {
        self.no_env = true;
        self
    }

    fn effective_root(&self) -> Result<PathBuf, EnvfigError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir().map_err(|e| EnvfigError::io(".", e)),
        }
    }

    fn effective_search_paths(&self) -> Vec<SearchPath> {
        self.search_paths
            .clone()
            .unwrap_or_else(|| vec![SearchPath::Platform, SearchPath::Cwd])
    }

    fn effective_app_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }

    fn effective_paths(&self) -> Result<(PathBuf, PathBuf), EnvfigError> {
        let root = self.effective_root()?;
        let env = root.join(self.env_file.as_deref().unwrap_or(DEFAULT_ENV_FILE));
        let sample = root.join(self.sample_file.as_deref().unwrap_or(DEFAULT_SAMPLE_FILE));
        Ok((env, sample))
    }

    fn effective_schema(&self) -> Result<Arc<Schema>, EnvfigError> {
        let schema = self
            .schema
            .clone()
            .unwrap_or_else(|| Arc::new(Schema::musicbot()));
        match &self.comments_file {
            Some(path) => Ok(Arc::new((*schema).clone().with_docs_file(path)?)),
            None => Ok(schema),
        }
    }

    fn effective_env_vars(&self) -> Vec<(String, String)> {
        if self.no_env {
            return Vec::new();
        }
        match &self.env_vars {
            Some(vars) => vars.clone(),
            None => std::env::vars().collect(),
        }
    }

    /// Read `.env`, merge it with the environment and defaults, and build
    /// the store. Fails on deprecated keys and uncoercible values.
    pub fn load(self) -> Result<ConfigStore, EnvfigError> {
        let schema = self.effective_schema()?;
        let (env_path, sample_path) = self.effective_paths()?;

        let env_file = file::read_optional(&env_path)?.map(|content| parse(&content));
        debug!(path = %env_path.display(), found = env_file.is_some(), "env file read");

        let input = ResolveInput {
            env_file,
            env_vars: self.effective_env_vars(),
            search_dirs: file::expand_search_paths(
                &self.effective_search_paths(),
                self.effective_app_name(),
            ),
        };
        let resolved = resolve::resolve(&schema, input)?;

        Ok(ConfigStore::new(schema, resolved, env_path, sample_path))
    }

    /// Like [`load`](Self::load), wrapped for sharing across threads.
    pub fn load_shared(self) -> Result<SharedStore, EnvfigError> {
        self.load().map(SharedStore::new)
    }

    /// Handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(self, action: &ConfigAction) -> Result<(), EnvfigError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }

    /// Handle a `ConfigAction` (list / gen / get / set).
    ///
    /// `Set` coerces the value, then saves immediately.
    pub fn handle(self, action: &ConfigAction) -> Result<ConfigResult, EnvfigError> {
        match action {
            ConfigAction::List => {
                let store = self.load()?;
                Ok(ops::list_values(&store))
            }
            ConfigAction::Gen { output } => {
                let schema = self.effective_schema()?;
                let sample = ops::generate_sample(&schema);
                match output {
                    Some(path) => {
                        file::write_file(path, &sample)?;
                        Ok(ConfigResult::TemplateWritten { path: path.clone() })
                    }
                    None => Ok(ConfigResult::Template(sample)),
                }
            }
            ConfigAction::Get { key } => {
                let store = self.load()?;
                ops::get_value(&store, key)
            }
            ConfigAction::Set { key, value } => {
                let mut store = self.load()?;
                store.set_raw(key, value)?;
                store.save()?;
                Ok(ConfigResult::ValueSet {
                    key: key.clone(),
                    value: mask_if_sensitive(key, &store.get(key)?.to_env_text()),
                })
            }
        }
    }
}
