use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use weaviate_migrate::{PropertyScope, StoreConfig};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "weaviate-migrate.toml";

/// Store URL used when neither a flag, the environment nor the config names one.
pub const DEFAULT_STORE_URL: &str = "http://localhost:8080";

static ENV_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env reference pattern should compile"));

/// Project context for weaviate-migrate operations
pub struct ProjectContext {
    /// Directory holding the config file, or the working directory without one
    pub project_root: PathBuf,
    pub config_path: PathBuf,
    /// Loaded configuration, `None` when no config file exists
    pub config: Option<ProjectConfig>,
}

/// Contents of `weaviate-migrate.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub migrations: MigrationSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub source: SourceSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSettings {
    #[serde(default = "default_migrations_folder")]
    pub folder: String,
    #[serde(default)]
    pub property_scope: ScopeSetting,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            folder: default_migrations_folder(),
            property_scope: ScopeSetting::default(),
        }
    }
}

fn default_migrations_folder() -> String {
    "migrations".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeSetting {
    #[default]
    SchemaWide,
    PerClass,
}

impl From<ScopeSetting> for PropertyScope {
    fn from(setting: ScopeSetting) -> Self {
        match setting {
            ScopeSetting::SchemaWide => PropertyScope::SchemaWide,
            ScopeSetting::PerClass => PropertyScope::PerClass,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_schema_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    #[serde(default)]
    pub model_prefix: String,
}

/// Store connection flags shared by the commands that talk to a store
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Store base URL
    #[arg(long, env = "WEAVIATE_URL")]
    pub url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "WEAVIATE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl ProjectContext {
    /// Find the project from the working directory or its ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Find the project starting from the given directory.
    ///
    /// Without a config file anywhere up the tree, the start directory becomes
    /// the project root and defaults apply.
    pub fn find_from(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start).unwrap_or_else(|| start.to_path_buf());
        Self::from_root(project_root)
    }

    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config: ProjectConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            Some(config)
        } else {
            None
        };

        Ok(Self {
            project_root,
            config_path,
            config,
        })
    }

    fn find_project_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(CONFIG_FILE).is_file())
            .map(Path::to_path_buf)
    }

    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    /// One line naming the config in effect, for verbose output.
    pub fn describe(&self) -> String {
        if self.is_initialized() {
            format!("Using config {}", self.config_path.display())
        } else {
            format!("No {CONFIG_FILE} found from {}, using defaults", self.project_root.display())
        }
    }

    fn settings(&self) -> ProjectConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Migration folder: the flag if given, else the config, relative to the project root
    pub fn migrations_dir(&self, flag: Option<&Path>) -> PathBuf {
        match flag {
            Some(path) => path.to_path_buf(),
            None => self.project_root.join(self.settings().migrations.folder),
        }
    }

    pub fn property_scope(&self, per_class_flag: bool) -> PropertyScope {
        if per_class_flag {
            PropertyScope::PerClass
        } else {
            self.settings().migrations.property_scope.into()
        }
    }

    /// Path from the `[source]` section, resolved against the project root
    pub fn source_path(&self, value: Option<&String>) -> Option<PathBuf> {
        value.map(|v| self.project_root.join(v))
    }

    pub fn source_settings(&self) -> SourceSettings {
        self.settings().source
    }

    /// Connection settings: flags (and their env fallbacks) override the config file.
    pub fn store_config(&self, args: &StoreArgs) -> Result<StoreConfig> {
        let settings = self.settings().store;

        let url = match (&args.url, &settings.url) {
            (Some(url), _) => url.clone(),
            (None, Some(url)) => expand_env(url)?,
            (None, None) => DEFAULT_STORE_URL.to_string(),
        };

        let api_key = match (&args.api_key, &settings.api_key) {
            (Some(key), _) => Some(key.clone()),
            (None, Some(key)) => Some(expand_env(key)?),
            (None, None) => None,
        };

        let timeout = args.timeout.or(settings.timeout_secs);

        let mut config = StoreConfig::new(&url)?.with_api_key(api_key);
        if let Some(secs) = timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

/// Replace every `${VAR}` in `value` with the variable's value.
pub fn expand_env(value: &str) -> Result<String> {
    let mut missing = None;
    let expanded = ENV_REFERENCE.replace_all(value, |caps: &Captures| {
        let name = &caps[1];
        match std::env::var(name) {
            Ok(resolved) => resolved,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    if let Some(name) = missing {
        anyhow::bail!("Environment variable {name} not set");
    }
    Ok(expanded.into_owned())
}
