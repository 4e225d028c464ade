use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::git::RepositoryContext;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub ai: AIConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RepositoryConfig {
    pub path: Option<PathBuf>,
    pub ssh_key_path: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AIConfig {
    pub model: String,
    pub max_tokens: u32,
    pub anthropic_api_key: Option<String>,
    pub api_url: Option<String>,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            anthropic_api_key: None,
            api_url: None,
        }
    }
}

impl AIConfig {
    /// The configured key, if any. Empty strings count as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.anthropic_api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn endpoint(&self) -> &str {
        self.api_url.as_deref().filter(|u| !u.is_empty()).unwrap_or(DEFAULT_API_URL)
    }
}

/// External programs, looked up on PATH unless absolute.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub git: String,
    pub forge: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            forge: "gh".to_string(),
        }
    }
}

impl Config {
    pub fn create_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {:?}", parent))?;
        }
        fs::write(path, content).with_context(|| format!("writing config to {:?}", path))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the user's config (defaults when the file is absent) and applies
    /// environment overrides. Meant to be called once per command.
    pub fn load_or_default() -> Result<Self> {
        let path = get_config_path()?;
        let mut config = if path.exists() {
            Self::load(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(key) = set("ANTHROPIC_API_KEY") {
            self.ai.anthropic_api_key = Some(key);
        }
        if let Some(path) = set("PRSCRIBE_REPOSITORY_PATH") {
            self.repository.path = Some(PathBuf::from(path));
        }
        if let Some(path) = set("PRSCRIBE_SSH_KEY_PATH") {
            self.repository.ssh_key_path = Some(PathBuf::from(path));
        }
    }

    pub fn repository_context(&self) -> RepositoryContext {
        RepositoryContext {
            repository_path: self.repository.path.clone(),
            ssh_key_path: self.repository.ssh_key_path.clone(),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "prscribe", "prscribe")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
