//! Configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys use `__`, e.g. `APP_EMBEDDING__PROVIDER=ollama`). Provides
//! helpers to expand `~` and `${VAR}` and to resolve relative paths against a
//! known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{SearchMode, DEFAULT_LEXICAL_FIELDS};

/// Which `TextEmbedder` implementation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic hash-seeded embedder for tests and offline development.
    #[default]
    Hash,
    /// Ollama `/api/embed`.
    Ollama,
    /// OpenAI-compatible `/v1/embeddings`.
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    pub dim: usize,
    /// Hash seed for the `hash` provider.
    pub seed: u64,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hash,
            dim: 768,
            seed: 0,
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_mode: SearchMode,
    pub default_limit: usize,
    pub max_limit: usize,
    pub lexical_fields: Vec<String>,
    /// Search with the expanded query produced by query understanding.
    pub expand_queries: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_mode: SearchMode::Hybrid,
            default_limit: 10,
            max_limit: 100,
            lexical_fields: DEFAULT_LEXICAL_FIELDS.iter().map(|f| f.to_string()).collect(),
            expand_queries: false,
        }
    }
}

impl SearchSettings {
    /// Clamp a caller-supplied limit into `1..=max_limit`, using the default for `None`.
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).clamp(1, self.max_limit.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub embedding: EmbeddingSettings,
    pub search: SearchSettings,
}

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    /// Load from the working directory using `RUST_ENV` (default `dev`).
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    pub fn load_from(base: &Path, env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(base.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, env_name: env_name.to_string() };
        config.validate_for_env(&config.settings()?)?;
        Ok(config)
    }

    /// Extract one dotted key, e.g. `embedding.dim`.
    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    fn validate_for_env(&self, settings: &Settings) -> Result<()> {
        if settings.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be positive".to_string()));
        }
        if settings.search.default_limit == 0 {
            return Err(Error::InvalidConfig("search.default_limit must be positive".to_string()));
        }
        if settings.search.lexical_fields.is_empty() {
            return Err(Error::InvalidConfig("search.lexical_fields must not be empty".to_string()));
        }
        if settings.embedding.provider != EmbeddingProvider::Hash && settings.embedding.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("embedding.base_url is required for remote providers".to_string()));
        }
        match self.env_name.as_str() {
            "prod" | "production" => {
                if settings.embedding.provider == EmbeddingProvider::Hash {
                    return Err(Error::InvalidConfig(
                        "the hash embedder is a test double and cannot serve production".to_string(),
                    ));
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
