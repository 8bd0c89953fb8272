//! TOML configuration.
//!
//! Every section has defaults, so an absent config file behaves like an
//! empty one. See [`load_config`] for the validation rules.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use docqa_core::retrieve::{RetrievalParams, Weighting};
use docqa_core::ChunkParams;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub synthesis: SynthesisConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared with the previous chunk.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl ChunkingConfig {
    pub fn params(&self) -> Result<ChunkParams> {
        ChunkParams::new(self.chunk_size, self.overlap).context("invalid [chunking] settings")
    }
}

/// Which scorer ranks the pool.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Sparse term-vector cosine; no network.
    #[default]
    Lexical,
    /// Dense embeddings from the configured embedding provider.
    Semantic,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub weighting: Weighting,
    pub mode: RetrievalMode,
    /// Prefix each context chunk with its document name.
    pub attribute_sources: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            weighting: Weighting::TermFrequency,
            mode: RetrievalMode::Lexical,
            attribute_sources: false,
        }
    }
}

impl RetrievalConfig {
    pub fn params(&self) -> RetrievalParams {
        RetrievalParams {
            top_k: self.top_k,
            weighting: self.weighting,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisProvider {
    #[default]
    Openai,
    Disabled,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SynthesisConfig {
    pub provider: SynthesisProvider,
    pub model: String,
    pub max_tokens: u32,
    /// OpenAI-compatible API root, without a trailing `/chat/completions`.
    pub base_url: String,
    /// Explicit key; takes precedence over `api_key_env`.
    pub api_key: Option<String>,
    /// Environment variable consulted by [`Config::resolve_api_key`].
    pub api_key_env: String,
    pub system_prompt: String,
    pub timeout_secs: u64,
    /// Retries on 429/5xx/network errors. Zero disables retrying.
    pub max_retries: u32,
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Read the provided document \
context and answer the user's question accurately and concisely.";

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            provider: SynthesisProvider::Openai,
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 500,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            timeout_secs: 60,
            max_retries: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub batch_size: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            batch_size: 64,
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

impl Config {
    /// The explicit `api_key`, else the value of `api_key_env`, else `None`.
    ///
    /// This is the only place the process environment is read.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.synthesis
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(&self.synthesis.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking.params()?;

        if self.synthesis.max_tokens == 0 {
            bail!("synthesis.max_tokens must be > 0");
        }
        if self.synthesis.model.trim().is_empty() {
            bail!("synthesis.model must not be empty");
        }
        if self.embedding.batch_size == 0 {
            bail!("embedding.batch_size must be > 0");
        }
        Ok(())
    }
}

fn parse_toml(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}

/// Parse configuration from TOML text and validate it.
pub fn parse_config(content: &str) -> Result<Config> {
    let config = parse_toml(content)?;
    config.validate()?;
    Ok(config)
}

/// Read and parse a config file without validating it.
///
/// For callers that layer overrides on top and then call
/// [`Config::validate`] themselves.
pub fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_toml(&content)
}

/// Read, parse, and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = read_config(path)?;
    config.validate()?;
    Ok(config)
}
