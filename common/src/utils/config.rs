use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::utils::embedding::EmbeddingBackend;

/// Process-wide configuration, loaded once at startup and passed explicitly
/// to every component that needs it. `openai_api_key` has no default, so a
/// missing credential fails startup.
#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    #[serde(default = "default_model")]
    pub openai_model: String,
    #[serde(default = "default_embedding_model")]
    pub openai_embedding_model: String,
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,
    #[serde(default = "default_index_dir")]
    pub index_dir: String,
    #[serde(default = "default_markdown_dir")]
    pub markdown_dir: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

fn default_model() -> String {
    "gpt-5.2".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-large".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_dimensions() -> u32 {
    1536
}

fn default_index_dir() -> String {
    "./data/index".to_string()
}

fn default_markdown_dir() -> String {
    "./data/raw_md".to_string()
}

fn default_http_port() -> u16 {
    3000
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
