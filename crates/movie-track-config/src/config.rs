use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchOptions,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// OMDb API key (https://www.omdbapi.com/apikey.aspx).
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct SearchOptions {
    /// Queries shorter than this are not sent to the API.
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,

    /// Upper bound of the user rating scale.
    #[serde(default = "default_max_rating")]
    pub max_rating: u8,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            min_query_length: default_min_query_length(),
            max_rating: default_max_rating(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_min_query_length() -> usize {
    3
}

fn default_max_rating() -> u8 {
    10
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.api_key.is_empty() || self.api.api_key == "YOUR_API_KEY" {
            return Err(anyhow::anyhow!(
                "api_key is not configured; run 'reelkeeper config init'"
            ));
        }
        if self.api.base_url.is_empty() {
            return Err(anyhow::anyhow!("base_url cannot be empty"));
        }
        if self.search.min_query_length == 0 {
            return Err(anyhow::anyhow!("min_query_length must be at least 1"));
        }
        if self.search.max_rating == 0 {
            return Err(anyhow::anyhow!("max_rating must be at least 1"));
        }
        Ok(())
    }

    pub fn is_api_configured(&self) -> bool {
        !self.api.api_key.is_empty() && self.api.api_key != "YOUR_API_KEY"
    }
}
