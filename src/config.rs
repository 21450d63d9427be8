use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path of the JSON document backing every repository
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Document loaded into the store when it holds no users and no content
    #[serde(default)]
    pub seed_file: Option<PathBuf>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Fixed seed for recommendation scores; unset means fresh randomness
    #[serde(default)]
    pub score_seed: Option<u64>,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data/db.json")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.data_file, PathBuf::from("data/db.json"));
        assert_eq!(config.bind_address(), "127.0.0.1:3001");
        assert_eq!(config.score_seed, None);
        assert_eq!(config.seed_file, None);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_iter(vec![
            ("DATA_FILE".to_string(), "/tmp/store.json".to_string()),
            ("PORT".to_string(), "8080".to_string()),
            ("SCORE_SEED".to_string(), "42".to_string()),
            ("SEED_FILE".to_string(), "data/seed.json".to_string()),
        ])
        .unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/store.json"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.score_seed, Some(42));
        assert_eq!(config.seed_file, Some(PathBuf::from("data/seed.json")));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::from_iter(vec![("PORT".to_string(), "not-a-port".to_string())]);
        assert!(result.is_err());
    }
}
