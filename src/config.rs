use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_LLM_MODEL: &str = "deepseek/deepseek-chat-v3-0324";

#[derive(Clone, Debug)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub llm: LlmSettings,
    pub fetch_timeout: Duration,
    pub head_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .ok_or_else(|| AppError::ConfigError("OPENROUTER_API_KEY must be set".to_string()))?;
        let base_url = lookup("OPENROUTER_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string());
        let model = lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());

        // Load server configuration with defaults
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let fetch_timeout = seconds(&lookup, "HOROSCOPE_FETCH_TIMEOUT_SECS", 10)?;
        let head_timeout = seconds(&lookup, "HOROSCOPE_HEAD_TIMEOUT_SECS", 5)?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            llm: LlmSettings {
                api_key,
                base_url: base_url.trim_end_matches('/').to_string(),
                model,
            },
            fetch_timeout,
            head_timeout,
        })
    }
}

fn seconds<F>(lookup: &F, key: &str, default: u64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(Duration::from_secs(default));
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::ConfigError(format!("{} must be positive", key))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(AppError::ConfigError(format!("Invalid {}: {}", key, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_applied() {
        let config = config_from(&[("OPENROUTER_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.server_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.llm.base_url, DEFAULT_OPENROUTER_BASE_URL);
        assert_eq!(config.llm.model, DEFAULT_LLM_MODEL);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.head_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_port = config_from(&[("OPENROUTER_API_KEY", "k"), ("PORT", "seventy")]);
        assert!(matches!(bad_port, Err(AppError::ConfigError(_))));

        let zero_timeout = config_from(&[
            ("OPENROUTER_API_KEY", "k"),
            ("HOROSCOPE_FETCH_TIMEOUT_SECS", "0"),
        ]);
        assert!(matches!(zero_timeout, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("OPENROUTER_API_KEY", "k"),
            ("OPENROUTER_BASE_URL", "http://localhost:9000/v1/"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("HOROSCOPE_HEAD_TIMEOUT_SECS", "2"),
        ])
        .unwrap();
        assert_eq!(config.llm.base_url, "http://localhost:9000/v1");
        assert_eq!(config.server_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.head_timeout, Duration::from_secs(2));
    }
}
