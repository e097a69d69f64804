//! Process configuration
//!
//! Credentials and knobs are collected into an explicit struct at
//! startup instead of being read ambiently throughout the code.
//! Missing credentials are fatal before any message is served.

use crate::error::AssistantError;
use crate::Result;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:finance.db?mode=rwc";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the inference collaborator.
    pub gemini_api_key: String,
    /// Shared secret the transport bridge must present on every request.
    pub transport_token: String,
    /// Ledger database URL.
    pub database_url: String,
    /// Port for the transport bridge API.
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a lookup function. Tests pass a map
    /// instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = required(&lookup, "GEMINI_API_KEY")?;
        let transport_token = required(&lookup, "TRANSPORT_TOKEN")?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                AssistantError::Config(format!("PORT is not a valid port number: {}", raw))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            gemini_api_key,
            transport_token,
            database_url,
            port,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AssistantError::Config(format!(
            "required environment variable {} is not set",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn loads_with_both_credentials() {
        let vars = env(&[
            ("GEMINI_API_KEY", "key-123"),
            ("TRANSPORT_TOKEN", "tok-456"),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.gemini_api_key, "key-123");
        assert_eq!(config.transport_token, "tok-456");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn missing_inference_key_is_fatal() {
        let vars = env(&[("TRANSPORT_TOKEN", "tok-456")]);
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn missing_transport_token_is_fatal() {
        let vars = env(&[("GEMINI_API_KEY", "key-123")]);
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("TRANSPORT_TOKEN"));
    }

    #[test]
    fn blank_credential_is_treated_as_missing() {
        let vars = env(&[("GEMINI_API_KEY", "  "), ("TRANSPORT_TOKEN", "tok")]);
        assert!(Config::from_lookup(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn optional_overrides_are_honored() {
        let vars = env(&[
            ("GEMINI_API_KEY", "key"),
            ("TRANSPORT_TOKEN", "tok"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "9090"),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let vars = env(&[
            ("GEMINI_API_KEY", "key"),
            ("TRANSPORT_TOKEN", "tok"),
            ("PORT", "not-a-port"),
        ]);
        assert!(Config::from_lookup(|k| vars.get(k).cloned()).is_err());
    }
}
