use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub youtube_api_key: String,
    pub youtube_api_base_url: Option<String>,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base_url: Option<String>,
    pub resend_api_key: String,
    pub resend_from_email: String,
    pub resend_api_base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup (environment, map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} must be set", key))
        };

        Ok(Self {
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            youtube_api_key: required("YOUTUBE_API_KEY")?,
            youtube_api_base_url: lookup("YOUTUBE_API_BASE_URL"),
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: lookup("GEMINI_MODEL")
                .unwrap_or_else(|| gemini_client::DEFAULT_MODEL.to_string()),
            gemini_api_base_url: lookup("GEMINI_API_BASE_URL"),
            resend_api_key: required("RESEND_API_KEY")?,
            resend_from_email: required("RESEND_FROM_EMAIL")?,
            resend_api_base_url: lookup("RESEND_API_BASE_URL"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("YOUTUBE_API_KEY", "yt"),
        ("GEMINI_API_KEY", "gm"),
        ("RESEND_API_KEY", "re"),
        ("RESEND_FROM_EMAIL", "doctor@example.com"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(REQUIRED)).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert!(config.youtube_api_base_url.is_none());
        assert_eq!(config.resend_from_email, "doctor@example.com");
    }

    #[test]
    fn test_missing_required_key_names_variable() {
        let err = Config::from_lookup(lookup(&REQUIRED[1..])).unwrap_err();
        assert_eq!(err.to_string(), "YOUTUBE_API_KEY must be set");
    }

    #[test]
    fn test_blank_required_key_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs[2] = ("RESEND_API_KEY", "  ");
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err.to_string(), "RESEND_API_KEY must be set");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err.to_string(), "PORT must be a valid number");
    }

    #[test]
    fn test_overrides_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "8080"));
        pairs.push(("GEMINI_MODEL", "gemini-1.5-pro"));
        pairs.push(("RESEND_API_BASE_URL", "http://localhost:4000"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert_eq!(
            config.resend_api_base_url.as_deref(),
            Some("http://localhost:4000")
        );
    }
}
