use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Storage
    pub database_path: String,

    // Metadata
    pub entity_registry_file: Option<String>,

    // Languages offered by the per-bundle selector, besides site_default
    pub assignable_langcodes: Vec<String>,

    // Security
    pub admin_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "language_settings.db".to_string()),

            entity_registry_file: std::env::var("ENTITY_REGISTRY_FILE").ok(),

            assignable_langcodes: std::env::var("ASSIGNABLE_LANGCODES")
                .unwrap_or_else(|_| "en,es,fr,de".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            admin_api_key: std::env::var("ADMIN_API_KEY").ok(),
        })
    }

    /// Config for production-like deployments where the admin key must be
    /// present rather than optional.
    pub fn from_env_strict() -> Result<Self> {
        let mut config = Self::from_env()?;
        config.admin_api_key =
            Some(std::env::var("ADMIN_API_KEY").context("ADMIN_API_KEY not set")?);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignable_langcodes_parsing() {
        let parsed: Vec<String> = "en, es ,fr,,de"
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        assert_eq!(parsed, vec!["en", "es", "fr", "de"]);
    }

    #[test]
    fn test_default_config_shape() {
        let config = Config {
            port: 8080,
            database_path: "language_settings.db".to_string(),
            entity_registry_file: None,
            assignable_langcodes: vec!["en".to_string(), "fr".to_string()],
            admin_api_key: None,
        };
        assert_eq!(config.port, 8080);
        assert!(config.admin_api_key.is_none());
    }
}
