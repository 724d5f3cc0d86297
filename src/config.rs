use std::env;

use thiserror::Error;

use crate::infrastructure::paypal::{PayPalConfig, SANDBOX_API_BASE};
use crate::infrastructure::supabase::SupabaseConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub supabase: SupabaseConfig,
    pub paypal: PayPalConfig,
}

impl AppConfig {
    /// Reads the process environment (call `dotenvy::dotenv()` first to pick up
    /// a `.env` file).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port_raw = optional("PORT", "8080");
        let port: u16 = port_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "PORT",
            value: port_raw.clone(),
        })?;

        Ok(Self {
            host: optional("HOST", "0.0.0.0"),
            port,
            supabase: SupabaseConfig {
                url: required("SUPABASE_URL")?,
                service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            },
            paypal: PayPalConfig {
                api_base: optional("PAYPAL_API_BASE", SANDBOX_API_BASE),
                client_id: required("PAYPAL_CLIENT_ID")?,
                client_secret: required("PAYPAL_CLIENT_SECRET")?,
                currency: optional("PAYPAL_CURRENCY", "USD"),
            },
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
        ("SUPABASE_URL", "https://project.supabase.co"),
        ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ("PAYPAL_CLIENT_ID", "id"),
        ("PAYPAL_CLIENT_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply_when_optional_values_are_absent() {
        let config = AppConfig::from_lookup(lookup(REQUIRED)).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.paypal.api_base, SANDBOX_API_BASE);
        assert_eq!(config.paypal.currency, "USD");
    }

    #[test]
    fn missing_credentials_are_reported_by_name() {
        let err = AppConfig::from_lookup(lookup(&REQUIRED[..3])).unwrap_err();

        assert!(matches!(err, ConfigError::Missing("PAYPAL_CLIENT_SECRET")));
    }

    #[test]
    fn non_numeric_port_is_invalid() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));

        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();

        assert_eq!(err.to_string(), "PORT has an invalid value 'eighty'");
    }
}
