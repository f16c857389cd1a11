//! Configuración de variables de entorno
//! 
//! Este módulo lee la configuración del servidor desde el entorno
//! (con `.env` cargado por `dotenvy` en `main`).

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Errores de configuración
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Backend de almacenamiento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Memory,
            database_url: None,
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración del entorno del proceso
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Leer la configuración desde una función de búsqueda arbitraria
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let storage = match lookup("STORAGE").as_deref().map(str::trim) {
            None | Some("") => {
                if database_url.is_some() {
                    StorageBackend::Postgres
                } else {
                    StorageBackend::Memory
                }
            }
            Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE",
                    value: other.to_string(),
                })
            }
        };
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);
        let port = parse_or("API_PORT", lookup("API_PORT"), defaults.port)?;
        let timeout_secs = parse_or(
            "REQUEST_TIMEOUT_SECS",
            lookup("REQUEST_TIMEOUT_SECS"),
            defaults.request_timeout.as_secs(),
        )?;
        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            storage,
            database_url,
            host,
            port,
            cors_origins,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_use_memory_storage() {
        let config = EnvironmentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.server_url(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_database_url_selects_postgres() {
        let config = EnvironmentConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/fleet"),
            ("API_PORT", "9000"),
            ("CORS_ORIGINS", "http://localhost:3000, http://admin.local"),
        ]))
        .unwrap();
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.port, 9000);
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        assert_eq!(
            EnvironmentConfig::from_lookup(lookup(&[("STORAGE", "postgres")])).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
        assert!(matches!(
            EnvironmentConfig::from_lookup(lookup(&[("API_PORT", "eighty")])),
            Err(ConfigError::Invalid { name: "API_PORT", .. })
        ));
    }
}
