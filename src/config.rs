use std::fmt;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "todoitems.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// SQLite path, or `:memory:`.
    pub database: String,
    pub base_path: String,
    pub environment: Environment,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPort(String),
    InvalidEnvironment(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(value) => {
                write!(f, "TODOAPI_PORT must be a port number, got {value:?}")
            }
            ConfigError::InvalidEnvironment(value) => write!(
                f,
                "TODOAPI_ENV must be \"development\" or \"production\", got {value:?}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("TODOAPI_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let database = lookup("TODOAPI_DATABASE")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let base_path = lookup("TODOAPI_BASE_PATH")
            .map(|path| normalize_base_path(&path))
            .unwrap_or_default();

        let environment = match lookup("TODOAPI_ENV") {
            None => Environment::Production,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "development" | "dev" => Environment::Development,
                "production" | "prod" => Environment::Production,
                _ => return Err(ConfigError::InvalidEnvironment(value)),
            },
        };

        Ok(Config {
            port,
            database,
            base_path,
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// `"api/"` -> `"/api"`, `"/"` -> `""`.
pub fn normalize_base_path(path: &str) -> String {
    let path = path.trim().trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert_eq!(config.base_path, "");
        assert!(!config.is_development());
    }

    #[test]
    fn reads_all_variables() {
        let config = config(&[
            ("TODOAPI_PORT", "3000"),
            ("TODOAPI_DATABASE", ":memory:"),
            ("TODOAPI_BASE_PATH", "todo/"),
            ("TODOAPI_ENV", "Development"),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database, ":memory:");
        assert_eq!(config.base_path, "/todo");
        assert!(config.is_development());
    }

    #[test]
    fn invalid_values_name_the_problem() {
        assert_eq!(
            config(&[("TODOAPI_PORT", "http")]),
            Err(ConfigError::InvalidPort("http".to_string()))
        );
        assert_eq!(
            config(&[("TODOAPI_ENV", "staging")]),
            Err(ConfigError::InvalidEnvironment("staging".to_string()))
        );
    }

    #[test]
    fn base_path_normalization() {
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path(""), "");
        assert_eq!(normalize_base_path("api"), "/api");
        assert_eq!(normalize_base_path("/api/v1/"), "/api/v1");
    }
}
