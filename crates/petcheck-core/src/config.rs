//! Suite configuration: target server, id strategy, fixture hygiene

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variables that override the config file.
pub const ENV_SCHEME: &str = "PETCHECK_SCHEME";
pub const ENV_HOST: &str = "PETCHECK_HOST";
pub const ENV_PORT: &str = "PETCHECK_PORT";
pub const ENV_IDS: &str = "PETCHECK_IDS";
pub const ENV_SEED: &str = "PETCHECK_SEED";

/// Suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL scheme of the server under test
    pub scheme: String,

    /// Host of the server under test
    pub host: String,

    /// Port of the server under test
    pub port: u16,

    /// API path prefix
    pub base_path: String,

    /// Extra HTTP headers sent with every request
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds (unset = HTTP client default)
    pub timeout_secs: Option<u64>,

    /// How entity ids are chosen for created pets and orders
    pub ids: IdStrategy,

    /// Seed for the run-scoped id sequence (unset = random per run)
    pub seed: Option<u64>,

    /// Pet id assumed never to exist on the server
    pub missing_pet_id: i64,

    /// Order id assumed never to exist on the server
    pub missing_order_id: i64,

    /// Delete fixture-created entities after each case
    pub teardown: bool,
}

/// Entity id selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Unique ids per run, so reruns and shared servers don't collide
    #[default]
    RunScoped,
    /// The fixed literal ids (1, 10, ...) every run
    Literal,
}

impl std::str::FromStr for IdStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run_scoped" | "run-scoped" => Ok(Self::RunScoped),
            "literal" => Ok(Self::Literal),
            other => Err(ConfigError::Parse(format!(
                "unknown id strategy '{other}' (expected run_scoped or literal)"
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 8080,
            base_path: "/api/v3".to_string(),
            headers: HashMap::new(),
            timeout_secs: None,
            ids: IdStrategy::default(),
            seed: None,
            missing_pet_id: 9999,
            missing_order_id: 9999,
            teardown: false,
        }
    }
}

impl Config {
    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.scheme,
            self.host,
            self.port,
            self.base_path.trim_end_matches('/')
        )
    }

    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.petcheck.toml)
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".petcheck.toml", ".petcheck.json", "petcheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Apply `PETCHECK_*` environment overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but empty, not UTF-8, or unparsable.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_from(|name| match std::env::var(name) {
            Ok(v) => Ok(Some(v)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::Env(
                name.to_string(),
                "must be valid UTF-8".to_string(),
            )),
        })
    }

    /// Apply overrides from an arbitrary variable source.
    fn with_env_from(
        mut self,
        lookup: impl Fn(&str) -> Result<Option<String>, ConfigError>,
    ) -> Result<Self, ConfigError> {
        let read = |name: &str| -> Result<Option<String>, ConfigError> {
            match lookup(name)? {
                Some(v) if v.trim().is_empty() => Err(ConfigError::Env(
                    name.to_string(),
                    "must not be empty".to_string(),
                )),
                other => Ok(other.map(|v| v.trim().to_string())),
            }
        };

        if let Some(scheme) = read(ENV_SCHEME)? {
            self.scheme = scheme;
        }
        if let Some(host) = read(ENV_HOST)? {
            self.host = host;
        }
        if let Some(port) = read(ENV_PORT)? {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::Env(ENV_PORT.to_string(), format!("invalid port '{port}'")))?;
        }
        if let Some(ids) = read(ENV_IDS)? {
            self.ids = ids
                .parse()
                .map_err(|e: ConfigError| ConfigError::Env(ENV_IDS.to_string(), e.to_string()))?;
        }
        if let Some(seed) = read(ENV_SEED)? {
            self.seed = Some(seed.parse().map_err(|_| {
                ConfigError::Env(ENV_SEED.to_string(), format!("invalid seed '{seed}'"))
            })?);
        }
        Ok(self)
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# petcheck configuration

# Server under test: {scheme}://{host}:{port}{base_path}
scheme = "http"
host = "localhost"
port = 8080
base_path = "/api/v3"

# Request timeout in seconds (default: HTTP client default, never retried)
# timeout_secs = 10

# Entity ids: "run_scoped" (unique per run) or "literal" (1, 10, ... every run)
ids = "run_scoped"
# seed = 42

# Ids assumed never to exist on the server
missing_pet_id = 9999
missing_order_id = 9999

# Delete fixture-created pets/orders after each case
teardown = false

# Extra HTTP headers
[headers]
# api_key = "special-key"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid environment variable {0}: {1}")]
    Env(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Result<Option<String>, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| Ok(map.get(name).cloned())
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.base_url(), "http://localhost:8080/api/v3");
        assert_eq!(config.ids, IdStrategy::RunScoped);
        assert_eq!(config.missing_pet_id, 9999);
        assert_eq!(config.missing_order_id, 9999);
        assert!(!config.teardown);
    }

    #[test]
    fn base_url_trims_trailing_slash() {
        let config = Config {
            base_path: "/api/v3/".into(),
            ..Config::default()
        };
        assert_eq!(config.base_url(), "http://localhost:8080/api/v3");
    }

    #[test]
    fn parse_toml() {
        let toml = r#"
scheme = "https"
host = "5.181.109.28"
port = 9090
ids = "literal"
seed = 7

[headers]
api_key = "special-key"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.base_url(), "https://5.181.109.28:9090/api/v3");
        assert_eq!(config.ids, IdStrategy::Literal);
        assert_eq!(config.seed, Some(7));
        assert_eq!(
            config.headers.get("api_key"),
            Some(&"special-key".to_string())
        );
        assert_eq!(config.missing_pet_id, 9999);
    }

    #[test]
    fn example_config_parses() {
        let config: Config = toml::from_str(Config::example()).unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080/api/v3");
        assert_eq!(config.ids, IdStrategy::RunScoped);
    }

    #[test]
    fn load_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("petcheck.json");
        std::fs::write(&path, r#"{"host": "petstore.local", "port": 80}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url(), "http://petstore.local:80/api/v3");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn load_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let config = Config::default()
            .with_env_from(env_of(&[
                (ENV_HOST, "10.0.0.5"),
                (ENV_PORT, "9090"),
                (ENV_IDS, "literal"),
                (ENV_SEED, "42"),
            ]))
            .unwrap();
        assert_eq!(config.base_url(), "http://10.0.0.5:9090/api/v3");
        assert_eq!(config.ids, IdStrategy::Literal);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn env_empty_value_rejected() {
        let err = Config::default()
            .with_env_from(env_of(&[(ENV_HOST, "  ")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_HOST));
    }

    #[test]
    fn env_invalid_port_rejected() {
        let err = Config::default()
            .with_env_from(env_of(&[(ENV_PORT, "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("invalid port"));
    }

    #[test]
    fn env_unknown_id_strategy_rejected() {
        let err = Config::default()
            .with_env_from(env_of(&[(ENV_IDS, "sequential")]))
            .unwrap_err();
        assert!(err.to_string().contains("sequential"));
    }
}
