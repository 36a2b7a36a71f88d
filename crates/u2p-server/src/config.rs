//! Server configuration.
//!
//! Values are layered with the `config` crate: built-in defaults, then an
//! optional `unity3d2png-proxy.{toml,yaml,json}` file, then environment
//! variables prefixed with `UNITY3D2PNG_PROXY_`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use u2p_git::MirrorConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "UNITY3D2PNG_PROXY";

/// Default configuration file name (extension is resolved by `config`).
pub const CONFIG_FILE: &str = "unity3d2png-proxy";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or a required key is missing.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was present but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The mirror settings were rejected.
    #[error(transparent)]
    Mirror(#[from] u2p_git::RepositoryError),
}

/// Process configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Git executable.
    #[serde(default = "default_git")]
    pub git: String,

    /// Listen address, `HOST:PORT` or `:PORT`.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Mirror location on disk.
    pub workdir: PathBuf,

    /// Remote repository URL.
    pub repository: String,

    /// Conversion service endpoint.
    pub unity3d2png_url: String,

    /// Path template rendered against the query string.
    pub path_template: String,

    /// Remote whose tracking branches are resolved.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Required suffix of the `file` field.
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Timeout for the downstream call, in seconds.
    #[serde(default = "default_downstream_timeout_secs")]
    pub downstream_timeout_secs: u64,
}

fn default_git() -> String {
    "git".to_string()
}

fn default_addr() -> String {
    ":19300".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_suffix() -> String {
    ".unity3d".to_string()
}

fn default_downstream_timeout_secs() -> u64 {
    60
}

impl ServerConfig {
    /// Loads configuration from the default file and the process environment.
    ///
    /// `UNITY3D2PNG_PROXY_CONFIG` overrides the file location; the file is
    /// then mandatory.
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(format!("{}_CONFIG", ENV_PREFIX))
            .ok()
            .map(PathBuf::from);
        Self::load_from(file.as_deref(), None)
    }

    /// Loads configuration from an explicit file and environment map.
    ///
    /// With `env == None` the process environment is used.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE).required(false),
        };

        let config: Self = Config::builder()
            .add_source(file_source)
            .add_source(Environment::with_prefix(ENV_PREFIX).source(env))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialization cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.port()?;
        self.downstream_url()?;

        if self.path_template.trim().is_empty() {
            return Err(ConfigError::Invalid("path_template cannot be empty".into()));
        }
        if self.suffix.is_empty() {
            return Err(ConfigError::Invalid("suffix cannot be empty".into()));
        }
        if self.downstream_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "downstream_timeout_secs must be positive".into(),
            ));
        }

        Ok(())
    }

    fn port(&self) -> Result<u16, ConfigError> {
        let (_, port) = self
            .addr
            .rsplit_once(':')
            .ok_or_else(|| ConfigError::Invalid(format!("addr {:?} has no port", self.addr)))?;

        port.parse()
            .map_err(|_| ConfigError::Invalid(format!("addr {:?} has an invalid port", self.addr)))
    }

    /// Returns the address to bind, expanding `:PORT` to all interfaces.
    pub fn bind_addr(&self) -> String {
        if self.addr.starts_with(':') {
            format!("0.0.0.0{}", self.addr)
        } else {
            self.addr.clone()
        }
    }

    /// Returns the parsed downstream URL.
    pub fn downstream_url(&self) -> Result<reqwest::Url, ConfigError> {
        reqwest::Url::parse(&self.unity3d2png_url).map_err(|e| {
            ConfigError::Invalid(format!(
                "unity3d2png_url {:?} is not a valid URL: {}",
                self.unity3d2png_url, e
            ))
        })
    }

    /// Returns the downstream timeout.
    pub fn downstream_timeout(&self) -> Duration {
        Duration::from_secs(self.downstream_timeout_secs)
    }

    /// Builds the mirror configuration.
    pub fn mirror_config(&self) -> Result<MirrorConfig, ConfigError> {
        let mirror = MirrorConfig::builder()
            .git(&self.git)
            .repository(&self.repository)
            .workdir(&self.workdir)
            .remote(&self.remote)
            .build()?;
        Ok(mirror)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (format!("{}_{}", ENV_PREFIX, k), v.to_string()))
                .collect(),
        )
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("WORKDIR", "/var/lib/u2p/assets"),
            ("REPOSITORY", "https://github.com/org/assets.git"),
            ("UNITY3D2PNG_URL", "http://converter:8080/convert"),
            ("PATH_TEMPLATE", "assets/{{ file }}"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::load_from(None, env(&required())).unwrap();

        assert_eq!(config.git, "git");
        assert_eq!(config.addr, ":19300");
        assert_eq!(config.bind_addr(), "0.0.0.0:19300");
        assert_eq!(config.remote, "origin");
        assert_eq!(config.suffix, ".unity3d");
        assert_eq!(config.downstream_timeout(), Duration::from_secs(60));
        assert_eq!(config.workdir, PathBuf::from("/var/lib/u2p/assets"));
        assert_eq!(config.path_template, "assets/{{ file }}");
    }

    #[test]
    fn test_overrides() {
        let mut pairs = required();
        pairs.push(("ADDR", "127.0.0.1:8080"));
        pairs.push(("GIT", "/opt/git/bin/git"));
        pairs.push(("DOWNSTREAM_TIMEOUT_SECS", "5"));

        let config = ServerConfig::load_from(None, env(&pairs)).unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.git, "/opt/git/bin/git");
        assert_eq!(config.downstream_timeout(), Duration::from_secs(5));

        let mirror = config.mirror_config().unwrap();
        assert_eq!(mirror.git(), "/opt/git/bin/git");
        assert_eq!(mirror.repository(), "https://github.com/org/assets.git");
    }

    #[test]
    fn test_missing_required() {
        let pairs: Vec<_> = required()
            .into_iter()
            .filter(|(k, _)| *k != "REPOSITORY")
            .collect();

        let err = ServerConfig::load_from(None, env(&pairs)).unwrap_err();
        assert!(err.to_string().contains("repository"), "{}", err);
    }

    #[test]
    fn test_blank_repository_is_rejected_by_mirror() {
        let mut pairs = required();
        pairs.retain(|(k, _)| *k != "REPOSITORY");
        pairs.push(("REPOSITORY", "  "));

        let config = ServerConfig::load_from(None, env(&pairs)).unwrap();
        let err = config.mirror_config().unwrap_err();

        assert!(matches!(err, ConfigError::Mirror(_)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: repository cannot be empty"
        );
    }

    #[test]
    fn test_invalid_values() {
        let mut pairs = required();
        pairs.push(("ADDR", "19300"));
        assert!(ServerConfig::load_from(None, env(&pairs)).is_err());

        let mut pairs = required();
        pairs.retain(|(k, _)| *k != "UNITY3D2PNG_URL");
        pairs.push(("UNITY3D2PNG_URL", "not a url"));
        assert!(ServerConfig::load_from(None, env(&pairs)).is_err());
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy.toml");
        std::fs::write(
            &path,
            r#"
workdir = "/srv/mirror"
repository = "git@github.com:org/assets.git"
unity3d2png_url = "http://converter/convert"
path_template = "{{ .dir }}/{{ .file }}"
suffix = ".bundle"
"#,
        )
        .unwrap();

        let config =
            ServerConfig::load_from(Some(&path), env(&[("SUFFIX", ".unity3d")])).unwrap();

        assert_eq!(config.workdir, PathBuf::from("/srv/mirror"));
        assert_eq!(config.path_template, "{{ .dir }}/{{ .file }}");
        // Environment wins over the file.
        assert_eq!(config.suffix, ".unity3d");
    }
}
