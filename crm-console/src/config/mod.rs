use std::path::PathBuf;
use std::sync::Arc;

use crm_access::{
    AllowListValidator, CredentialValidator, FileStorage, MemoryStorage, NonEmptyValidator,
    Office, ProfileTemplate, RedisStorage, SessionStorage, DEFAULT_SESSION_KEY,
};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    pub session: SessionSettings,
    pub credentials: CredentialSettings,
    pub offices: Vec<Office>,
    /// Profile handed to every authenticated session.
    pub access: ProfileTemplate,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// OTLP collector endpoint (e.g., http://tempo:4317). Tracing export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    File,
    Redis,
}

#[derive(Deserialize, Clone)]
pub struct SessionSettings {
    pub backend: StorageBackend,
    #[serde(default = "default_session_key")]
    pub key: String,
    /// Document path for the `file` backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Connection URL for the `redis` backend.
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

fn default_session_path() -> PathBuf {
    PathBuf::from(".crm").join("session.json")
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMode {
    NonEmpty,
    AllowList,
}

#[derive(Deserialize, Clone)]
pub struct CredentialSettings {
    pub mode: CredentialMode,
    #[serde(default)]
    pub users: Vec<UserCredential>,
}

#[derive(Deserialize, Clone)]
pub struct UserCredential {
    pub identifier: String,
    pub secret: Secret<String>,
}

impl SessionSettings {
    pub async fn build_storage(&self) -> anyhow::Result<Arc<dyn SessionStorage>> {
        let storage: Arc<dyn SessionStorage> = match self.backend {
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
            StorageBackend::File => {
                let path = self.path.clone().unwrap_or_else(default_session_path);
                tracing::info!(path = %path.display(), "Using file session storage");
                Arc::new(FileStorage::new(path))
            }
            StorageBackend::Redis => {
                let url = self.redis_url.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("session.redis_url is required for the redis backend")
                })?;
                Arc::new(RedisStorage::connect(url).await?)
            }
        };
        Ok(storage)
    }
}

impl CredentialSettings {
    pub fn build_validator(&self) -> anyhow::Result<Arc<dyn CredentialValidator>> {
        match self.mode {
            CredentialMode::NonEmpty => Ok(Arc::new(NonEmptyValidator)),
            CredentialMode::AllowList => {
                if self.users.is_empty() {
                    anyhow::bail!("credentials.users must not be empty in allow_list mode");
                }
                Ok(Arc::new(AllowListValidator::new(
                    self.users
                        .iter()
                        .map(|u| (u.identifier.clone(), u.secret.clone())),
                )))
            }
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

    // Running from the workspace root or from inside crm-console
    let configuration_directory = if base_path.ends_with("crm-console") {
        base_path.join("config")
    } else {
        base_path.join("crm-console").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
