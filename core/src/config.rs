use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Process configuration, loaded once before the registry is built.
///
/// The core treats these values as opaque constants; nothing here is
/// mutated after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token presented by the transport layer. Opaque to the core.
    pub auth_token: String,
    /// API key for the clist.by contest aggregator.
    pub clist_api_key: String,
    /// Contact identity returned by the `meta:validate` tool.
    pub owner_contact: String,
    /// Fallback user handle for tools that accept an optional handle.
    pub default_handle: Option<String>,
    /// Health endpoint pinged by the keep-alive task, if deployed.
    pub keepalive_url: Option<String>,
}

impl Config {
    /// Reads configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            auth_token: require("AUTH_TOKEN")?,
            clist_api_key: require("CLIST_API_KEY")?,
            owner_contact: require("OWNER_CONTACT")?,
            default_handle: optional("DEFAULT_HANDLE"),
            keepalive_url: optional("KEEPALIVE_URL"),
        })
    }

    pub fn defaults(&self) -> RuntimeDefaults {
        RuntimeDefaults {
            default_handle: self.default_handle.clone(),
        }
    }
}

/// Process-wide convenience defaults injected into argument validation.
#[derive(Debug, Clone, Default)]
pub struct RuntimeDefaults {
    pub default_handle: Option<String>,
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
