//! Store configuration
//!
//! [`StoreConfig`] carries the table prefix plus the connection options that
//! are handed to the store connector untouched. Keys use the same spelling
//! as the store SDK (`accessKeyId`, `maxRetries`, ...); unrecognized keys are
//! ignored and absent keys stay `None` so the connector's defaults apply.
//!
//! ```toml
//! db_prefix = "staging_"
//! region = "us-west-2"
//! endpoint = "http://localhost:8000"
//! maxRetries = 3
//!
//! [httpOptions]
//! connectTimeout = 1000
//! ```

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Table prefix used when none is configured.
pub const DEFAULT_DB_PREFIX: &str = "whimbrel_";

/// Configuration consumed by the record access layer and store client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Prepended to every logical table name
    pub db_prefix: String,
    /// Pass-through connection options
    #[serde(flatten)]
    pub connection: ConnectionOptions,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_prefix: DEFAULT_DB_PREFIX.to_string(),
            connection: ConnectionOptions::default(),
        }
    }
}

impl StoreConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the table prefix. An empty prefix is allowed.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.db_prefix = prefix.into();
        self
    }

    /// Replace the connection options.
    pub fn with_connection(mut self, connection: ConnectionOptions) -> Self {
        self.connection = connection;
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> StoreResult<Self> {
        toml::from_str(source).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Parse a JSON document.
    pub fn from_json_str(source: &str) -> StoreResult<Self> {
        serde_json::from_str(source).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Load a TOML or JSON file, chosen by extension (`.json` is JSON,
    /// anything else is TOML).
    pub fn from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }
}

/// Static credentials supplied inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCredentials {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Optional session token
    #[serde(default)]
    pub session_token: Option<String>,
}

/// HTTP-level options for the store client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpOptions {
    /// Proxy URL
    pub proxy: Option<String>,
    /// Connect timeout in milliseconds
    pub connect_timeout: Option<u64>,
    /// Socket timeout in milliseconds
    pub timeout: Option<u64>,
}

/// Options passed unchanged to the store connector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionOptions {
    /// Access key id
    pub access_key_id: Option<String>,
    /// Secret access key
    pub secret_access_key: Option<String>,
    /// Session token
    pub session_token: Option<String>,
    /// Inline credentials object
    pub credentials: Option<StaticCredentials>,
    /// Name of a credential provider chain
    pub credential_provider: Option<String>,
    /// Retry count for the client's own retry policy
    pub max_retries: Option<u32>,
    /// Maximum redirects to follow
    pub max_redirects: Option<u32>,
    /// HTTP options
    pub http_options: Option<HttpOptions>,
    /// Endpoint URL override
    pub endpoint: Option<String>,
    /// Whether to use TLS
    pub ssl_enabled: Option<bool>,
    /// Region name
    pub region: Option<String>,
}

impl ConnectionOptions {
    /// Names (in SDK spelling) of the options that are set.
    pub fn present_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        let flags = [
            ("accessKeyId", self.access_key_id.is_some()),
            ("secretAccessKey", self.secret_access_key.is_some()),
            ("sessionToken", self.session_token.is_some()),
            ("credentials", self.credentials.is_some()),
            ("credentialProvider", self.credential_provider.is_some()),
            ("maxRetries", self.max_retries.is_some()),
            ("maxRedirects", self.max_redirects.is_some()),
            ("httpOptions", self.http_options.is_some()),
            ("endpoint", self.endpoint.is_some()),
            ("sslEnabled", self.ssl_enabled.is_some()),
            ("region", self.region.is_some()),
        ];
        for (name, set) in flags {
            if set {
                keys.push(name);
            }
        }
        keys
    }

    /// Check if no option is set.
    pub fn is_empty(&self) -> bool {
        self.present_keys().is_empty()
    }
}
