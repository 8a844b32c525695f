//! Connection-related data models.
//!
//! This module defines the ThermoHub (ArangoDB) connection configuration, how it is
//! read from a JSON connection file, and the built-in default used when no file is given.

use crate::error::{HubError, HubResult};
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Public ThermoHub server.
pub const DEFAULT_SERVER_URL: &str = "https://db.thermohub.net";
pub const DEFAULT_DATABASE: &str = "hub_main";
pub const DEFAULT_USER: &str = "funrem";
/// Read-only account published for the public server.
pub const DEFAULT_PASSWORD: &str = "ThermoFun@Remote-ThermoHub-Server";

/// Instance section used when `UseArangoDBInstance` is absent.
pub const DEFAULT_INSTANCE: &str = "ArangoDBRemote";

/// Resolved connection parameters for one ThermoHub database.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub url: Url,
    pub database: String,
    pub user: String,
    /// Contains sensitive data - never log
    pub password: String,
}

impl ConnectionConfig {
    /// Create a new connection configuration.
    pub fn new(
        url: &str,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> HubResult<Self> {
        let url = Url::parse(url).map_err(|e| {
            HubError::configuration(
                format!("Invalid DB_URL '{}': {}", url, e),
                "Use a full URL such as https://db.thermohub.net or http://localhost:8529",
            )
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(HubError::configuration(
                format!("Unsupported DB_URL scheme: {}", url.scheme()),
                "ThermoHub is reached over http or https",
            ));
        }
        if url.cannot_be_a_base() {
            return Err(HubError::configuration(
                format!("DB_URL cannot be used as a base URL: {}", url),
                "Use a full URL such as https://db.thermohub.net",
            ));
        }

        let database = database.into();
        if database.trim().is_empty() {
            return Err(HubError::configuration(
                "DBName cannot be empty",
                "Set DBName to the ThermoHub database, usually \"hub_main\"",
            ));
        }

        Ok(Self {
            url,
            database,
            user: user.into(),
            password: password.into(),
        })
    }

    /// The public ThermoHub server with its read-only account.
    pub fn default_remote() -> HubResult<Self> {
        Self::new(
            DEFAULT_SERVER_URL,
            DEFAULT_DATABASE,
            DEFAULT_USER,
            DEFAULT_PASSWORD,
        )
    }

    /// Resolve the configuration: explicit connection file if given, otherwise the default.
    pub fn resolve(path: Option<&Path>) -> HubResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::default_remote(),
        }
    }

    /// Load the configuration from a JSON connection file.
    pub fn from_file(path: &Path) -> HubResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HubError::configuration(
                format!("Cannot read connection file {}: {}", path.display(), e),
                "Check that the connection configuration path exists and is readable",
            )
        })?;
        Self::from_json(&content).map_err(|err| match err {
            HubError::Configuration {
                message,
                suggestion,
            } => HubError::configuration(format!("{}: {}", path.display(), message), suggestion),
            other => other,
        })
    }

    /// Parse the configuration from the text of a JSON connection file.
    pub fn from_json(content: &str) -> HubResult<Self> {
        let file: ConnectionFile = serde_json::from_str(content).map_err(|e| {
            HubError::configuration(
                format!("Invalid connection JSON: {}", e),
                "The file must contain an \"arangodb\" object with an instance section",
            )
        })?;

        let arangodb = file.arangodb;
        let instance_name = arangodb
            .use_instance
            .as_deref()
            .unwrap_or(DEFAULT_INSTANCE);
        let section = arangodb.instances.get(instance_name).ok_or_else(|| {
            HubError::configuration(
                format!("Instance section '{}' is missing", instance_name),
                "Add the section or point UseArangoDBInstance at an existing one",
            )
        })?;
        let section: InstanceSection =
            serde_json::from_value(section.clone()).map_err(|e| {
                HubError::configuration(
                    format!("Invalid instance section '{}': {}", instance_name, e),
                    "Each instance needs DB_URL, DBName and DB_User",
                )
            })?;

        Self::new(
            &section.url,
            section.database,
            section.user,
            section.password.unwrap_or_default(),
        )
    }

    /// Get a display-safe version of the server address (credentials masked).
    pub fn masked_url(&self) -> String {
        let mut url = self.url.clone();
        if url.password().is_some() {
            let _ = url.set_password(Some("****"));
        }
        format!("{} (database: {}, user: {})", url, self.database, self.user)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url.as_str())
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"****")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ConnectionFile {
    arangodb: ArangoSection,
}

#[derive(Debug, Deserialize)]
struct ArangoSection {
    #[serde(rename = "UseArangoDBInstance")]
    use_instance: Option<String>,
    /// Instance sections plus any flags we ignore (UseVelocypackPut, ...).
    #[serde(flatten)]
    instances: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct InstanceSection {
    #[serde(rename = "DB_URL")]
    url: String,
    #[serde(rename = "DBName")]
    database: String,
    #[serde(rename = "DB_User")]
    user: String,
    #[serde(rename = "DB_UserPassword")]
    password: Option<String>,
}
