//! ArangoDB HTTP connection.
//!
//! ThermoHub is an ArangoDB server; this module talks to its REST API:
//! - `POST /_db/<db>/_api/cursor` to run an AQL query
//! - `PUT /_db/<db>/_api/cursor/<id>` to fetch further batches while `hasMore` is set
//! - `GET /_db/<db>/_api/version` as a connectivity check
//!
//! Every request carries the basic-auth credentials of the [`ConnectionConfig`] and is
//! bounded by the request and connect timeouts of the [`ClientOptions`].

use crate::config::ClientOptions;
use crate::db::queries::AqlQuery;
use crate::error::{HubError, HubResult};
use crate::models::ConnectionConfig;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// ArangoDB error number for an unknown database.
const ERROR_DATABASE_NOT_FOUND: u32 = 1228;

#[derive(Debug, Serialize)]
struct CursorRequest<'a> {
    #[serde(flatten)]
    query: &'a AqlQuery,
    #[serde(rename = "batchSize")]
    batch_size: u32,
}

#[derive(Debug, Deserialize)]
struct CursorResponse {
    #[serde(default)]
    result: Vec<JsonValue>,
    #[serde(default, rename = "hasMore")]
    has_more: bool,
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

/// Error body returned by ArangoDB for failed requests.
#[derive(Debug, Default, Deserialize)]
struct ArangoErrorBody {
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
    #[serde(rename = "errorNum")]
    error_num: Option<u32>,
}

/// HTTP session with one ThermoHub database.
#[derive(Debug, Clone)]
pub struct ArangoConnection {
    http: reqwest::Client,
    config: ConnectionConfig,
    cursor_url: Url,
    version_url: Url,
    batch_size: u32,
    timeout_secs: u64,
}

impl ArangoConnection {
    /// Build the HTTP session. No request is sent until the first query.
    pub fn new(config: ConnectionConfig, options: &ClientOptions) -> HubResult<Self> {
        options.validate().map_err(|message| {
            HubError::configuration(message, "Adjust the timeout options of the client")
        })?;

        let http = reqwest::Client::builder()
            .timeout(options.timeout_duration())
            .connect_timeout(options.connect_timeout_duration())
            .user_agent(concat!("thermohub-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cursor_url = api_endpoint(&config.url, &config.database, &["cursor"])?;
        let version_url = api_endpoint(&config.url, &config.database, &["version"])?;

        debug!(server = %config.masked_url(), "Created ThermoHub connection");

        Ok(Self {
            http,
            config,
            cursor_url,
            version_url,
            batch_size: options.effective_batch_size(),
            timeout_secs: options.timeout_secs,
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Run an AQL query and collect every result document, following the cursor.
    pub async fn query(&self, query: &AqlQuery) -> HubResult<Vec<JsonValue>> {
        let start = Instant::now();
        let body = CursorRequest {
            query,
            batch_size: self.batch_size,
        };

        debug!(
            query = %query.query,
            bind_vars = query.bind_vars.len(),
            batch_size = self.batch_size,
            "Executing AQL query"
        );

        let response = self
            .http
            .post(self.cursor_url.clone())
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e, "AQL query"))?;
        let mut page: CursorResponse = self.read_response(response, "AQL query").await?;

        let mut documents = std::mem::take(&mut page.result);
        let mut batches = 1u32;

        while page.has_more {
            let Some(cursor_id) = page.id.take() else {
                return Err(HubError::decode("Cursor reports more results but has no id"));
            };
            let next_url = self.cursor_page_url(&cursor_id)?;
            let response = self
                .http
                .put(next_url)
                .basic_auth(&self.config.user, Some(&self.config.password))
                .send()
                .await
                .map_err(|e| self.transport_error(e, "AQL cursor"))?;
            page = self.read_response(response, "AQL cursor").await?;
            documents.append(&mut page.result);
            batches += 1;
        }

        debug!(
            documents = documents.len(),
            batches,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "AQL query finished"
        );

        Ok(documents)
    }

    /// ArangoDB server version; also verifies address and credentials.
    pub async fn version(&self) -> HubResult<String> {
        let response = self
            .http
            .get(self.version_url.clone())
            .basic_auth(&self.config.user, Some(&self.config.password))
            .send()
            .await
            .map_err(|e| self.transport_error(e, "version request"))?;
        let version: VersionResponse = self.read_response(response, "version request").await?;
        Ok(version.version)
    }

    fn cursor_page_url(&self, cursor_id: &str) -> HubResult<Url> {
        let mut url = self.cursor_url.clone();
        url.path_segments_mut()
            .map_err(|_| unusable_base(&self.cursor_url))?
            .push(cursor_id);
        Ok(url)
    }

    fn transport_error(&self, err: reqwest::Error, operation: &str) -> HubError {
        if err.is_timeout() {
            HubError::timeout(operation, self.timeout_secs)
        } else {
            warn!(error = %err, operation, "ThermoHub request failed");
            err.into()
        }
    }

    async fn read_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        operation: &str,
    ) -> HubResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e, operation))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| HubError::decode(format!("{} returned invalid JSON: {}", operation, e)))
    }
}

fn unusable_base(url: &Url) -> HubError {
    HubError::configuration(
        format!("DB_URL cannot be extended with API paths: {}", url),
        "Use a full URL such as https://db.thermohub.net",
    )
}

/// `<base>/_db/<database>/_api/<tail...>`, keeping any path prefix of the base URL.
fn api_endpoint(base: &Url, database: &str, tail: &[&str]) -> HubResult<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| unusable_base(base))?
        .pop_if_empty()
        .extend(["_db", database, "_api"])
        .extend(tail);
    Ok(url)
}

/// Map a non-success HTTP response to a HubError.
fn status_error(status: StatusCode, body: &str) -> HubError {
    let parsed: ArangoErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error_message
        .unwrap_or_else(|| format!("HTTP {}", status));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HubError::connection(
            format!("Authentication rejected: {}", message),
            "Check DB_User and DB_UserPassword in the connection configuration",
        ),
        StatusCode::NOT_FOUND if parsed.error_num == Some(ERROR_DATABASE_NOT_FOUND) => {
            HubError::connection(
                format!("Database not found: {}", message),
                "Check DBName in the connection configuration",
            )
        }
        s if s.is_server_error() => HubError::connection(
            format!("ThermoHub server error: {}", message),
            "Check ThermoHub server status and try again later",
        ),
        _ => HubError::query(message, parsed.error_num),
    }
}
