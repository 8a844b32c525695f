//! Sources of ThermoDataSet databases.
//!
//! [`HubSource`] is the seam between the [`DatabaseClient`](crate::DatabaseClient) and
//! where the data comes from: a ThermoHub server ([`ArangoSource`]) or datasets held in
//! memory ([`MemorySource`]), e.g. loaded from previously saved files.

use crate::db::arango::ArangoConnection;
use crate::db::queries::AqlQuery;
use crate::error::{HubError, HubResult};
use crate::models::ThermoDatabase;
use crate::store::DatabaseStore;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::future::Future;
use tracing::debug;

/// Prefix of the document handles of thermodatasets.
pub const THERMO_DATASETS_COLLECTION: &str = "thermodatasets";

/// Read access to ThermoDataSet databases.
pub trait HubSource: Send + Sync {
    /// Document id of the thermodataset with the given symbol, `None` if unknown.
    fn thermo_dataset_id(
        &self,
        symbol: &str,
    ) -> impl Future<Output = HubResult<Option<String>>> + Send;

    /// The database of the thermodataset with the given document id.
    fn thermo_database(&self, id: &str) -> impl Future<Output = HubResult<ThermoDatabase>> + Send;

    /// Symbols of all thermodatasets, sorted.
    fn thermo_dataset_symbols(&self) -> impl Future<Output = HubResult<Vec<String>>> + Send;

    /// Version string of the backing server.
    fn server_version(&self) -> impl Future<Output = HubResult<String>> + Send;

    /// Get the name of this source for logging.
    fn name(&self) -> &'static str;
}

/// ThermoHub server reached through the ArangoDB HTTP API.
#[derive(Debug, Clone)]
pub struct ArangoSource {
    connection: ArangoConnection,
}

impl ArangoSource {
    pub fn new(connection: ArangoConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &ArangoConnection {
        &self.connection
    }
}

impl HubSource for ArangoSource {
    async fn thermo_dataset_id(&self, symbol: &str) -> HubResult<Option<String>> {
        let ids = self
            .connection
            .query(&AqlQuery::thermo_dataset_id(symbol))
            .await?;
        if ids.len() > 1 {
            debug!(symbol, matches = ids.len(), "Several thermodatasets share a symbol");
        }
        match ids.into_iter().next() {
            None => Ok(None),
            Some(JsonValue::String(id)) => Ok(Some(id)),
            Some(other) => Err(HubError::decode(format!(
                "Expected a document id for '{}', got {}",
                symbol, other
            ))),
        }
    }

    async fn thermo_database(&self, id: &str) -> HubResult<ThermoDatabase> {
        let documents = self
            .connection
            .query(&AqlQuery::thermo_database(id))
            .await?;
        let document = documents.into_iter().next().ok_or_else(|| {
            HubError::decode(format!("Thermodataset document '{}' returned no database", id))
        })?;
        ThermoDatabase::from_document(document)
            .map_err(|e| HubError::decode(format!("Invalid database document '{}': {}", id, e)))
    }

    async fn thermo_dataset_symbols(&self) -> HubResult<Vec<String>> {
        let symbols = self
            .connection
            .query(&AqlQuery::thermo_dataset_symbols())
            .await?;
        Ok(symbols
            .into_iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect())
    }

    async fn server_version(&self) -> HubResult<String> {
        self.connection.version().await
    }

    fn name(&self) -> &'static str {
        "arangodb"
    }
}

/// Thermodatasets held in memory, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    datasets: BTreeMap<String, ThermoDatabase>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a dataset.
    pub fn insert(&mut self, symbol: impl Into<String>, database: ThermoDatabase) {
        self.datasets.insert(symbol.into(), database);
    }

    pub fn with_dataset(mut self, symbol: impl Into<String>, database: ThermoDatabase) -> Self {
        self.insert(symbol, database);
        self
    }

    /// Load every database saved in a store; the file stem becomes the dataset symbol.
    pub async fn from_store(store: &DatabaseStore) -> HubResult<Self> {
        let mut source = Self::new();
        for stem in store.list().await? {
            let database = store.load(&stem).await?;
            source.insert(stem, database);
        }
        debug!(
            root = %store.root().display(),
            datasets = source.datasets.len(),
            "Loaded saved thermodatasets"
        );
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

impl HubSource for MemorySource {
    async fn thermo_dataset_id(&self, symbol: &str) -> HubResult<Option<String>> {
        Ok(self
            .datasets
            .contains_key(symbol)
            .then(|| format!("{}/{}", THERMO_DATASETS_COLLECTION, symbol)))
    }

    async fn thermo_database(&self, id: &str) -> HubResult<ThermoDatabase> {
        let symbol = id
            .strip_prefix(THERMO_DATASETS_COLLECTION)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(id);
        self.datasets
            .get(symbol)
            .cloned()
            .ok_or_else(|| HubError::dataset_not_found(symbol))
    }

    async fn thermo_dataset_symbols(&self) -> HubResult<Vec<String>> {
        Ok(self.datasets.keys().cloned().collect())
    }

    async fn server_version(&self) -> HubResult<String> {
        Ok(format!("memory/{}", env!("CARGO_PKG_VERSION")))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn database(symbol: &str) -> ThermoDatabase {
        ThermoDatabase {
            elements: vec![json!({ "symbol": symbol })],
            ..ThermoDatabase::default()
        }
    }

    #[tokio::test]
    async fn test_memory_source_lookup() {
        let source = MemorySource::new()
            .with_dataset("aq17", database("Mg"))
            .with_dataset("cemdata18", database("Ca"));

        let id = source.thermo_dataset_id("aq17").await.unwrap();
        assert_eq!(id.as_deref(), Some("thermodatasets/aq17"));
        assert!(source.thermo_dataset_id("nope").await.unwrap().is_none());

        let db = source.thermo_database("thermodatasets/aq17").await.unwrap();
        assert_eq!(db.element_symbols(), vec!["\"Mg\""]);
    }

    #[tokio::test]
    async fn test_memory_source_symbols_sorted() {
        let source = MemorySource::new()
            .with_dataset("psinagra", database("Na"))
            .with_dataset("aq17", database("Mg"));
        assert_eq!(
            source.thermo_dataset_symbols().await.unwrap(),
            vec!["aq17", "psinagra"]
        );
        assert_eq!(source.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_source_unknown_id() {
        let source = MemorySource::new();
        let err = source.thermo_database("thermodatasets/x").await.unwrap_err();
        assert!(matches!(err, HubError::DatasetNotFound { .. }));
    }
}
