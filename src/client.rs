//! ThermoHub database client.
//!
//! [`DatabaseClient`] resolves a ThermoDataSet symbol (e.g. `aq17`) to its database on
//! the configured [`HubSource`], exposes read accessors over it, and saves it (or an
//! element subset of it) as a local JSON file.

use crate::config::ClientOptions;
use crate::db::{ArangoConnection, ArangoSource, HubSource};
use crate::error::{HubError, HubResult};
use crate::models::{ConnectionConfig, ThermoDatabase};
use crate::store::{DatabaseStore, SavedDatabase};
use crate::subset::{ElementFilter, filter_database};
use std::path::Path;
use tracing::{debug, info};

/// Client for the ThermoDataSets of one ThermoHub database.
///
/// Every call fetches from the source; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct DatabaseClient<S: HubSource = ArangoSource> {
    source: S,
    store: DatabaseStore,
}

impl DatabaseClient<ArangoSource> {
    /// Client for the public ThermoHub server.
    pub fn new() -> HubResult<Self> {
        Self::with_config(ConnectionConfig::resolve(None)?, ClientOptions::default())
    }

    /// Client for the server described by a JSON connection file.
    pub fn from_config_file(path: impl AsRef<Path>) -> HubResult<Self> {
        Self::with_config(
            ConnectionConfig::resolve(Some(path.as_ref()))?,
            ClientOptions::default(),
        )
    }

    /// Client for an explicit connection. The server is not contacted here.
    pub fn with_config(config: ConnectionConfig, options: ClientOptions) -> HubResult<Self> {
        let connection = ArangoConnection::new(config, &options)?;
        Ok(Self::with_source(ArangoSource::new(connection), options))
    }

    pub fn connection_config(&self) -> &ConnectionConfig {
        self.source.connection().config()
    }
}

impl<S: HubSource> DatabaseClient<S> {
    pub fn with_source(source: S, options: ClientOptions) -> Self {
        Self {
            source,
            store: DatabaseStore::new(options.output_dir),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Store that `save_database` and `save_database_subset` write into.
    pub fn store(&self) -> &DatabaseStore {
        &self.store
    }

    /// The whole database of a ThermoDataSet.
    pub async fn database(&self, dataset: &str) -> HubResult<ThermoDatabase> {
        let id = self
            .source
            .thermo_dataset_id(dataset)
            .await?
            .ok_or_else(|| HubError::dataset_not_found(dataset))?;

        debug!(dataset = %dataset, id = %id, source = self.source.name(), "Fetching database");
        let database = self.source.thermo_database(&id).await?;
        debug!(
            dataset = %dataset,
            elements = database.elements.len(),
            substances = database.substances.len(),
            reactions = database.reactions.len(),
            "Fetched database"
        );
        Ok(database)
    }

    /// The database of a ThermoDataSet as pretty-printed JSON.
    pub async fn database_json(&self, dataset: &str) -> HubResult<String> {
        let database = self.database(dataset).await?;
        serde_json::to_string_pretty(&database)
            .map_err(|e| HubError::decode(format!("Cannot serialize database: {}", e)))
    }

    /// Element symbols of a ThermoDataSet, e.g. `"Mg"` with its quotes.
    pub async fn elements_in_thermo_dataset(&self, dataset: &str) -> HubResult<Vec<String>> {
        Ok(self.database(dataset).await?.element_symbols())
    }

    /// Substance symbols of a ThermoDataSet, e.g. `"Zoisite"` with its quotes.
    pub async fn substances_in_thermo_dataset(&self, dataset: &str) -> HubResult<Vec<String>> {
        Ok(self.database(dataset).await?.substance_symbols())
    }

    pub async fn substance_classes_in_thermo_dataset(
        &self,
        dataset: &str,
    ) -> HubResult<Vec<String>> {
        Ok(self.database(dataset).await?.substance_classes())
    }

    pub async fn substance_aggregate_states_in_thermo_dataset(
        &self,
        dataset: &str,
    ) -> HubResult<Vec<String>> {
        Ok(self.database(dataset).await?.substance_aggregate_states())
    }

    /// Symbols of every ThermoDataSet on the source, sorted.
    pub async fn thermo_dataset_symbols(&self) -> HubResult<Vec<String>> {
        self.source.thermo_dataset_symbols().await
    }

    pub async fn server_version(&self) -> HubResult<String> {
        self.source.server_version().await
    }

    /// Save a ThermoDataSet to `<output_dir>/<dataset>.json`.
    pub async fn save_database(&self, dataset: &str) -> HubResult<SavedDatabase> {
        let database = self.database(dataset).await?;
        let path = self.store.path_for(dataset)?;
        self.write_database(dataset, &database, &path).await
    }

    /// Save a ThermoDataSet to an explicit file.
    pub async fn save_database_to(&self, dataset: &str, path: &Path) -> HubResult<SavedDatabase> {
        let database = self.database(dataset).await?;
        self.write_database(dataset, &database, path).await
    }

    async fn write_database(
        &self,
        dataset: &str,
        database: &ThermoDatabase,
        path: &Path,
    ) -> HubResult<SavedDatabase> {
        let saved = DatabaseStore::save_to(path, database).await?;
        info!(dataset = %dataset, path = %saved.path.display(), "Saved ThermoDataSet");
        Ok(saved)
    }

    /// Save the part of a ThermoDataSet made of the given elements to
    /// `<output_dir>/<dataset>-<El1>-<El2>...json`.
    ///
    /// Symbols that are not elements of the dataset are ignored; `Zz` keeps charged species.
    pub async fn save_database_subset<E: AsRef<str>>(
        &self,
        dataset: &str,
        elements: &[E],
    ) -> HubResult<SavedDatabase> {
        let database = self.database(dataset).await?;
        let filter = ElementFilter::new(&database, elements);
        let path = self.store.path_for(&filter.file_stem(dataset))?;
        self.write_subset(dataset, &database, &filter, &path).await
    }

    /// Save an element subset of a ThermoDataSet to an explicit file.
    pub async fn save_database_subset_to<E: AsRef<str>>(
        &self,
        dataset: &str,
        elements: &[E],
        path: &Path,
    ) -> HubResult<SavedDatabase> {
        let database = self.database(dataset).await?;
        let filter = ElementFilter::new(&database, elements);
        self.write_subset(dataset, &database, &filter, path).await
    }

    async fn write_subset(
        &self,
        dataset: &str,
        database: &ThermoDatabase,
        filter: &ElementFilter,
        path: &Path,
    ) -> HubResult<SavedDatabase> {
        let subset = filter_database(database, filter);
        let saved = DatabaseStore::save_to(path, &subset).await?;
        info!(
            dataset = %dataset,
            elements = ?filter.symbols(),
            ignored = filter.dropped().len(),
            path = %saved.path.display(),
            "Saved ThermoDataSet subset"
        );
        Ok(saved)
    }
}
