//! Local storage of ThermoDataSet databases.
//!
//! Databases are written as pretty-printed JSON files (`<root>/<name>.json`), the format
//! ThermoFun loads. Writes go to a temporary sibling file first and are renamed into
//! place, so a failed save never leaves a truncated database behind.

use crate::error::{HubError, HubResult};
use crate::models::ThermoDatabase;
use chrono::{DateTime, Utc};
use humansize::{DECIMAL, format_size};
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DATABASE_EXTENSION: &str = "json";

/// Report of a successful save.
#[derive(Debug, Clone, Serialize)]
pub struct SavedDatabase {
    pub path: PathBuf,
    pub bytes: u64,
    pub elements: usize,
    pub substances: usize,
    pub reactions: usize,
    pub saved_at: DateTime<Utc>,
}

impl SavedDatabase {
    /// Size of the written file, e.g. "12.3 kB".
    pub fn human_size(&self) -> String {
        format_size(self.bytes, DECIMAL)
    }
}

/// Directory of saved databases.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    root: PathBuf,
}

impl DatabaseStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the database saved under `name`.
    pub fn path_for(&self, name: &str) -> HubResult<PathBuf> {
        validate_name(name)?;
        Ok(self
            .root
            .join(format!("{}.{}", name, DATABASE_EXTENSION)))
    }

    /// Save a database under `name` in the store.
    pub async fn save(&self, name: &str, database: &ThermoDatabase) -> HubResult<SavedDatabase> {
        let path = self.path_for(name)?;
        Self::save_to(&path, database).await
    }

    /// Save a database to an explicit file path.
    pub async fn save_to(path: &Path, database: &ThermoDatabase) -> HubResult<SavedDatabase> {
        let json = serde_json::to_vec_pretty(database)
            .map_err(|e| HubError::persistence(format!("Cannot serialize database: {}", e), path_str(path)))?;

        let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| io_error("Cannot create directory", &parent, e))?;

        let bytes = json.len() as u64;
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || write_atomically(&parent, &target, &json))
            .await
            .map_err(|e| HubError::persistence(format!("Save task failed: {}", e), path_str(path)))??;

        let saved = SavedDatabase {
            path: path.to_path_buf(),
            bytes,
            elements: database.elements.len(),
            substances: database.substances.len(),
            reactions: database.reactions.len(),
            saved_at: Utc::now(),
        };

        info!(
            path = %saved.path.display(),
            size = %saved.human_size(),
            elements = saved.elements,
            substances = saved.substances,
            reactions = saved.reactions,
            "Saved database"
        );

        Ok(saved)
    }

    /// Load the database saved under `name`.
    pub async fn load(&self, name: &str) -> HubResult<ThermoDatabase> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => parse_database(&bytes, &path),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(HubError::dataset_not_found(name)),
            Err(e) => Err(io_error("Cannot read database", &path, e)),
        }
    }

    /// Load a database from an explicit file path.
    pub async fn load_from(path: &Path) -> HubResult<ThermoDatabase> {
        match tokio::fs::read(path).await {
            Ok(bytes) => parse_database(&bytes, path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(HubError::dataset_not_found(path_str(path)))
            }
            Err(e) => Err(io_error("Cannot read database", path, e)),
        }
    }

    /// Names of the saved databases, sorted. A missing root directory is an empty store.
    pub async fn list(&self) -> HubResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("Cannot list databases", &self.root, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("Cannot list databases", &self.root, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DATABASE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        debug!(root = %self.root.display(), count = names.len(), "Listed saved databases");
        Ok(names)
    }
}

/// Write to a fresh temporary file next to `path`, then rename it into place.
fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> HubResult<()> {
    let mut file = tempfile::Builder::new()
        .prefix(".thermohub-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| io_error("Cannot create temporary file", dir, e))?;
    file.write_all(bytes)
        .map_err(|e| io_error("Cannot write database", file.path(), e))?;
    file.persist(path)
        .map_err(|e| io_error("Cannot move database into place", path, e.error))?;
    Ok(())
}

fn parse_database(bytes: &[u8], path: &Path) -> HubResult<ThermoDatabase> {
    serde_json::from_slice(bytes).map_err(|e| {
        HubError::persistence(format!("Invalid database file: {}", e), path_str(path))
    })
}

/// Names become file names, so they must stay inside the store directory.
fn validate_name(name: &str) -> HubResult<()> {
    if name.is_empty() {
        return Err(HubError::invalid_input("Database name cannot be empty"));
    }
    if name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return Err(HubError::invalid_input(format!(
            "Database name '{}' cannot be used as a file name",
            name
        )));
    }
    Ok(())
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> HubError {
    HubError::persistence(format!("{}: {}", action, err), path_str(path))
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> ThermoDatabase {
        ThermoDatabase {
            thermodataset: json!({ "symbol": "aq17" })
                .as_object()
                .cloned()
                .unwrap_or_default(),
            elements: vec![json!({ "symbol": "O" }), json!({ "symbol": "Si" })],
            substances: vec![json!({ "symbol": "Quartz", "formula": "SiO2" })],
            reactions: vec![],
        }
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = DatabaseStore::new(dir.path().join("databases"));

        let saved = store.save("aq17", &sample()).await.unwrap();
        assert_eq!(saved.path, dir.path().join("databases").join("aq17.json"));
        assert_eq!(saved.elements, 2);
        assert_eq!(saved.substances, 1);
        assert!(saved.bytes > 0);
        assert!(!saved.human_size().is_empty());

        let loaded = store.load("aq17").await.unwrap();
        assert_eq!(loaded, sample());
    }

    #[tokio::test]
    async fn test_saved_file_is_pretty_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        DatabaseStore::save_to(&path, &sample()).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"elements\""));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("out.json")]);
    }

    #[tokio::test]
    async fn test_concurrent_saves_of_one_name() {
        let dir = TempDir::new().unwrap();
        let store = DatabaseStore::new(dir.path());

        for _ in 0..50 {
            let (da, db, dc) = (sample(), sample(), sample());
            let (a, b, c) = tokio::join!(
                store.save("aq17", &da),
                store.save("aq17", &db),
                store.save("aq17", &dc)
            );
            a.unwrap();
            b.unwrap();
            c.unwrap();
        }

        assert_eq!(store.load("aq17").await.unwrap(), sample());
        assert_eq!(store.list().await.unwrap(), vec!["aq17"]);
    }

    #[tokio::test]
    async fn test_list_sorted_json_only() {
        let dir = TempDir::new().unwrap();
        let store = DatabaseStore::new(dir.path());
        store.save("cemdata18", &sample()).await.unwrap();
        store.save("aq17", &sample()).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["aq17", "cemdata18"]);
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = DatabaseStore::new(dir.path().join("missing"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = DatabaseStore::new(dir.path());
        let err = store.load("aq17").await.unwrap_err();
        assert!(matches!(err, HubError::DatasetNotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        let store = DatabaseStore::new(dir.path());
        let err = store.load("broken").await.unwrap_err();
        assert!(matches!(err, HubError::Persistence { .. }));
    }

    #[tokio::test]
    async fn test_save_into_file_parent_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = DatabaseStore::save_to(&blocker.join("aq17.json"), &sample())
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::Persistence { .. }));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let store = DatabaseStore::new("/tmp");
        assert!(store.path_for("").is_err());
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("a/b").is_err());
        assert!(store.path_for(".hidden").is_err());
        assert!(store.path_for("aq17-Al-O-Si").is_ok());
    }
}
