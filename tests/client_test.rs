//! Integration tests for the DatabaseClient over an in-memory source.

mod common;

use common::{MINI, mini_database, tiny_database, uncharged_elements_database};
use tempfile::TempDir;
use thermohub_client::db::MemorySource;
use thermohub_client::{ClientOptions, DatabaseClient, DatabaseStore, HubError};

fn options(dir: &TempDir) -> ClientOptions {
    ClientOptions {
        output_dir: dir.path().join("databases"),
        ..ClientOptions::default()
    }
}

fn source() -> MemorySource {
    MemorySource::new()
        .with_dataset(MINI, mini_database())
        .with_dataset("cemdata18", tiny_database("cemdata18"))
        .with_dataset("alox", uncharged_elements_database("alox"))
}

fn client(dir: &TempDir) -> DatabaseClient<MemorySource> {
    DatabaseClient::with_source(source(), options(dir))
}

#[tokio::test]
async fn test_elements_and_substances_keep_quotes() {
    let dir = TempDir::new().unwrap();
    let client = client(&dir);

    let elements = client.elements_in_thermo_dataset(MINI).await.unwrap();
    assert_eq!(elements.len(), 8);
    assert_eq!(elements[4], "\"Mg\"");

    let substances = client.substances_in_thermo_dataset(MINI).await.unwrap();
    assert_eq!(substances.len(), 11);
    assert_eq!(substances[10], "\"Zoisite\"");
    assert_eq!(substances[0], "\"Al+3\"");
}

#[tokio::test]
async fn test_classes_and_states_distinct_in_first_seen_order() {
    let dir = TempDir::new().unwrap();
    let client = client(&dir);

    let classes = client
        .substance_classes_in_thermo_dataset(MINI)
        .await
        .unwrap();
    assert_eq!(
        classes,
        vec![
            r#"{"2":"SC_AQSOLUTE"}"#,
            r#"{"1":"SC_GASFLUID"}"#,
            r#"{"0":"SC_COMPONENT"}"#,
            r#"{"3":"SC_AQSOLVENT"}"#,
        ]
    );

    let states = client
        .substance_aggregate_states_in_thermo_dataset(MINI)
        .await
        .unwrap();
    assert_eq!(
        states,
        vec![
            r#"{"4":"AS_AQUEOUS"}"#,
            r#"{"0":"AS_GAS"}"#,
            r#"{"3":"AS_CRYSTAL"}"#,
        ]
    );
}

#[tokio::test]
async fn test_results_stable_across_calls_and_clients() {
    let dir = TempDir::new().unwrap();
    let first = client(&dir);
    let second = client(&dir);

    let a = first.substances_in_thermo_dataset(MINI).await.unwrap();
    let b = first.substances_in_thermo_dataset(MINI).await.unwrap();
    let c = second.substances_in_thermo_dataset(MINI).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(
        first.substance_classes_in_thermo_dataset(MINI).await.unwrap(),
        second.substance_classes_in_thermo_dataset(MINI).await.unwrap()
    );
}

#[tokio::test]
async fn test_unknown_dataset_leaves_client_usable() {
    let dir = TempDir::new().unwrap();
    let client = client(&dir);

    let err = client.elements_in_thermo_dataset("aq99").await.unwrap_err();
    assert!(matches!(err, HubError::DatasetNotFound { ref dataset } if dataset == "aq99"));
    assert!(err.suggestion().is_some());

    let err = client.save_database("aq99").await.unwrap_err();
    assert!(matches!(err, HubError::DatasetNotFound { .. }));
    assert!(!dir.path().join("databases").join("aq99.json").exists());

    assert_eq!(client.elements_in_thermo_dataset(MINI).await.unwrap().len(), 8);
}

#[tokio::test]
async fn test_dataset_symbols_sorted() {
    let dir = TempDir::new().unwrap();
    assert_eq!(
        client(&dir).thermo_dataset_symbols().await.unwrap(),
        vec!["alox", "cemdata18", MINI]
    );
}

#[tokio::test]
async fn test_save_database_and_reload() {
    let dir = TempDir::new().unwrap();
    let client = client(&dir);

    let saved = client.save_database(MINI).await.unwrap();
    assert_eq!(saved.path, dir.path().join("databases").join("mini17.json"));
    assert_eq!(saved.elements, 8);
    assert_eq!(saved.substances, 11);
    assert_eq!(saved.reactions, 3);

    let reloaded = DatabaseStore::load_from(&saved.path).await.unwrap();
    assert_eq!(reloaded, client.database(MINI).await.unwrap());

    let text = std::fs::read_to_string(&saved.path).unwrap();
    assert!(!text.contains("null"));
    assert!(text.contains("\n  \"thermodataset\""));
}

#[tokio::test]
async fn test_save_database_to_explicit_path() {
    let dir = TempDir::new().unwrap();
    let client = client(&dir);
    let path = dir.path().join("nested").join("dir").join("aq.json");

    let saved = client.save_database_to(MINI, &path).await.unwrap();
    assert_eq!(saved.path, path);
    assert!(path.exists());
}

#[tokio::test]
async fn test_save_subset_with_charge() {
    let dir = TempDir::new().unwrap();
    let client = client(&dir);

    let saved = client
        .save_database_subset(MINI, &["Al", "Si", "O", "Zz"])
        .await
        .unwrap();
    assert_eq!(
        saved.path,
        dir.path().join("databases").join("mini17-Al-O-Si-Zz.json")
    );

    let subset = DatabaseStore::load_from(&saved.path).await.unwrap();
    assert_eq!(
        subset.element_symbols(),
        vec!["\"Al\"", "\"O\"", "\"Si\"", "\"Zz\""]
    );
    assert_eq!(
        subset.substance_symbols(),
        vec!["\"Al+3\"", "\"Corundum\"", "\"Kyanite\"", "\"Quartz\""]
    );
    assert_eq!(subset.reactions.len(), 1);
    assert_eq!(subset.dataset_symbol(), Some(MINI));
}

#[tokio::test]
async fn test_save_subset_ignores_unknown_symbols() {
    let dir = TempDir::new().unwrap();
    let client = client(&dir);

    let saved = client
        .save_database_subset(MINI, &["O", "Xx", "Al"])
        .await
        .unwrap();
    assert_eq!(
        saved.path,
        dir.path().join("databases").join("mini17-Al-O.json")
    );
    assert_eq!(saved.substances, 1);
    assert_eq!(saved.reactions, 0);
}

#[tokio::test]
async fn test_save_subset_to_explicit_path() {
    let dir = TempDir::new().unwrap();
    let client = client(&dir);
    let path = dir.path().join("subset.json");

    let saved = client
        .save_database_subset_to(MINI, &["Ca", "C", "O", "H", "Zz"], &path)
        .await
        .unwrap();
    assert_eq!(saved.path, path);

    let subset = DatabaseStore::load_from(&path).await.unwrap();
    assert_eq!(
        subset.substance_symbols(),
        vec!["\"CO2\"", "\"Ca+2\"", "\"Calcite\"", "\"H2O@\"", "\"OH-\""]
    );
    assert_eq!(subset.reactions.len(), 1);
}

#[tokio::test]
async fn test_save_into_unwritable_location() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();

    let client = DatabaseClient::with_source(
        source(),
        ClientOptions {
            output_dir: blocker,
            ..ClientOptions::default()
        },
    );
    let err = client.save_database(MINI).await.unwrap_err();
    assert!(matches!(err, HubError::Persistence { .. }));
}

#[tokio::test]
async fn test_saved_store_serves_a_new_client() {
    let dir = TempDir::new().unwrap();
    let online = client(&dir);
    online.save_database(MINI).await.unwrap();
    online.save_database("cemdata18").await.unwrap();

    let offline_source = MemorySource::from_store(online.store()).await.unwrap();
    assert_eq!(offline_source.len(), 2);
    let offline = DatabaseClient::with_source(offline_source, options(&dir));

    assert_eq!(
        offline.elements_in_thermo_dataset(MINI).await.unwrap(),
        online.elements_in_thermo_dataset(MINI).await.unwrap()
    );
}

#[tokio::test]
async fn test_database_json_is_pretty() {
    let dir = TempDir::new().unwrap();
    let text = client(&dir).database_json(MINI).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["elements"].as_array().unwrap().len(), 8);
    assert!(text.starts_with("{\n  \""));
}

#[tokio::test]
async fn test_unknown_dataset_with_unsafe_file_name() {
    let dir = TempDir::new().unwrap();
    let client = client(&dir);

    for key in ["aq/17", ".x", "../aq17"] {
        let err = client.save_database(key).await.unwrap_err();
        assert!(
            matches!(err, HubError::DatasetNotFound { ref dataset } if dataset == key),
            "{} gave {:?}",
            key,
            err
        );
    }
}

#[tokio::test]
async fn test_concurrent_clients_save_same_dataset() {
    let dir = TempDir::new().unwrap();
    let first = client(&dir);
    let second = client(&dir);

    for _ in 0..50 {
        let (a, b) = tokio::join!(first.save_database(MINI), second.save_database(MINI));
        a.unwrap();
        b.unwrap();
    }

    let saved = DatabaseStore::load_from(&dir.path().join("databases").join("mini17.json"))
        .await
        .unwrap();
    assert_eq!(saved, mini_database());
    assert_eq!(first.store().list().await.unwrap(), vec![MINI]);
}

#[tokio::test]
async fn test_charge_requested_on_dataset_without_zz_element() {
    let dir = TempDir::new().unwrap();
    let client = client(&dir);

    let saved = client
        .save_database_subset("alox", &["Al", "O", "Zz"])
        .await
        .unwrap();
    assert_eq!(
        saved.path,
        dir.path().join("databases").join("alox-Al-O-Zz.json")
    );

    let subset = DatabaseStore::load_from(&saved.path).await.unwrap();
    assert_eq!(subset.element_symbols(), vec!["\"Al\"", "\"O\""]);
    assert_eq!(
        subset.substance_symbols(),
        vec!["\"Al+3\"", "\"Corundum\""]
    );

    let without_charge = client
        .save_database_subset("alox", &["Al", "O"])
        .await
        .unwrap();
    assert_eq!(without_charge.substances, 1);
}
