//! Persistence tests for the credential store and the history CSV

use agrisense::{
    auth::{bootstrap_admin, CredentialStore, SledCredentialStore},
    data::{date_bounds, export_with_recommendations, filter_by_date, load_history, DateRange},
    thresholds, AppError,
};
use chrono::NaiveDate;
use tempfile::TempDir;

mod common;

#[test]
fn test_sled_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("users.db");

    {
        let store = SledCredentialStore::open(&db_path, 10).unwrap();
        assert!(bootstrap_admin(&store, "admin", Some("first")).unwrap());
        store.add_user("grower", "basil").unwrap();
        store.flush().unwrap();
    }

    let store = SledCredentialStore::open(&db_path, 10).unwrap();
    assert_eq!(store.user_count().unwrap(), 2);
    assert!(store.check_login("admin", "first").unwrap());
    assert!(store.check_login("grower", "basil").unwrap());
    assert!(!store.check_login("grower", "BASIL").unwrap());
    assert!(!bootstrap_admin(&store, "admin", Some("second")).unwrap());
    assert!(!store.check_login("admin", "second").unwrap());
}

#[test]
fn test_sled_store_keeps_no_plaintext() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("users.db");
    let store = SledCredentialStore::open(&db_path, 10).unwrap();
    store.add_user("admin", "hunter2-plaintext").unwrap();
    store.flush().unwrap();
    drop(store);

    let db = sled::open(&db_path).unwrap();
    let users = db.open_tree("users").unwrap();
    for entry in users.iter() {
        let (_, value) = entry.unwrap();
        let raw = String::from_utf8_lossy(&value);
        assert!(!raw.contains("hunter2-plaintext"));
    }
}

#[test]
fn test_history_round_trip_through_export() {
    let dir = TempDir::new().unwrap();
    let readings = common::reading_grid();
    let history = common::write_history_csv(dir.path(), &readings, None);

    let records = load_history(&history).unwrap();
    assert_eq!(records.len(), readings.len());
    assert_eq!(records[3].reading, readings[3]);
    assert!(records.iter().all(|r| r.label.is_none()));

    let predictions: Vec<String> = records
        .iter()
        .map(|r| thresholds::recommendations(&r.reading))
        .collect();
    let output = dir.path().join("out").join("predictions.csv");
    export_with_recommendations(&records, &predictions, &output).unwrap();

    let exported = load_history(&output).unwrap();
    assert_eq!(exported.len(), records.len());
    for (original, written) in records.iter().zip(&exported) {
        assert_eq!(original.date, written.date);
        assert_eq!(
            written.label.as_deref(),
            Some(thresholds::recommendations(&original.reading).as_str())
        );
    }
}

#[test]
fn test_history_date_window() {
    let dir = TempDir::new().unwrap();
    let readings = common::reading_grid();
    let history = common::write_history_csv(dir.path(), &readings, None);
    let records = load_history(&history).unwrap();

    let bounds = date_bounds(&records).unwrap();
    assert_eq!(bounds.start(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(filter_by_date(&records, &bounds).len(), records.len());

    let week = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
    )
    .unwrap();
    let filtered = filter_by_date(&records, &week);
    assert_eq!(filtered.len(), 7);
    assert_eq!(filtered[0].reading, readings[7]);
}

#[test]
fn test_history_missing_columns_named() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.csv");
    std::fs::write(&path, "Date,Temperature (°C),pH\n2024-01-01,20,6.2\n").unwrap();

    match load_history(&path) {
        Err(AppError::MissingField { fields }) => {
            assert_eq!(fields, vec!["Humidity (%)", "Nutrients (g/L)"]);
        }
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn test_history_missing_file_is_io() {
    let dir = TempDir::new().unwrap();
    let err = load_history(dir.path().join("absent.csv")).unwrap_err();
    assert!(err.is_io());
}
