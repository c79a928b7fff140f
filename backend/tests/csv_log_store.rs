use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use cartwatch::store::{CsvLogStore, LogStore};
use engine::LogRow;

fn at(h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, 11)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn row(h: u32, cart: u64, ordered: u64, new_cart: u64, new_ordered: u64) -> LogRow {
    LogRow {
        timestamp: at(h),
        total_add_to_cart: cart,
        total_ordered_units: ordered,
        new_add_to_cart: new_cart,
        new_ordered_units: new_ordered,
    }
}

#[tokio::test]
async fn missing_file_is_a_cold_start() {
    let dir = TempDir::new().unwrap();
    let store = CsvLogStore::open(dir.path().join("log.csv")).unwrap();

    assert!(store.last_row().await.unwrap().is_none());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn last_row_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");

    let store = CsvLogStore::open(&path).unwrap();
    store.append(&row(9, 100, 2, 0, 0)).await.unwrap();
    store.append(&row(10, 150, 20, 50, 18)).await.unwrap();
    assert_eq!(store.last_row().await.unwrap(), Some(row(10, 150, 20, 50, 18)));
    drop(store);

    let reopened = CsvLogStore::open(&path).unwrap();
    assert_eq!(reopened.last_row().await.unwrap(), Some(row(10, 150, 20, 50, 18)));
}

#[tokio::test]
async fn header_is_written_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");

    let store = CsvLogStore::open(&path).unwrap();
    store.append(&row(9, 100, 2, 0, 0)).await.unwrap();
    store.append(&row(10, 130, 8, 30, 6)).await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "timestamp,total_add_to_cart,total_ordered_units,new_add_to_cart,new_ordered_units\n\
         2024-11-11 09:00:00,100,2,0,0\n\
         2024-11-11 10:00:00,130,8,30,6\n"
    );
}

#[tokio::test]
async fn appends_after_a_legacy_log() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");
    fs::write(
        &path,
        "timestamp,total_add_to_cart,total_ordered_units,new_add_to_cart,new_ordered_units\n\
         2024-11-11 08:00:00,90.0,1.0,0.0,0.0\n",
    )
    .unwrap();

    let store = CsvLogStore::open(&path).unwrap();
    assert_eq!(store.last_row().await.unwrap(), Some(row(8, 90, 1, 0, 0)));

    store.append(&row(9, 100, 2, 10, 1)).await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.matches("timestamp,").count(), 1);
    assert!(content.ends_with("2024-11-11 09:00:00,100,2,10,1\n"));
}

#[tokio::test]
async fn append_after_unterminated_last_line_starts_a_new_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");
    fs::write(
        &path,
        "timestamp,total_add_to_cart,total_ordered_units,new_add_to_cart,new_ordered_units\n\
         2024-11-11 08:00:00,90,1,0,0",
    )
    .unwrap();

    let store = CsvLogStore::open(&path).unwrap();
    store.append(&row(9, 100, 2, 10, 1)).await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.ends_with("2024-11-11 08:00:00,90,1,0,0\n2024-11-11 09:00:00,100,2,10,1\n"));

    let reopened = CsvLogStore::open(&path).unwrap();
    assert_eq!(reopened.last_row().await.unwrap(), Some(row(9, 100, 2, 10, 1)));
}

#[tokio::test]
async fn corrupt_log_refuses_to_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.csv");
    fs::write(
        &path,
        "timestamp,total_add_to_cart,total_ordered_units,new_add_to_cart,new_ordered_units\n\
         yesterday,a,b,c,d\n",
    )
    .unwrap();

    let err = CsvLogStore::open(&path).err().unwrap();
    assert!(format!("{err:#}").contains("malformed data log row 1"));
}

#[tokio::test]
async fn failed_append_keeps_the_previous_last_row() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing-dir").join("log.csv");

    let store = CsvLogStore::open(&path).unwrap();
    assert!(store.append(&row(9, 100, 2, 0, 0)).await.is_err());
    assert!(store.last_row().await.unwrap().is_none());
}
