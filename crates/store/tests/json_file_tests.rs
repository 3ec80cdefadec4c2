use aprwatch_core::common::time::{FakeClockProvider, TimeProvider};
use aprwatch_core::store::error::StoreError;
use aprwatch_core::store::port::StateStore;
use aprwatch_store::json_file::JsonFileStateStore;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;

fn fixed_clock() -> Arc<FakeClockProvider> {
    Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ))
}

#[tokio::test]
async fn test_missing_file_is_first_run() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let store = JsonFileStateStore::new(tmp_dir.path().join("last_apr.json"), fixed_clock());

    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_then_load() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    let clock = fixed_clock();
    let store = JsonFileStateStore::new(tmp_dir.path().join("last_apr.json"), clock.clone());

    let saved = store.save(dec!(4.52)).await?;
    assert_eq!(saved.value, dec!(4.52));
    assert_eq!(saved.observed_at, Some(clock.now()));

    let loaded = store.load().await?.expect("state should exist after save");
    assert_eq!(loaded, saved);
    Ok(())
}

#[tokio::test]
async fn test_save_overwrites_previous_record() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    let path = tmp_dir.path().join("last_apr.json");
    let clock = fixed_clock();
    let store = JsonFileStateStore::new(&path, clock.clone());

    store.save(dec!(4.50)).await?;
    let later = Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap();
    clock.set_time(later);
    store.save(dec!(4.61)).await?;

    let loaded = store.load().await?.expect("state should exist");
    assert_eq!(loaded.value, dec!(4.61));
    assert_eq!(loaded.observed_at, Some(later));

    // 只有目标文件，没有遗留的临时文件
    let entries: Vec<_> = std::fs::read_dir(tmp_dir.path())?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_file_format_on_disk() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    let path = tmp_dir.path().join("last_apr.json");
    let store = JsonFileStateStore::new(&path, fixed_clock());

    store.save(dec!(4.51)).await?;

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(raw["apr"], serde_json::json!(4.51));
    assert_eq!(raw["timestamp"], "2024-05-01T12:00:00.000000Z");
    Ok(())
}

#[tokio::test]
async fn test_creates_missing_parent_directories() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    let path = tmp_dir.path().join("state").join("nested").join("last_apr.json");
    let store = JsonFileStateStore::new(&path, fixed_clock());

    store.save(dec!(1.25)).await?;
    assert!(path.exists());
    Ok(())
}

#[tokio::test]
async fn test_loads_naive_timestamp_written_by_older_runs() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    let path = tmp_dir.path().join("last_apr.json");
    std::fs::write(
        &path,
        r#"{
  "apr": 4.5,
  "timestamp": "2024-04-30T08:15:00.250000"
}"#,
    )?;
    let store = JsonFileStateStore::new(&path, fixed_clock());

    let loaded = store.load().await?.expect("state should load");
    assert_eq!(loaded.value, dec!(4.5));
    let expected = Utc.with_ymd_and_hms(2024, 4, 30, 8, 15, 0).unwrap()
        + chrono::Duration::milliseconds(250);
    assert_eq!(loaded.observed_at, Some(expected));
    Ok(())
}

#[tokio::test]
async fn test_unknown_timestamp_keeps_value() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    let path = tmp_dir.path().join("last_apr.json");
    std::fs::write(&path, r#"{"apr": 3.3, "timestamp": "last tuesday"}"#)?;
    let store = JsonFileStateStore::new(&path, fixed_clock());

    let loaded = store.load().await?.expect("state should load");
    assert_eq!(loaded.value, dec!(3.3));
    assert!(loaded.observed_at.is_none());
    Ok(())
}

#[tokio::test]
async fn test_record_without_apr_is_no_state() -> anyhow::Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    let path = tmp_dir.path().join("last_apr.json");
    std::fs::write(&path, r#"{"timestamp": "2024-04-30T08:15:00"}"#)?;
    let store = JsonFileStateStore::new(&path, fixed_clock());

    assert!(store.load().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_file_is_an_error() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("last_apr.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = JsonFileStateStore::new(&path, fixed_clock());

    let result = store.load().await;
    assert!(matches!(result, Err(StoreError::Deserialize(_))), "{:?}", result);
}

#[tokio::test]
async fn test_directory_in_place_of_file_is_io_error() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("last_apr.json");
    std::fs::create_dir(&path).unwrap();
    let store = JsonFileStateStore::new(&path, fixed_clock());

    assert!(matches!(store.load().await, Err(StoreError::Io(_))));
    assert!(matches!(store.save(dec!(1)).await, Err(StoreError::Io(_))));
}
