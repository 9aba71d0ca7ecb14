#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_first_run_creates_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf").join(CONFIG_FILE);

    let created = Config::load_or_create(&path, dir.path()).unwrap();
    assert!(path.exists());
    assert_eq!(created.db_path, dir.path().join(DB_FILE));
    assert_eq!(created.log_filter, DEFAULT_LOG_FILTER);

    // Second run reads the same identity back.
    let loaded = Config::load_or_create(&path, dir.path()).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn test_missing_log_filter_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    let user = Uuid::new_v4();
    fs::write(
        &path,
        format!(r#"{{"db_path": "/tmp/ledger.db", "user_id": "{user}"}}"#),
    )
    .unwrap();

    let config = Config::load_or_create(&path, dir.path()).unwrap();
    assert_eq!(config.user_id, user);
    assert_eq!(config.db_path, PathBuf::from("/tmp/ledger.db"));
    assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
}

#[test]
fn test_corrupt_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "{not json").unwrap();
    assert!(Config::load_or_create(&path, dir.path()).is_err());
}

#[test]
fn test_overrides() {
    let base = Config::fresh(Path::new("/data"));
    let user = Uuid::new_v4();
    let user_text = user.to_string();

    let config = base
        .clone()
        .with_overrides(Some("/other/ledger.db"), Some(&user_text))
        .unwrap();
    assert_eq!(config.db_path, PathBuf::from("/other/ledger.db"));
    assert_eq!(config.user_id, user);

    let untouched = base.clone().with_overrides(None, Some("  ")).unwrap();
    assert_eq!(untouched, base);

    assert!(base.with_overrides(None, Some("not-a-uuid")).is_err());
}
