use gridquery::logger::{configure_from_env, configure_logging, init_path, parse_level};
use log::LevelFilter;
use std::fs;
use tempfile::tempdir;

#[test]
fn configure_logging_writes_app_compile_query_in_dir() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("grid_logs");
    configure_logging(Some(&base), Some("debug"), Some(3)).unwrap();
    log::info!("hello app");
    log::debug!(target: "gridquery::compile", "compiled");
    log::debug!(target: "gridquery::query", "executed");
    assert!(base.join("app.log").exists());
    assert!(base.join("compile.log").exists());
    assert!(base.join("query.log").exists());
}

#[test]
fn configure_logging_can_be_called_again() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    fs::create_dir_all(&first).unwrap();
    configure_logging(Some(&first), Some("trace"), None).unwrap();
    configure_logging(Some(&second), None, Some(1)).unwrap();
    assert!(second.join("app.log").exists());
}

#[test]
fn levels_parse_loosely() {
    assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
    assert_eq!(parse_level("off"), LevelFilter::Off);
    assert_eq!(parse_level("warn"), LevelFilter::Warn);
    assert_eq!(parse_level("verbose"), LevelFilter::Info);
}

#[test]
fn configure_from_env_reads_gridquery_vars() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("env_logs");
    // Only this test reads the GRIDQUERY_LOG_* variables.
    unsafe {
        std::env::set_var("GRIDQUERY_LOG_DIR", &base);
        std::env::set_var("GRIDQUERY_LOG_LEVEL", "warn");
        std::env::set_var("GRIDQUERY_LOG_RETENTION", "2");
    }
    configure_from_env().unwrap();
    assert!(base.join("app.log").exists());
    assert!(base.join("compile.log").exists());
    assert!(base.join("query.log").exists());
}

#[test]
fn init_path_rejects_missing_config_file() {
    let dir = tempdir().unwrap();
    assert!(init_path(&dir.path().join("absent.yaml")).is_err());
}
