//! Loading server configuration from disk.

use std::io::Write;
use ttto_server::{RejectionPolicy, ServerConfig};

#[test]
fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 4100").unwrap();
    writeln!(file, r#"rejection_policy = "notify""#).unwrap();

    let config = ServerConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.port(), 4100);
    assert_eq!(*config.rejection_policy(), RejectionPolicy::Notify);
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(*config.max_rooms(), 1024);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ServerConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}

#[test]
fn test_bad_policy_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"rejection_policy = "shout""#).unwrap();
    let err = ServerConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_load_without_path_uses_defaults() {
    assert_eq!(ServerConfig::load(None).unwrap(), ServerConfig::default());
}

#[test]
fn test_env_port_beats_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 4100").unwrap();
    let config = ServerConfig::load(Some(file.path()))
        .unwrap()
        .with_port_var(Some("5200".to_string()));
    assert_eq!(*config.port(), 5200);
}
