//! Integration tests for env parsing and env-to-profile merging.

use dashboard_config::{
    DashboardEnv, Environment, EnvParseError, LogLevel, load_app_config,
};
use dashboard_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
}

fn fixture_path(relative: &str) -> PathBuf {
    workspace_root()
        .join("crates")
        .join("config")
        .join("fixtures")
        .join(relative)
}

fn read_env_map(relative: &str) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
    let contents = fs::read_to_string(fixture_path(relative))?;
    Ok(serde_json::from_str(&contents)?)
}

#[test]
fn env_fixture_merges_into_effective_config() -> Result<(), Box<dyn Error>> {
    let env_map = read_env_map("env/dashboard-env.valid.json")?;
    let env = DashboardEnv::from_map(&env_map)?;
    assert!(env.missing_credentials().is_empty());

    let config = load_app_config(&env);
    assert_eq!(config.environment, Environment::Development);
    assert!(config.debug);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.server.host.as_ref(), "0.0.0.0");
    assert_eq!(config.server.port, 8080);

    let origins: Vec<&str> = config.cors_origins.iter().map(AsRef::as_ref).collect();
    assert_eq!(
        origins,
        vec!["http://localhost:3000", "https://dashboard.example.com"]
    );
    assert_eq!(config.get_all_table_ids().len(), 6);
    Ok(())
}

#[test]
fn env_fixture_with_client_path_uses_client_tables() -> Result<(), Box<dyn Error>> {
    let mut env_map = read_env_map("env/dashboard-env.valid.json")?;
    env_map.insert(
        "DASHBOARD_CLIENT_CONFIG".to_string(),
        fixture_path("client/client-config.valid.toml")
            .to_string_lossy()
            .to_string(),
    );
    let env = DashboardEnv::from_map(&env_map)?;

    let config = load_app_config(&env);
    assert_eq!(
        config.get_all_table_ids(),
        vec!["tblNorthShorePos1", "tblNorthShorePerf"]
    );
    Ok(())
}

#[test]
fn invalid_env_fixture_is_rejected() -> Result<(), Box<dyn Error>> {
    let env_map = read_env_map("env/dashboard-env.invalid.json")?;
    let error = DashboardEnv::from_map(&env_map).err();
    assert!(matches!(error, Some(EnvParseError::InvalidInt { .. })));

    let envelope: ErrorEnvelope = error
        .ok_or_else(|| std::io::Error::other("expected invalid env error"))?
        .into();
    assert_eq!(envelope.code, ErrorCode::new("config", "invalid_env_int"));
    assert_eq!(
        envelope.metadata.get("env_var").map(String::as_str),
        Some("PORT")
    );
    Ok(())
}
