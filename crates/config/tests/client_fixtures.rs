//! Integration tests for parsing client config fixtures.

use dashboard_config::{
    ClientConfig, SourceKey, load_client_config_from_path, parse_client_config_json,
    parse_client_config_toml,
};
use dashboard_shared::ErrorCode;
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

fn read_fixture(relative: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(fixture_path(relative))?)
}

#[test]
fn json_fixture_matches_bundled_sample() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("client/client-config.valid.json")?;
    let client = parse_client_config_json(&contents)?;

    assert_eq!(client, ClientConfig::cellular_zone());
    assert_eq!(
        client.derived_fresh_tables().keys().collect::<Vec<_>>(),
        vec![SourceKey::Ghl, SourceKey::GoogleAds]
    );
    Ok(())
}

#[test]
fn toml_fixture_treats_null_strings_as_disabled() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("client/client-config.valid.toml")?;
    let client = parse_client_config_toml(&contents)?;

    assert_eq!(client.business_name(), "North Shore Wireless LLC");
    assert!(client.is_enabled(SourceKey::Pos));
    assert!(client.is_enabled(SourceKey::MetaAdsPerformance));
    assert!(!client.is_enabled(SourceKey::MetaAds));
    assert_eq!(client.get_table_id(SourceKey::MetaAds), None);
    assert_eq!(client.get_table_id(SourceKey::Ghl), None);

    let tables = client.derived_fresh_tables();
    let names: Vec<&str> = tables.iter().map(|(_, d)| d.name.as_ref()).collect();
    assert_eq!(
        names,
        vec![
            "North Shore Wireless POS",
            "North Shore Wireless Meta Ads Performance"
        ]
    );

    let summary = client.get_client_summary();
    assert_eq!(
        summary.client_info.client_id.as_ref(),
        "north_shore_wireless"
    );
    let disabled: Vec<&str> = summary
        .data_sources
        .disabled_sources
        .iter()
        .map(AsRef::as_ref)
        .collect();
    assert_eq!(disabled, vec!["ghl"]);
    Ok(())
}

#[test]
fn path_loader_detects_format_by_extension() -> Result<(), Box<dyn Error>> {
    let from_toml = load_client_config_from_path(&fixture_path("client/client-config.valid.toml"))?;
    assert_eq!(from_toml.get_base_id(), "appNorthShore0001");

    let from_json = load_client_config_from_path(&fixture_path("client/client-config.valid.json"))?;
    assert_eq!(from_json.get_base_id(), "app9JgRBZC2GNlaKM");
    Ok(())
}

#[test]
fn invalid_fixture_reports_unknown_source() -> Result<(), Box<dyn Error>> {
    let path = fixture_path("client/client-config.invalid.json");
    let error = load_client_config_from_path(&path)
        .err()
        .ok_or_else(|| std::io::Error::other("expected invalid fixture error"))?;

    assert_eq!(error.code, ErrorCode::new("config", "unknown_source"));
    assert_eq!(
        error.metadata.get("key").map(String::as_str),
        Some("tiktok_ads")
    );
    assert!(error.metadata.contains_key("path"));
    Ok(())
}

#[test]
fn missing_file_maps_to_not_found() -> Result<(), Box<dyn Error>> {
    let error = load_client_config_from_path(&fixture_path("client/missing.json"))
        .err()
        .ok_or_else(|| std::io::Error::other("expected not found error"))?;
    assert_eq!(
        error.code,
        ErrorCode::new("config", "client_config_not_found")
    );
    Ok(())
}
