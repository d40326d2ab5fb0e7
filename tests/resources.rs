use nlp_dashboard::common::ModelConfig;
use nlp_dashboard::resources::{LocalResource, ResourceProvider};
use nlp_dashboard::{Config, DashboardError};
use std::fs;
use std::path::PathBuf;

#[test]
fn test_local_resource() -> anyhow::Result<()> {
    //    Given
    let directory = tempfile::tempdir()?;
    let config_path = directory.path().join("config.json");
    fs::write(&config_path, r#"{"id2label": {"1": "POSITIVE", "0": "NEGATIVE"}}"#)?;

    //    When
    let resource = LocalResource::from(config_path.clone());
    let local_path = resource.get_local_path()?;
    let config = ModelConfig::from_file(local_path)?;

    //    Then
    assert_eq!(resource.get_local_path()?, config_path);
    assert_eq!(config.ordered_labels()?, vec!["NEGATIVE", "POSITIVE"]);
    Ok(())
}

#[test]
fn test_missing_local_resource() {
    let resource = LocalResource::from(PathBuf::from("path/to/missing/config.json"));
    assert!(matches!(
        resource.get_local_path(),
        Err(DashboardError::IOError(_))
    ));
}

#[test]
fn test_malformed_config() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let config_path = directory.path().join("config.json");
    fs::write(&config_path, "{ not json")?;

    assert!(matches!(
        ModelConfig::from_file(&config_path),
        Err(DashboardError::SerializationError(_))
    ));
    Ok(())
}
