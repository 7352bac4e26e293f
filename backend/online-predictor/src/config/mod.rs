use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // HTTP server config
    pub http_host: String,
    pub http_port: u16,

    // Feature store connection
    pub feature_store_url: String,
    #[serde(default)]
    pub feature_store_online_url: Option<String>,
    pub project_name: String,
    #[serde(default)]
    pub feature_store_name: Option<String>,
    pub request_timeout_ms: u64,

    // Feature view resolution
    pub feature_view_name: String,
    pub feature_view_version: u32,
    pub training_dataset_version: u32,
    pub entity_key: String,
    pub excluded_columns: Vec<String>,

    // Model artifact
    pub artifact_files_path: PathBuf,
    pub model_file_name: String,
}

/// Connection settings handed to the feature-store client.
#[derive(Debug, Clone)]
pub struct FeatureStoreConfig {
    pub url: String,
    pub online_url: String,
    pub project_name: String,
    pub feature_store_name: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("http_host", "0.0.0.0")?
            .set_default("http_port", 8080)?
            .set_default("request_timeout_ms", 5000)?
            .set_default("feature_view_name", "transactions_fraud_online_fv")?
            .set_default("feature_view_version", 1)?
            .set_default("training_dataset_version", 1)?
            .set_default("entity_key", "cc_num")?
            .set_default("excluded_columns", vec!["cc_num", "fraud_label"])?
            .set_default("model_file_name", "model.onnx")?
            .add_source(
                config::Environment::default()
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("excluded_columns"),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            return Err(anyhow!("HTTP port must be greater than 0"));
        }

        if self.feature_store_url.is_empty() {
            return Err(anyhow!("Feature store URL is required"));
        }

        if self.project_name.is_empty() {
            return Err(anyhow!("Project name is required"));
        }

        if self.feature_view_name.is_empty() {
            return Err(anyhow!("Feature view name is required"));
        }

        if self.feature_view_version == 0 || self.training_dataset_version == 0 {
            return Err(anyhow!("Feature view and training dataset versions start at 1"));
        }

        if self.entity_key.is_empty() {
            return Err(anyhow!("Entity key name is required"));
        }

        if self.excluded_columns.is_empty() || self.excluded_columns.iter().any(|c| c.is_empty()) {
            return Err(anyhow!("Excluded columns must name at least one non-empty column"));
        }

        if self.artifact_files_path.as_os_str().is_empty() {
            return Err(anyhow!("ARTIFACT_FILES_PATH is required"));
        }

        if self.model_file_name.is_empty() {
            return Err(anyhow!("Model file name is required"));
        }

        if self.request_timeout_ms == 0 {
            return Err(anyhow!("Request timeout must be greater than 0"));
        }

        Ok(())
    }

    pub fn feature_store(&self) -> FeatureStoreConfig {
        let url = self.feature_store_url.trim_end_matches('/').to_string();
        let online_url = self
            .feature_store_online_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| url.clone());
        let feature_store_name = self
            .feature_store_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{}_featurestore", self.project_name.to_lowercase()));

        FeatureStoreConfig {
            url,
            online_url,
            project_name: self.project_name.clone(),
            feature_store_name,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.artifact_files_path.join(&self.model_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            feature_store_url: "https://hopsworks.local:8181/".to_string(),
            feature_store_online_url: None,
            project_name: "Fraud".to_string(),
            feature_store_name: None,
            request_timeout_ms: 5000,
            feature_view_name: "transactions_fraud_online_fv".to_string(),
            feature_view_version: 1,
            training_dataset_version: 1,
            entity_key: "cc_num".to_string(),
            excluded_columns: vec!["cc_num".to_string(), "fraud_label".to_string()],
            artifact_files_path: PathBuf::from("/models/fraud/1/Files"),
            model_file_name: "model.onnx".to_string(),
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_versions() {
        let mut config = valid_config();
        config.feature_view_version = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.training_dataset_version = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_exclusions_rejected() {
        let mut config = valid_config();
        config.excluded_columns.clear();
        assert!(config.validate().is_err());

        config.excluded_columns = vec!["cc_num".to_string(), String::new()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_artifact_path_rejected() {
        let mut config = valid_config();
        config.artifact_files_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_feature_store_defaults() {
        let fs = valid_config().feature_store();
        assert_eq!(fs.url, "https://hopsworks.local:8181");
        assert_eq!(fs.online_url, "https://hopsworks.local:8181");
        assert_eq!(fs.feature_store_name, "fraud_featurestore");
        assert_eq!(fs.request_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_feature_store_overrides() {
        let mut config = valid_config();
        config.feature_store_online_url = Some("http://rondb-rest:4406".to_string());
        config.feature_store_name = Some("shared_featurestore".to_string());

        let fs = config.feature_store();
        assert_eq!(fs.online_url, "http://rondb-rest:4406");
        assert_eq!(fs.feature_store_name, "shared_featurestore");
    }

    #[test]
    fn test_model_path() {
        assert_eq!(
            valid_config().model_path(),
            PathBuf::from("/models/fraud/1/Files/model.onnx")
        );
    }
}
