// ============================================
// Feature Store REST Client
// ============================================
// connect -> get_feature_store -> get_feature_view -> init_serving
// Each step returns the handle for the next, so a feature vector can
// only be requested from a view whose serving mode was initialized.

use super::FeatureVectorSource;
use crate::config::FeatureStoreConfig;
use crate::error::{PredictorError, Result};
use crate::models::{FeatureDescriptor, FeatureValue, FeatureViewSchema};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const API_PREFIX: &str = "hopsworks-api/api";
const ONLINE_API_VERSION: &str = "0.1.0";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectInfo {
    project_id: i64,
    project_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureStoreInfo {
    featurestore_id: i64,
    featurestore_name: String,
}

#[derive(Debug, Deserialize)]
struct FeatureViewInfo {
    name: String,
    version: u32,
    #[serde(default)]
    features: Vec<FeatureDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServingKeyInfo {
    feature_name: String,
    #[serde(default = "default_required")]
    required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeatureVectorRequest<'a> {
    feature_store_name: &'a str,
    feature_view_name: &'a str,
    feature_view_version: u32,
    entries: &'a Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct FeatureVectorResponse {
    #[serde(default)]
    features: Vec<FeatureValue>,
    #[serde(default)]
    status: Option<String>,
}

/// Map a non-success response to an error, reading the body for context
async fn check_status(
    response: Response,
    on_not_found: impl FnOnce() -> PredictorError,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(on_not_found());
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
    if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::GATEWAY_TIMEOUT {
        return Err(PredictorError::Connection(format!("{}: {}", status, body)));
    }
    Err(PredictorError::FeatureStore(format!("{}: {}", status, body)))
}

/// Handle to an authenticated project on the feature store cluster
pub struct FeatureStoreConnection {
    http: HttpClient,
    config: FeatureStoreConfig,
    project_id: i64,
}

impl FeatureStoreConnection {
    /// Connect to the feature store and resolve the configured project
    pub async fn connect(config: &FeatureStoreConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PredictorError::Configuration(format!("HTTP client: {}", e)))?;

        let url = format!(
            "{}/{}/project/getProjectInfo/{}",
            config.url, API_PREFIX, config.project_name
        );
        debug!(url = %url, "Resolving feature store project");

        let response = http
            .get(&url)
            .send()
            .await
            .map_err(|e| PredictorError::Connection(format!("{}: {}", config.url, e)))?;
        let project: ProjectInfo = check_status(response, || {
            PredictorError::Connection(format!("project '{}' not found", config.project_name))
        })
        .await?
        .json()
        .await?;

        info!(
            project_id = project.project_id,
            project_name = %project.project_name,
            "Connected to feature store"
        );

        Ok(Self {
            http,
            config: config.clone(),
            project_id: project.project_id,
        })
    }

    pub fn project_id(&self) -> i64 {
        self.project_id
    }

    /// Resolve the project's feature store
    pub async fn get_feature_store(&self) -> Result<FeatureStore> {
        let name = &self.config.feature_store_name;
        let url = format!(
            "{}/{}/project/{}/featurestores/{}",
            self.config.url, API_PREFIX, self.project_id, name
        );

        let response = self.http.get(&url).send().await?;
        let info: FeatureStoreInfo =
            check_status(response, || PredictorError::FeatureStoreNotFound(name.clone()))
                .await?
                .json()
                .await?;

        debug!(
            featurestore_id = info.featurestore_id,
            featurestore_name = %info.featurestore_name,
            "Resolved feature store"
        );

        Ok(FeatureStore {
            http: self.http.clone(),
            api_url: format!(
                "{}/{}/project/{}/featurestores/{}",
                self.config.url, API_PREFIX, self.project_id, info.featurestore_id
            ),
            online_url: self.config.online_url.clone(),
            id: info.featurestore_id,
            name: info.featurestore_name,
        })
    }
}

/// A resolved feature store
pub struct FeatureStore {
    http: HttpClient,
    api_url: String,
    online_url: String,
    id: i64,
    name: String,
}

impl FeatureStore {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve a feature view at a fixed version, including its declared features
    pub async fn get_feature_view(&self, name: &str, version: u32) -> Result<FeatureView> {
        let view_url = format!("{}/featureview/{}/version/{}", self.api_url, name, version);

        let response = self
            .http
            .get(&view_url)
            .query(&[("expand", "features")])
            .send()
            .await?;
        let info: FeatureViewInfo = check_status(response, || PredictorError::FeatureViewNotFound {
            name: name.to_string(),
            version,
        })
        .await?
        .json()
        .await?;

        if info.features.is_empty() {
            return Err(PredictorError::Schema(format!(
                "feature view {} v{} declares no features",
                info.name, info.version
            )));
        }

        info!(
            feature_view = %info.name,
            version = info.version,
            feature_count = info.features.len(),
            "Resolved feature view"
        );

        Ok(FeatureView {
            http: self.http.clone(),
            view_url,
            online_url: self.online_url.clone(),
            feature_store_name: self.name.clone(),
            name: info.name,
            version: info.version,
            schema: FeatureViewSchema::new(info.features),
        })
    }
}

/// A resolved feature view whose serving mode is not yet initialized
pub struct FeatureView {
    http: HttpClient,
    view_url: String,
    online_url: String,
    feature_store_name: String,
    name: String,
    version: u32,
    schema: FeatureViewSchema,
}

impl FeatureView {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn schema(&self) -> &FeatureViewSchema {
        &self.schema
    }

    /// Put the view into serving mode for the given training dataset version
    pub async fn init_serving(self, training_dataset_version: u32) -> Result<ServingFeatureView> {
        let url = format!("{}/servingkeys", self.view_url);

        let response = self.http.get(&url).send().await?;
        let keys: Vec<ServingKeyInfo> = check_status(response, || {
            PredictorError::Schema(format!(
                "no serving keys for feature view {} v{}",
                self.name, self.version
            ))
        })
        .await?
        .json()
        .await?;

        if keys.is_empty() {
            return Err(PredictorError::Schema(format!(
                "feature view {} v{} has no serving keys",
                self.name, self.version
            )));
        }

        let required_keys: Vec<String> = keys
            .iter()
            .filter(|k| k.required)
            .map(|k| k.feature_name.clone())
            .collect();

        info!(
            feature_view = %self.name,
            version = self.version,
            training_dataset_version,
            serving_keys = ?required_keys,
            "Feature view serving initialized"
        );

        Ok(ServingFeatureView {
            http: self.http,
            vector_url: format!("{}/{}/feature_store", self.online_url, ONLINE_API_VERSION),
            feature_store_name: self.feature_store_name,
            name: self.name,
            version: self.version,
            training_dataset_version,
            schema: self.schema,
            required_keys,
        })
    }
}

/// A feature view ready to serve single-entity feature vectors
pub struct ServingFeatureView {
    http: HttpClient,
    vector_url: String,
    feature_store_name: String,
    name: String,
    version: u32,
    training_dataset_version: u32,
    schema: FeatureViewSchema,
    required_keys: Vec<String>,
}

impl ServingFeatureView {
    pub fn training_dataset_version(&self) -> u32 {
        self.training_dataset_version
    }
}

#[async_trait]
impl FeatureVectorSource for ServingFeatureView {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn schema(&self) -> &FeatureViewSchema {
        &self.schema
    }

    fn serving_keys(&self) -> Vec<String> {
        self.required_keys.clone()
    }

    async fn get_feature_vector(&self, entries: &Map<String, Value>) -> Result<Vec<FeatureValue>> {
        if let Some(missing) = self.required_keys.iter().find(|k| !entries.contains_key(*k)) {
            return Err(PredictorError::InvalidInput(format!(
                "missing serving key '{}'",
                missing
            )));
        }

        let request = FeatureVectorRequest {
            feature_store_name: &self.feature_store_name,
            feature_view_name: &self.name,
            feature_view_version: self.version,
            entries,
        };

        let entity = Value::Object(entries.clone());
        let response = self.http.post(&self.vector_url).json(&request).send().await?;
        let body: FeatureVectorResponse =
            check_status(response, || PredictorError::EntityNotFound(entity.to_string()))
                .await?
                .json()
                .await?;

        match body.status.as_deref() {
            Some("MISSING") => {
                warn!(feature_view = %self.name, entity = %entity, "Feature vector missing");
                return Err(PredictorError::EntityNotFound(entity.to_string()));
            }
            Some("ERROR") => {
                return Err(PredictorError::FeatureStore(format!(
                    "lookup failed for {}",
                    entity
                )));
            }
            _ => {}
        }

        if body.features.is_empty() {
            return Err(PredictorError::EntityNotFound(entity.to_string()));
        }

        debug!(
            feature_view = %self.name,
            entity = %entity,
            width = body.features.len(),
            "Fetched feature vector"
        );

        Ok(body.features)
    }
}
