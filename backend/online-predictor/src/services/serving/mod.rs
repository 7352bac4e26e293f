// ============================================
// Serving Session
// ============================================
// Binds one serving feature view and one loaded model behind
// `initialize` and `predict`. A session only exists once every
// collaborator resolved, so there is no half-initialized state.

mod selection;

pub use selection::{drop_positions, ColumnSelection};

use crate::config::Config;
use crate::error::{PredictorError, Result};
use crate::models::{FeatureValue, Prediction};
use crate::services::feature_store::{FeatureStoreConnection, FeatureVectorSource};
use crate::services::model::{Model, OnnxModel};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ServingSession {
    feature_view: Arc<dyn FeatureVectorSource>,
    model: Arc<dyn Model>,
    selection: ColumnSelection,
    entity_key: String,
}

impl ServingSession {
    /// Connect to the feature store, initialize the feature view's serving mode
    /// and load the model artifact.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let connection = FeatureStoreConnection::connect(&config.feature_store()).await?;
        let feature_store = connection.get_feature_store().await?;

        let feature_view = feature_store
            .get_feature_view(&config.feature_view_name, config.feature_view_version)
            .await?
            .init_serving(config.training_dataset_version)
            .await?;

        let artifact_dir = config.artifact_files_path.clone();
        let model_file = config.model_file_name.clone();
        let model = tokio::task::spawn_blocking(move || OnnxModel::load(&artifact_dir, &model_file))
            .await
            .map_err(|e| PredictorError::Artifact(format!("model loader panicked: {}", e)))??;

        Self::from_parts(
            Arc::new(feature_view),
            Arc::new(model),
            &config.entity_key,
            &config.excluded_columns,
        )
    }

    /// Assemble a session from already-initialized collaborators
    ///
    /// Validates the entity key against the view's serving keys and the excluded
    /// columns against its schema.
    pub fn from_parts(
        feature_view: Arc<dyn FeatureVectorSource>,
        model: Arc<dyn Model>,
        entity_key: &str,
        excluded_columns: &[String],
    ) -> Result<Self> {
        let serving_keys = feature_view.serving_keys();
        if !serving_keys.is_empty() && !serving_keys.iter().any(|k| k == entity_key) {
            return Err(PredictorError::Schema(format!(
                "entity key '{}' is not a serving key of {} (serving keys: {:?})",
                entity_key,
                feature_view.name(),
                serving_keys
            )));
        }
        if serving_keys.len() > 1 {
            return Err(PredictorError::Schema(format!(
                "feature view {} requires serving keys {:?}, only '{}' is supplied",
                feature_view.name(),
                serving_keys,
                entity_key
            )));
        }

        let selection = ColumnSelection::exclude(feature_view.schema(), excluded_columns)?;

        if let Some(expected) = model.input_features() {
            let retained = selection.retained_names(feature_view.schema());
            if retained != expected {
                return Err(PredictorError::Schema(format!(
                    "model expects features {:?}, feature view serves {:?}",
                    expected, retained
                )));
            }
        }

        info!(
            feature_view = %feature_view.name(),
            version = feature_view.version(),
            entity_key = %entity_key,
            excluded = ?excluded_columns,
            model_inputs = selection.retained_width(),
            "Initialization complete"
        );

        Ok(Self {
            feature_view,
            model,
            selection,
            entity_key: entity_key.to_string(),
        })
    }

    pub fn feature_view_name(&self) -> &str {
        self.feature_view.name()
    }

    pub fn feature_view_version(&self) -> u32 {
        self.feature_view.version()
    }

    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    /// Serve one prediction; `inputs[0]` is the entity key
    pub async fn predict(&self, inputs: &[Value]) -> Result<Vec<Prediction>> {
        let key = inputs
            .first()
            .ok_or_else(|| PredictorError::InvalidInput("inputs must not be empty".to_string()))?;

        let mut entries = Map::new();
        entries.insert(self.entity_key.clone(), key.clone());

        let vector = self.feature_view.get_feature_vector(&entries).await?;
        let row: Vec<FeatureValue> = self.selection.apply(vector)?;

        debug!(
            entity = %key,
            width = row.len(),
            "Running model on feature row"
        );

        self.model.predict(&row)
    }
}
