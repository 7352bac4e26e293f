use crate::error::{PredictorError, Result};
use crate::models::FeatureValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Sidecar file describing the model's inputs
pub const MANIFEST_FILE_NAME: &str = "model.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    /// Input feature names in the order the model expects them
    #[serde(default)]
    pub input_features: Vec<String>,

    /// Vocabulary per categorical feature; a value encodes as its index
    #[serde(default)]
    pub categorical: HashMap<String, Vec<String>>,
}

impl ArtifactManifest {
    /// Read `model.json` from the artifact directory, if present
    pub fn load(artifact_dir: &Path) -> Result<Option<Self>> {
        let path = artifact_dir.join(MANIFEST_FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read(&path).map_err(|e| {
            PredictorError::Artifact(format!("failed to read {}: {}", path.display(), e))
        })?;
        let manifest: ArtifactManifest = serde_json::from_slice(&raw).map_err(|e| {
            PredictorError::Artifact(format!("invalid manifest {}: {}", path.display(), e))
        })?;

        for name in manifest.categorical.keys() {
            if !manifest.input_features.iter().any(|f| f == name) {
                return Err(PredictorError::Artifact(format!(
                    "categorical feature '{}' is not an input feature",
                    name
                )));
            }
        }

        Ok(Some(manifest))
    }

    /// Encode one row into model input values
    ///
    /// Numbers and bools pass through; strings are looked up in the vocabulary of
    /// the feature at that position. Nulls and unknown categories are rejected.
    pub fn encode_row(&self, row: &[FeatureValue]) -> Result<Vec<f32>> {
        if !self.input_features.is_empty() && row.len() != self.input_features.len() {
            return Err(PredictorError::Inference(format!(
                "model expects {} features, got {}",
                self.input_features.len(),
                row.len()
            )));
        }

        row.iter()
            .enumerate()
            .map(|(i, value)| self.encode_value(i, value))
            .collect()
    }

    fn encode_value(&self, position: usize, value: &FeatureValue) -> Result<f32> {
        if let Some(v) = value.as_f64() {
            return Ok(v as f32);
        }

        let name = self.input_features.get(position).map(String::as_str);
        match value {
            FeatureValue::String(s) => {
                let vocabulary = name
                    .and_then(|n| self.categorical.get(n))
                    .ok_or_else(|| {
                        PredictorError::Inference(format!(
                            "feature {} is a string but has no categorical encoding",
                            name.unwrap_or("<unnamed>")
                        ))
                    })?;
                vocabulary
                    .iter()
                    .position(|c| c == s)
                    .map(|idx| idx as f32)
                    .ok_or_else(|| {
                        PredictorError::Inference(format!(
                            "unknown category '{}' for feature {}",
                            s,
                            name.unwrap_or("<unnamed>")
                        ))
                    })
            }
            _ => Err(PredictorError::Inference(format!(
                "feature {} at position {} is null",
                name.unwrap_or("<unnamed>"),
                position
            ))),
        }
    }
}
