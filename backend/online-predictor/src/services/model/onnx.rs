//! ONNX Model Inference
//!
//! Loads an ONNX-exported model with tract-onnx and runs it on a single
//! feature row reshaped to a `(1, n)` matrix.

use super::{ArtifactManifest, Model};
use crate::error::{PredictorError, Result};
use crate::models::{FeatureValue, Prediction};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tract_onnx::prelude::*;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

pub struct OnnxModel {
    plan: Arc<OnnxPlan>,
    manifest: ArtifactManifest,
}

impl OnnxModel {
    /// Load `<artifact_dir>/<file_name>` and the optional manifest next to it
    pub fn load(artifact_dir: &Path, file_name: &str) -> Result<Self> {
        let path = artifact_dir.join(file_name);
        if !path.is_file() {
            return Err(PredictorError::Artifact(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let manifest = ArtifactManifest::load(artifact_dir)?;
        let plan = Self::try_load_onnx(&path, manifest.as_ref()).map_err(|e| {
            PredictorError::Artifact(format!("failed to load {}: {}", path.display(), e))
        })?;

        info!(
            path = %path.display(),
            declared_inputs = manifest.as_ref().map(|m| m.input_features.len()),
            "Loaded ONNX model"
        );

        Ok(Self {
            plan: Arc::new(plan),
            manifest: manifest.unwrap_or_default(),
        })
    }

    fn try_load_onnx(path: &Path, manifest: Option<&ArtifactManifest>) -> TractResult<OnnxPlan> {
        let mut model = tract_onnx::onnx().model_for_path(path)?;

        if let Some(width) = manifest
            .map(|m| m.input_features.len())
            .filter(|width| *width > 0)
        {
            model = model.with_input_fact(0, f32::fact([1, width]).into())?;
        }

        model.into_optimized()?.into_runnable()
    }
}

impl Model for OnnxModel {
    fn input_features(&self) -> Option<&[String]> {
        if self.manifest.input_features.is_empty() {
            None
        } else {
            Some(&self.manifest.input_features)
        }
    }

    fn predict(&self, row: &[FeatureValue]) -> Result<Vec<Prediction>> {
        let encoded = self.manifest.encode_row(row)?;
        let width = encoded.len();

        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, width), encoded)
            .map_err(|e| PredictorError::Inference(format!("Re-shaping failed: {}", e)))?
            .into();

        let outputs = self
            .plan
            .run(tvec![input.into()])
            .map_err(|e| PredictorError::Inference(format!("ONNX inference failed: {}", e)))?;

        let predictions = tensor_to_predictions(&outputs[0])?;
        debug!(width, predictions = predictions.len(), "Model inference complete");

        Ok(predictions)
    }
}

/// Flatten the first output tensor into plain predictions
fn tensor_to_predictions(tensor: &Tensor) -> Result<Vec<Prediction>> {
    let extracted = match tensor.datum_type() {
        DatumType::I64 => tensor
            .to_array_view::<i64>()
            .map(|v| v.iter().map(|x| Prediction::Label(*x)).collect()),
        DatumType::I32 => tensor
            .to_array_view::<i32>()
            .map(|v| v.iter().map(|x| Prediction::Label(*x as i64)).collect()),
        DatumType::Bool => tensor
            .to_array_view::<bool>()
            .map(|v| v.iter().map(|x| Prediction::Label(*x as i64)).collect()),
        DatumType::F32 => tensor
            .to_array_view::<f32>()
            .map(|v| v.iter().map(|x| Prediction::Score(*x as f64)).collect()),
        DatumType::F64 => tensor
            .to_array_view::<f64>()
            .map(|v| v.iter().map(|x| Prediction::Score(*x)).collect()),
        other => {
            return Err(PredictorError::Inference(format!(
                "unsupported output type {:?}",
                other
            )))
        }
    };

    extracted.map_err(|e| PredictorError::Inference(format!("Output extraction failed: {}", e)))
}
