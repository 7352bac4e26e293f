//! Model Artifact Module
//!
//! Loads the serialized model from the artifact directory and runs
//! single-row inference on a stripped feature vector.

mod manifest;
mod onnx;

pub use manifest::{ArtifactManifest, MANIFEST_FILE_NAME};
pub use onnx::OnnxModel;

use crate::error::Result;
use crate::models::{FeatureValue, Prediction};

/// A loaded predictive model
pub trait Model: Send + Sync {
    /// Feature names the model was trained on, in input order, when the
    /// artifact declares them
    fn input_features(&self) -> Option<&[String]> {
        None
    }

    /// Predict on exactly one feature row
    fn predict(&self, row: &[FeatureValue]) -> Result<Vec<Prediction>>;
}
