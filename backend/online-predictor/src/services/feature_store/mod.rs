// ============================================
// Feature Store Client Module
// ============================================
// Resolves feature views and serves precomputed feature
// vectors from the remote feature store REST API.

pub mod rest_client;

pub use rest_client::{FeatureStore, FeatureStoreConnection, FeatureView, ServingFeatureView};

use crate::error::Result;
use crate::models::{FeatureValue, FeatureViewSchema};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Serving-ready feature view.
///
/// The prediction path only needs the declared schema and the per-entity lookup,
/// so the session depends on this trait rather than on the HTTP client.
#[async_trait]
pub trait FeatureVectorSource: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> u32;

    /// Columns of every vector returned by `get_feature_vector`, in order
    fn schema(&self) -> &FeatureViewSchema;

    /// Names of the primary keys a lookup must provide
    fn serving_keys(&self) -> Vec<String>;

    async fn get_feature_vector(&self, entries: &Map<String, Value>) -> Result<Vec<FeatureValue>>;
}
