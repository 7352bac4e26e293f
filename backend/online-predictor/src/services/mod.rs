pub mod feature_store;
pub mod model;
pub mod serving;

pub use feature_store::{FeatureStoreConnection, FeatureVectorSource};
pub use model::{Model, OnnxModel};
pub use serving::ServingSession;
