use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PredictorError>;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Feature store connection error: {0}")]
    Connection(String),

    #[error("Feature store error: {0}")]
    FeatureStore(String),

    #[error("Feature store not found: {0}")]
    FeatureStoreNotFound(String),

    #[error("Feature view not found: {name} (version {version})")]
    FeatureViewNotFound { name: String, version: u32 },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Feature vector has {actual} values, feature view declares {expected}")]
    FeatureVectorShape { expected: usize, actual: usize },

    #[error("Model artifact error: {0}")]
    Artifact(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for PredictorError {
    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();

        HttpResponse::build(code).json(ErrorResponse {
            error: self.to_string(),
            code: code.as_u16(),
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PredictorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PredictorError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            PredictorError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for PredictorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PredictorError::Serialization(err.to_string())
        } else if err.is_connect() || err.is_timeout() {
            PredictorError::Connection(err.to_string())
        } else {
            PredictorError::FeatureStore(err.to_string())
        }
    }
}

impl From<config::ConfigError> for PredictorError {
    fn from(err: config::ConfigError) -> Self {
        PredictorError::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for PredictorError {
    fn from(err: serde_json::Error) -> Self {
        PredictorError::Serialization(err.to_string())
    }
}
