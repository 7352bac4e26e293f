// HTTP handlers for the prediction endpoint and probes

use crate::error::{PredictorError, Result};
use crate::models::{PredictRequest, PredictResponse};
use crate::services::ServingSession;
use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::{error, warn};

const SERVICE_NAME: &str = "online-predictor";

/// Shared handler state; the session is immutable once built
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<ServingSession>,
}

impl AppState {
    pub fn new(session: Arc<ServingSession>) -> Self {
        Self { session }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/predict", web::post().to(predict))
        .route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check));
}

pub async fn predict(
    state: web::Data<AppState>,
    body: web::Json<PredictRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner();

    match state.session.predict(&request.inputs).await {
        Ok(predictions) => Ok(HttpResponse::Ok().json(PredictResponse { predictions })),
        Err(e) => {
            match &e {
                PredictorError::InvalidInput(_) | PredictorError::EntityNotFound(_) => {
                    warn!(error = %e, inputs = ?request.inputs, "Prediction rejected")
                }
                _ => error!(error = %e, inputs = ?request.inputs, "Prediction failed"),
            }
            Err(e)
        }
    }
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME
    }))
}

async fn readiness_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ready",
        "service": SERVICE_NAME,
        "feature_view": state.session.feature_view_name(),
        "feature_view_version": state.session.feature_view_version(),
        "model_inputs": state.session.selection().retained_width()
    }))
}
