use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::LoanApplication;
use super::explain::Explainer;
use super::profile::DecisionProfile;
use super::service::{UnderwritingService, UnderwritingServiceError};

#[derive(Debug, Deserialize)]
pub struct MineRequest {
    #[serde(alias = "applications")]
    pub records: Vec<LoanApplication>,
}

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    #[serde(alias = "applications")]
    pub records: Vec<LoanApplication>,
    pub profiles: Vec<DecisionProfile>,
}

/// Router builder exposing the mining and decision endpoints.
///
/// Both handlers run the engine on the blocking pool so large batches leave the async
/// workers free.
pub fn underwriting_router<E>(service: Arc<UnderwritingService<E>>) -> Router
where
    E: Explainer + 'static,
{
    Router::new()
        .route("/api/v1/rules/mine", post(mine_handler::<E>))
        .route("/api/v1/rules/decide", post(decide_handler::<E>))
        .with_state(service)
}

pub(crate) async fn mine_handler<E>(
    State(service): State<Arc<UnderwritingService<E>>>,
    axum::Json(request): axum::Json<MineRequest>,
) -> Response
where
    E: Explainer + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || service.mine(&request.records)).await;
    match outcome {
        Ok(Ok(report)) => (StatusCode::OK, axum::Json(report)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(join) => join_failure("mine", join),
    }
}

pub(crate) async fn decide_handler<E>(
    State(service): State<Arc<UnderwritingService<E>>>,
    axum::Json(request): axum::Json<DecideRequest>,
) -> Response
where
    E: Explainer + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || {
        service.decide(&request.records, &request.profiles)
    })
    .await;
    match outcome {
        Ok(Ok(results)) => (StatusCode::OK, axum::Json(results)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(join) => join_failure("decide", join),
    }
}

fn join_failure(operation: &'static str, join: tokio::task::JoinError) -> Response {
    error!(operation, error = %join, "underwriting task did not complete");
    let payload = json!({
        "error": format!("{operation} did not complete"),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

fn error_response(error: UnderwritingServiceError) -> Response {
    match error {
        UnderwritingServiceError::Validation(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
