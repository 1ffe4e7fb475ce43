use crate::config::Config;
use crate::errors::{AppError, FieldViolation, ResultExt};
use crate::models::{HealthResponse, LeadRequest, ScoreResponse, ScoreResult};
use crate::pipeline::ScoringPipeline;
use crate::recent::RecentScores;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Scoring pipeline built once at startup, degraded if the model failed to load.
    pub pipeline: Arc<ScoringPipeline>,
    /// Most recent score results, oldest first.
    pub recent_scores: Arc<RecentScores>,
}

impl AppState {
    pub fn new(config: Config, pipeline: ScoringPipeline) -> Self {
        let recent_scores = Arc::new(RecentScores::new(config.recent_scores_capacity));
        Self {
            config,
            pipeline: Arc::new(pipeline),
            recent_scores,
        }
    }
}

/// Builds the HTTP router with its middleware stack.
pub fn router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/score", post(score_lead))
        .route("/leads", get(list_leads))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(max_body_bytes)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /health
///
/// Reports whether the classifier is loaded and how many results are buffered.
/// Always answers 200 so a degraded service stays observable.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let model_loaded = state.pipeline.is_model_loaded();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: if model_loaded { "healthy" } else { "degraded" }.to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            model_loaded,
            leads_count: state.recent_scores.len(),
        }),
    )
}

/// POST /score
///
/// Validates the lead, scores it, and records the result.
///
/// # Returns
///
/// * `Result<Json<ScoreResponse>, AppError>` - Both scores, or 422 for an
///   invalid lead, 413 for an oversize body and 503 when no model is loaded.
pub async fn score_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LeadRequest>, JsonRejection>,
) -> Result<Json<ScoreResponse>, AppError> {
    let Json(lead) = payload.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(rejection.body_text()),
        _ => AppError::Validation(vec![FieldViolation::new("body", rejection.body_text())]),
    })?;

    lead.validate()?;

    let result = state.pipeline.score(&lead).context("Error scoring lead")?;

    tracing::info!(
        "Scored lead {}: initial {:.2}, reranked {:.2}",
        result.id,
        result.initial_score,
        result.reranked_score
    );
    tracing::debug!("Lead {} contact: {}", result.id, result.email);

    let response = ScoreResponse::from(&result);
    state.recent_scores.push(result);

    Ok(Json(response))
}

/// GET /leads
///
/// Returns the buffered score results in insertion order, oldest first.
pub async fn list_leads(State(state): State<Arc<AppState>>) -> Json<Vec<ScoreResult>> {
    Json(state.recent_scores.snapshot())
}
