use lead_scoring_api::artifacts::load_artifacts;
use lead_scoring_api::config::Config;
use lead_scoring_api::handlers::{self, AppState};
use lead_scoring_api::pipeline::ScoringPipeline;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Model artifacts (classifier, category encodings, feature schema).
/// - HTTP routes and middleware (CORS, body limit, tracing).
///
/// A model that fails to load does not stop the server: it starts in
/// degraded mode, `/score` answers 503 and `/health` reports
/// `model_loaded: false`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_scoring_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let pipeline = match load_artifacts(&config.model_dir) {
        Ok(artifacts) => {
            tracing::info!(
                "✓ Model loaded from {}: {} ({} features, {} encoded fields)",
                config.model_dir,
                artifacts.classifier.summary(),
                artifacts.schema.len(),
                artifacts.encodings.len()
            );
            for (file, digest) in &artifacts.fingerprints {
                tracing::debug!("{} sha256 {}", file, digest);
            }
            ScoringPipeline::from_artifacts(artifacts)
        }
        Err(e) => {
            tracing::error!(
                "Failed to load model from {}: {:#}. Serving in degraded mode",
                config.model_dir,
                e
            );
            ScoringPipeline::degraded()
        }
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let app_state = Arc::new(AppState::new(config, pipeline));
    let app = handlers::router(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
