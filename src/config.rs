use serde::Deserialize;

/// Largest accepted `MAX_BODY_BYTES`.
pub const MAX_BODY_LIMIT: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Directory holding `model.json`, `label_encoders.json` and `feature_columns.json`.
    pub model_dir: String,
    pub recent_scores_capacity: usize,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            model_dir: "model".to_string(),
            recent_scores_capacity: 100,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            model_dir: std::env::var("MODEL_DIR")
                .unwrap_or(defaults.model_dir)
                .trim()
                .to_string(),
            recent_scores_capacity: std::env::var("RECENT_SCORES_CAPACITY")
                .unwrap_or_else(|_| defaults.recent_scores_capacity.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RECENT_SCORES_CAPACITY must be a positive integer"))
                .and_then(|capacity: usize| {
                    if capacity == 0 {
                        anyhow::bail!("RECENT_SCORES_CAPACITY must be at least 1");
                    }
                    Ok(capacity)
                })?,
            max_body_bytes: parse_body_limit(
                &std::env::var("MAX_BODY_BYTES")
                    .unwrap_or_else(|_| defaults.max_body_bytes.to_string()),
            )?,
        };

        if config.model_dir.is_empty() {
            anyhow::bail!("MODEL_DIR cannot be empty");
        }

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Model directory: {}", config.model_dir);
        tracing::debug!("Recent scores capacity: {}", config.recent_scores_capacity);
        tracing::debug!("Max body bytes: {}", config.max_body_bytes);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

/// Parses `MAX_BODY_BYTES`, bounded to `1..=MAX_BODY_LIMIT`.
fn parse_body_limit(raw: &str) -> anyhow::Result<usize> {
    let limit: usize = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("MAX_BODY_BYTES must be a positive integer"))?;
    if limit == 0 {
        anyhow::bail!("MAX_BODY_BYTES must be at least 1");
    }
    if limit > MAX_BODY_LIMIT {
        anyhow::bail!("MAX_BODY_BYTES must be at most {}", MAX_BODY_LIMIT);
    }
    Ok(limit)
}
