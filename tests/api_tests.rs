/// HTTP tests for the scoring API
/// Drives the router in-process with `tower::ServiceExt::oneshot`
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lead_scoring_api::classifier::{ClassifierModel, LogisticRegression};
use lead_scoring_api::config::Config;
use lead_scoring_api::encoder::{CategoryEncoding, CategoryEncodings, FeatureSchema};
use lead_scoring_api::api::handlers::{router, AppState};
use lead_scoring_api::pipeline::ScoringPipeline;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Pipeline whose classifier always answers 50% (all-zero weights).
fn half_pipeline() -> ScoringPipeline {
    let schema = FeatureSchema::new(vec!["age".to_string(), "job".to_string()]);
    let mut encodings = CategoryEncodings::new();
    encodings.insert(
        "job".to_string(),
        CategoryEncoding::new(vec!["admin.".to_string(), "technician".to_string()]),
    );
    let model = ClassifierModel::LogisticRegression(LogisticRegression {
        intercept: 0.0,
        coefficients: vec![0.0, 0.0],
    });
    ScoringPipeline::new(schema, encodings, Arc::new(model))
}

fn app(pipeline: ScoringPipeline, capacity: usize) -> Router {
    let config = Config {
        recent_scores_capacity: capacity,
        ..Config::default()
    };
    router(Arc::new(AppState::new(config, pipeline)))
}

fn lead_json(comments: &str) -> Value {
    json!({
        "age": 25,
        "job": "admin.",
        "marital": "single",
        "education": "secondary",
        "default": "no",
        "balance": 1000.0,
        "housing": "yes",
        "loan": "no",
        "contact": "unknown",
        "duration": 300,
        "campaign": 1,
        "pdays": -1,
        "previous": 0,
        "poutcome": "unknown",
        "comments": comments,
        "email": "test@example.com",
        "phone": "+91-9876543210",
        "consent": true
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post_score(app: &Router, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/score")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health_reports_loaded_model() {
    let app = app(half_pipeline(), 100);

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["leads_count"], 0);
}

#[tokio::test]
async fn test_score_lead_success() {
    let app = app(half_pipeline(), 100);

    let (status, body) = post_score(&app, &lead_json("This is urgent, I am ready!")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["initial_score"], 50.0);
    // urgent (+15) + ready (+10) + '!' (+2)
    assert_eq!(body["reranked_score"], 77.0);
    assert_eq!(body["message"], "Lead scored successfully");

    let (_, leads) = get(&app, "/leads").await;
    let leads = leads.as_array().unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["email"], "test@example.com");
    assert_eq!(leads[0]["initial_score"], 50.0);
    assert_eq!(leads[0]["reranked_score"], 77.0);
    assert_eq!(leads[0]["comments"], "This is urgent, I am ready!");

    let (_, health) = get(&app, "/health").await;
    assert_eq!(health["leads_count"], 1);
}

#[tokio::test]
async fn test_missing_optional_fields_are_defaulted() {
    let app = app(half_pipeline(), 100);
    let mut lead = lead_json("");
    let fields = lead.as_object_mut().unwrap();
    fields.remove("comments");
    fields.remove("email");
    fields.remove("phone");

    let (status, body) = post_score(&app, &lead).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reranked_score"], body["initial_score"]);

    let (_, leads) = get(&app, "/leads").await;
    assert_eq!(leads[0]["email"], "anonymous@example.com");
}

#[tokio::test]
async fn test_unseen_category_still_scores() {
    let app = app(half_pipeline(), 100);
    let mut lead = lead_json("");
    lead["job"] = json!("astronaut");

    let (status, _) = post_score(&app, &lead).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_validation_errors_name_fields() {
    let app = app(half_pipeline(), 100);
    let mut lead = lead_json("");
    lead["age"] = json!(17);
    lead["balance"] = json!(-1.0);
    lead["consent"] = json!(false);

    let (status, body) = post_score(&app, &lead).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["age", "balance", "consent"]);

    let (_, leads) = get(&app, "/leads").await;
    assert!(leads.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = app(half_pipeline(), 100);
    let mut lead = lead_json("");
    lead.as_object_mut().unwrap().remove("job");

    let (status, body) = post_score(&app, &lead).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "body");
}

#[tokio::test]
async fn test_oversize_body_rejected() {
    let config = Config {
        max_body_bytes: 64,
        ..Config::default()
    };
    let app = router(Arc::new(AppState::new(config, half_pipeline())));
    let body = lead_json(&"urgent ".repeat(70));

    // No Content-Length header, so the limit is hit while buffering the body.
    let (status, response) = post_score(&app, &body).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response["error"], "Request body too large");

    let (_, leads) = get(&app, "/leads").await;
    assert!(leads.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_degraded_mode() {
    let app = app(ScoringPipeline::degraded(), 100);

    for _ in 0..3 {
        let (status, body) = post_score(&app, &lead_json("urgent")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Model not loaded");
    }

    let (status, health) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["model_loaded"], false);
    assert_eq!(health["leads_count"], 0);
}

#[tokio::test]
async fn test_recent_leads_capped_and_ordered() {
    let app = app(half_pipeline(), 3);

    for n in 0..5 {
        let mut lead = lead_json("");
        lead["email"] = json!(format!("lead{}@example.com", n));
        let (status, _) = post_score(&app, &lead).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, leads) = get(&app, "/leads").await;
    let emails: Vec<&str> = leads
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["email"].as_str().unwrap())
        .collect();
    assert_eq!(
        emails,
        vec!["lead2@example.com", "lead3@example.com", "lead4@example.com"]
    );
}
