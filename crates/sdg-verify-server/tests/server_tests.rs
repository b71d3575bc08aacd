//! End-to-end tests: a real listener on an ephemeral port, driven with reqwest.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use tokio::net::TcpListener;

use sdgverify::config::PipelineMode;
use sdgverify::fixtures::{solid_jpeg, solid_png};
use sdgverify::lifecycle::ServiceLifecycle;
use sdgverify::pipeline::ValidationPipeline;
use sdgverify::scoring::{MockActivityScorer, MockAuthenticityScorer};
use sdgverify::service::{ServicePipeline, VerificationService};
use sdgverify::upload::UploadPolicy;
use sdgverify_server::gateway::{HandlerState, HealthResponse, create_router_with_state};

async fn serve(state: HandlerState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router_with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn image_form(filename: &str, bytes: Vec<u8>, mime: &str) -> Form {
    Form::new().part(
        "file",
        Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .unwrap(),
    )
}

fn ready_state(authenticity: MockAuthenticityScorer, activity: MockActivityScorer) -> HandlerState {
    let pipeline = ValidationPipeline::new(Arc::new(authenticity), Arc::new(activity));
    let service = VerificationService::from_parts(
        ServicePipeline::CandidateLabels(pipeline),
        UploadPolicy::standard(),
    );
    HandlerState::with_service(service).unwrap()
}

#[tokio::test]
async fn test_two_stage_submission_over_http() {
    let base = serve(ready_state(
        MockAuthenticityScorer::real(0.9731),
        MockActivityScorer::fixed("planting trees", 0.8642),
    ))
    .await;

    let form = image_form("mission.jpg", solid_jpeg(32, 24, [40, 120, 40]), "image/jpeg")
        .text("labels", "planting trees, coastal cleanup");
    let res = reqwest::Client::new()
        .post(format!("{base}/analyze-image"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("x-request-id").is_some());

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["valid"], true);
    assert_eq!(body["sdg_label"], "planting trees");
    assert!((body["deepfake_confidence"].as_f64().unwrap() - 0.9731).abs() < 1e-4);
    assert!((body["sdg_score"].as_f64().unwrap() - 0.8642).abs() < 1e-4);
}

#[tokio::test]
async fn test_becomes_ready_after_models_load() {
    let lifecycle = Arc::new(ServiceLifecycle::new());
    let state = HandlerState::new(
        lifecycle.clone(),
        PipelineMode::CandidateLabels,
        UploadPolicy::standard(),
    );
    let base = serve(state).await;
    let client = reqwest::Client::new();

    let health: HealthResponse = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!health.service_ready);

    let res = client
        .post(format!("{base}/analyze-image"))
        .multipart(image_form("a.png", solid_png(8, 8, [0, 0, 0]), "image/png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);

    let pipeline = ValidationPipeline::new(
        Arc::new(MockAuthenticityScorer::fake(0.88)),
        Arc::new(MockActivityScorer::fixed("x", 0.9)),
    );
    lifecycle
        .mark_ready(VerificationService::from_parts(
            ServicePipeline::CandidateLabels(pipeline),
            UploadPolicy::standard(),
        ))
        .unwrap();

    let health: HealthResponse = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(health.service_ready);

    let body: serde_json::Value = client
        .post(format!("{base}/analyze-image"))
        .multipart(image_form("a.png", solid_png(8, 8, [0, 0, 0]), "image/png"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "Image is AI generated");
}
