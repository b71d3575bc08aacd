//! Router-level tests for the gateway handlers, driven through `oneshot`
//! with hand-built multipart bodies and scripted scorers.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::gateway::create_router_with_state;
use crate::gateway::error::{GatewayError, PROCESSING_ERROR_MESSAGE};
use crate::gateway::handler::{REQUEST_ID_HEADER, short_digest, task_failure};
use crate::gateway::state::HandlerState;
use sdgverify::config::PipelineMode;
use sdgverify::fixtures::solid_png;
use sdgverify::lifecycle::ServiceLifecycle;
use sdgverify::pipeline::{ClassificationPipeline, FixedClassPolicy, ValidationPipeline};
use sdgverify::preprocess::PreprocessError;
use sdgverify::scoring::{
    MockActivityScorer, MockAuthenticityScorer, MockClassScorer, ScoringError,
};
use sdgverify::service::{ServicePipeline, VerificationService};
use sdgverify::upload::UploadPolicy;

const BOUNDARY: &str = "sdg-verify-test-boundary";

enum Part<'a> {
    File {
        filename: &'a str,
        content_type: Option<&'a str>,
        data: Vec<u8>,
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn png_part(filename: &str) -> Part<'_> {
    Part::File {
        filename,
        content_type: Some("image/png"),
        data: solid_png(8, 8, [34, 139, 34]),
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
                    )
                    .as_bytes(),
                );
                if let Some(ct) = content_type {
                    body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
                }
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, headers, json)
}

fn candidate_service(
    authenticity: &MockAuthenticityScorer,
    activity: &MockActivityScorer,
    policy: UploadPolicy,
) -> VerificationService {
    let pipeline =
        ValidationPipeline::new(Arc::new(authenticity.clone()), Arc::new(activity.clone()));
    VerificationService::from_parts(ServicePipeline::CandidateLabels(pipeline), policy)
}

fn candidate_router(
    authenticity: &MockAuthenticityScorer,
    activity: &MockActivityScorer,
) -> Router {
    let service = candidate_service(authenticity, activity, UploadPolicy::standard());
    create_router_with_state(HandlerState::with_service(service).unwrap())
}

fn fixed_router(pipeline: ClassificationPipeline) -> Router {
    let service = VerificationService::from_parts(
        ServicePipeline::FixedClass(pipeline),
        UploadPolicy::standard(),
    );
    create_router_with_state(HandlerState::with_service(service).unwrap())
}

fn not_ready_router(mode: PipelineMode) -> Router {
    create_router_with_state(HandlerState::new(
        Arc::new(ServiceLifecycle::new()),
        mode,
        UploadPolicy::standard(),
    ))
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_before_ready() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, _, json) = send(not_ready_router(PipelineMode::CandidateLabels), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service_ready"], false);
    }

    #[tokio::test]
    async fn test_health_when_ready() {
        let router = candidate_router(
            &MockAuthenticityScorer::real(0.9),
            &MockActivityScorer::fixed("planting trees", 0.9),
        );
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (_, _, json) = send(router, request).await;

        assert_eq!(json["service_ready"], true);
    }

    #[tokio::test]
    async fn test_requests_after_teardown_are_503() {
        let service = candidate_service(
            &MockAuthenticityScorer::real(0.9),
            &MockActivityScorer::fixed("x", 0.9),
            UploadPolicy::standard(),
        );
        let state = HandlerState::with_service(service).unwrap();
        state.lifecycle.teardown();
        let router = create_router_with_state(state);

        let (status, _, json) = send(
            router,
            multipart_request("/analyze-image", &[png_part("a.png")]),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], 503);
    }
}

mod analyze {
    use super::*;

    #[tokio::test]
    async fn test_not_ready_returns_503() {
        let (status, _, json) = send(
            not_ready_router(PipelineMode::CandidateLabels),
            multipart_request("/analyze-image", &[png_part("tree.png")]),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], 503);
    }

    #[tokio::test]
    async fn test_fake_image_rejected_without_activity_scoring() {
        let authenticity = MockAuthenticityScorer::fake(0.9912);
        let activity = MockActivityScorer::fixed("planting trees", 0.99);

        let (status, headers, json) = send(
            candidate_router(&authenticity, &activity),
            multipart_request("/analyze-image", &[png_part("tree.png")]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers.contains_key(REQUEST_ID_HEADER));
        assert_eq!(json["valid"], false);
        assert_eq!(json["message"], "Image is AI generated");
        assert!(json["sdg_label"].is_null());
        assert!(json["sdg_score"].is_null());
        assert_eq!(activity.calls(), 0);
    }

    #[tokio::test]
    async fn test_accepted_with_default_labels() {
        let authenticity = MockAuthenticityScorer::real(0.97);
        let activity = MockActivityScorer::fixed("planting trees", 0.81);

        let (status, _, json) = send(
            candidate_router(&authenticity, &activity),
            multipart_request("/analyze-image", &[png_part("tree.jpg")]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["valid"], true);
        assert_eq!(json["message"], "Valid SDG activity detected: planting trees");
        assert_eq!(json["sdg_label"], "planting trees");
        assert_eq!(
            activity.last_labels().unwrap().len(),
            sdgverify::DEFAULT_SDG_LABELS.len()
        );
    }

    #[tokio::test]
    async fn test_low_score_rejected_with_label() {
        let authenticity = MockAuthenticityScorer::real(0.97);
        let activity = MockActivityScorer::fixed("coastal cleanup", 0.12);

        let (_, _, json) = send(
            candidate_router(&authenticity, &activity),
            multipart_request("/analyze-image", &[png_part("car.png")]),
        )
        .await;

        assert_eq!(json["valid"], false);
        assert_eq!(json["message"], "No significant SDG activity detected");
        assert_eq!(json["sdg_label"], "coastal cleanup");
        assert!(json["sdg_score"].as_f64().unwrap() < 0.3);
    }

    #[tokio::test]
    async fn test_labels_and_threshold_fields() {
        let authenticity = MockAuthenticityScorer::real(0.97);
        let activity = MockActivityScorer::from_logits(vec![0.0, 2.0]);

        let (status, _, json) = send(
            candidate_router(&authenticity, &activity),
            multipart_request(
                "/analyze-image",
                &[
                    png_part("x.png"),
                    Part::Text {
                        name: "labels",
                        value: "feeding program, blood donation",
                    },
                    Part::Text {
                        name: "min_sdg_score",
                        value: "0.95",
                    },
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sdg_label"], "blood donation");
        assert_eq!(json["valid"], false);
        assert_eq!(
            activity.last_labels().unwrap().labels(),
            &["feeding program".to_string(), "blood donation".to_string()][..]
        );
    }

    #[tokio::test]
    async fn test_blank_labels_fall_back_to_preset() {
        let authenticity = MockAuthenticityScorer::real(0.97);
        let activity = MockActivityScorer::fixed("medical mission", 0.9);

        let (status, _, _) = send(
            candidate_router(&authenticity, &activity),
            multipart_request(
                "/analyze-image",
                &[
                    png_part("x.png"),
                    Part::Text {
                        name: "labels",
                        value: " , ",
                    },
                    Part::Text {
                        name: "preset",
                        value: "medical",
                    },
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            activity.last_labels().unwrap().labels()[0],
            "medical mission"
        );
    }

    #[tokio::test]
    async fn test_unknown_preset_is_400() {
        let activity = MockActivityScorer::fixed("x", 0.9);
        let (status, _, json) = send(
            candidate_router(&MockAuthenticityScorer::real(0.9), &activity),
            multipart_request(
                "/analyze-image",
                &[
                    png_part("x.png"),
                    Part::Text {
                        name: "preset",
                        value: "sports",
                    },
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], 400);
        assert_eq!(activity.calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_threshold_is_400() {
        for value in ["abc", "1.5", "-0.2"] {
            let authenticity = MockAuthenticityScorer::real(0.9);
            let (status, _, _) = send(
                candidate_router(&authenticity, &MockActivityScorer::fixed("x", 0.9)),
                multipart_request(
                    "/analyze-image",
                    &[
                        png_part("x.png"),
                        Part::Text {
                            name: "min_sdg_score",
                            value,
                        },
                    ],
                ),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{value}");
            assert_eq!(authenticity.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_400() {
        let (status, _, json) = send(
            candidate_router(
                &MockAuthenticityScorer::real(0.9),
                &MockActivityScorer::fixed("x", 0.9),
            ),
            multipart_request(
                "/analyze-image",
                &[Part::Text {
                    name: "labels",
                    value: "planting trees",
                }],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "no file part in the request");
    }

    #[tokio::test]
    async fn test_boundary_rejections_skip_models() {
        let cases = [
            Part::File {
                filename: "payload.exe",
                content_type: Some("image/png"),
                data: solid_png(4, 4, [0, 0, 0]),
            },
            Part::File {
                filename: "",
                content_type: Some("image/png"),
                data: solid_png(4, 4, [0, 0, 0]),
            },
            Part::File {
                filename: "notes.png",
                content_type: Some("text/plain"),
                data: b"hello".to_vec(),
            },
            Part::File {
                filename: "photo.png",
                content_type: None,
                data: solid_png(4, 4, [0, 0, 0]),
            },
        ];

        for part in cases {
            let authenticity = MockAuthenticityScorer::real(0.9);
            let activity = MockActivityScorer::fixed("x", 0.9);
            let (status, _, _) = send(
                candidate_router(&authenticity, &activity),
                multipart_request("/analyze-image", &[part]),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(authenticity.calls(), 0);
            assert_eq!(activity.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_oversized_upload_is_413() {
        let authenticity = MockAuthenticityScorer::real(0.9);
        let service = candidate_service(
            &authenticity,
            &MockActivityScorer::fixed("x", 0.9),
            UploadPolicy::new(512),
        );
        let router = create_router_with_state(HandlerState::with_service(service).unwrap());

        let part = Part::File {
            filename: "big.png",
            content_type: Some("image/png"),
            data: vec![0u8; 2048],
        };
        let (status, _, json) = send(router, multipart_request("/analyze-image", &[part])).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["code"], 413);
        assert_eq!(authenticity.calls(), 0);
    }

    #[tokio::test]
    async fn test_body_over_transport_limit_is_413() {
        let authenticity = MockAuthenticityScorer::real(0.9);
        let service = candidate_service(
            &authenticity,
            &MockActivityScorer::fixed("x", 0.9),
            UploadPolicy::new(512),
        );
        let router = create_router_with_state(HandlerState::with_service(service).unwrap());

        let part = Part::File {
            filename: "huge.png",
            content_type: Some("image/png"),
            data: vec![0u8; 256 * 1024],
        };
        let (status, _, _) = send(router, multipart_request("/analyze-image", &[part])).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(authenticity.calls(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_image_is_400() {
        let authenticity =
            MockAuthenticityScorer::from_fn(|_| Err(ScoringError::Decode(PreprocessError::UnknownFormat)));

        let (status, _, _) = send(
            candidate_router(&authenticity, &MockActivityScorer::fixed("x", 0.9)),
            multipart_request("/analyze-image", &[png_part("x.png")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_scoring_failure_hides_detail() {
        let authenticity = MockAuthenticityScorer::real(0.9);
        let activity = MockActivityScorer::failing("tensor shape [1, 77] secret detail");

        let (status, _, json) = send(
            candidate_router(&authenticity, &activity),
            multipart_request("/analyze-image", &[png_part("x.png")]),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], PROCESSING_ERROR_MESSAGE);
        assert!(!json.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_panicking_scorer_is_generic_500() {
        let activity = MockActivityScorer::from_fn(|_, _| panic!("scorer exploded"));

        let (status, _, json) = send(
            candidate_router(&MockAuthenticityScorer::real(0.9), &activity),
            multipart_request("/analyze-image", &[png_part("x.png")]),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], PROCESSING_ERROR_MESSAGE);
        assert!(!json.to_string().contains("exploded"));
        assert_eq!(activity.calls(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_scorer_is_503() {
        let (status, _, _) = send(
            candidate_router(
                &MockAuthenticityScorer::unavailable(),
                &MockActivityScorer::fixed("x", 0.9),
            ),
            multipart_request("/analyze-image", &[png_part("x.png")]),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_predict_not_mounted() {
        let (status, _, _) = send(
            candidate_router(
                &MockAuthenticityScorer::real(0.9),
                &MockActivityScorer::fixed("x", 0.9),
            ),
            multipart_request("/predict", &[png_part("x.png")]),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod predict {
    use super::*;

    const CLASSES: &[&str] = &["Non_SDG_Invalid", "SDG12_Recycling", "SDG15_Planting"];

    #[tokio::test]
    async fn test_verified_prediction() {
        let router = fixed_router(ClassificationPipeline::new(
            Arc::new(MockClassScorer::predicting(CLASSES, "SDG15_Planting", 0.91)),
            FixedClassPolicy::standard(),
        ));

        let (status, _, json) =
            send(router, multipart_request("/predict", &[png_part("tree.webp")])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["prediction"], "SDG15_Planting");
        assert_eq!(json["confidence"], "91.00%");
        assert_eq!(json["verdict"], "VALID MISSION (SDG 13/15)");
        assert_eq!(json["is_verified"], true);
        assert_eq!(json["sdg"], "SDG 13/15");
        assert!(json.get("source_check").is_none());
    }

    #[tokio::test]
    async fn test_uncertain_prediction_hides_label() {
        let router = fixed_router(ClassificationPipeline::new(
            Arc::new(MockClassScorer::predicting(&["planting", "trash"], "planting", 0.55)),
            FixedClassPolicy::legacy(),
        ));

        let (_, _, json) = send(router, multipart_request("/predict", &[png_part("a.png")])).await;

        assert_eq!(json["prediction"], "UNKNOWN");
        assert_eq!(json["confidence"], "55%");
        assert_eq!(json["verdict"], "UNCERTAIN - IMAGE UNCLEAR");
        assert_eq!(json["is_verified"], false);
    }

    #[tokio::test]
    async fn test_source_check_flags_ai_images() {
        let classifier = MockClassScorer::predicting(CLASSES, "SDG15_Planting", 0.99);
        let router = fixed_router(
            ClassificationPipeline::new(Arc::new(classifier.clone()), FixedClassPolicy::standard())
                .with_source_check(Arc::new(MockAuthenticityScorer::fake(0.97))),
        );

        let (_, _, json) = send(router, multipart_request("/predict", &[png_part("a.png")])).await;

        assert_eq!(json["verdict"], "REJECT - AI GENERATED");
        assert_eq!(json["source_check"], "AI_GENERATED");
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_extension_is_400() {
        let classifier = MockClassScorer::predicting(CLASSES, "SDG15_Planting", 0.99);
        let router = fixed_router(ClassificationPipeline::new(
            Arc::new(classifier.clone()),
            FixedClassPolicy::standard(),
        ));

        let part = Part::File {
            filename: "tree.gif",
            content_type: Some("image/gif"),
            data: vec![0u8; 16],
        };
        let (status, _, json) = send(router, multipart_request("/predict", &[part])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "unsupported file type: gif");
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_not_ready_returns_503() {
        let (status, _, _) = send(
            not_ready_router(PipelineMode::FixedClass),
            multipart_request("/predict", &[png_part("a.png")]),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_analyze_not_mounted() {
        let (status, _, _) = send(
            not_ready_router(PipelineMode::FixedClass),
            multipart_request("/analyze-image", &[png_part("a.png")]),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[test]
fn test_short_digest_is_stable() {
    let a = short_digest(b"same bytes");
    let b = short_digest(b"same bytes");
    assert_eq!(a, b);
    assert_eq!(a.len(), 16);
    assert_ne!(a, short_digest(b"other bytes"));
}

#[tokio::test]
async fn test_task_failure_maps_to_internal() {
    let join_err = tokio::task::spawn_blocking(|| {
        panic!("boom");
    })
    .await
    .unwrap_err();
    assert!(join_err.is_panic());

    let err = task_failure(uuid::Uuid::new_v4(), "analysis", join_err);
    assert!(matches!(err, GatewayError::Internal(_)));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
