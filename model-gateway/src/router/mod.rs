use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

pub mod compare;
pub mod demo;
pub mod error;
pub mod inference;

async fn healthz() -> Json<String> {
    Json("healthy".to_string())
}

/// Main router for the application, with all API and health endpoints attached
pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        //
        // Provider pass-through
        //
        .route("/inference", post(inference::run_inference))
        //
        // Metadata comparison and demo lookup
        //
        .route("/compare", post(compare::compare_models))
        .route("/demo", post(demo::fetch_demo_url))
        .layer(TraceLayer::new_for_http())
        //
        // Enable all of the CORS flags
        //
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{
        body::{Body, HttpBody},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::{Credentials, Endpoints, GatewayConfig},
        provider::Provider,
        upstream::{
            testing::{RecordingUpstream, Reply},
            UpstreamResponse,
        },
    };

    fn app(upstream: Arc<RecordingUpstream>) -> Router {
        let config = GatewayConfig {
            credentials: Credentials::default().with_key(Provider::HuggingFace, "hf_key"),
            endpoints: Endpoints::default(),
        };
        app_router().with_state(AppState::new(config, upstream))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        let mut body = response.into_body();
        let mut bytes = Vec::new();
        while let Some(chunk) = body.data().await {
            bytes.extend_from_slice(&chunk.unwrap());
        }
        bytes
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn healthz_responds() {
        let response = app(RecordingUpstream::new())
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!("healthy"));
    }

    #[tokio::test]
    async fn inference_returns_upstream_body() {
        let upstream = RecordingUpstream::new().reply_json(
            "https://api-inference.huggingface.co/models/test-model",
            json!({"result": "test result"}),
        );
        let response = app(upstream)
            .oneshot(post_json(
                "/inference",
                json!({"modelId": "test-model", "provider": "huggingface", "input": {"prompt": "test prompt"}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"result": "test result"}));
    }

    #[tokio::test]
    async fn inference_preserves_content_type() {
        let upstream = RecordingUpstream::new().reply(
            "https://api-inference.huggingface.co/models/org/image-model",
            Reply::Ok(UpstreamResponse {
                content_type: Some("image/png".to_owned()),
                body: bytes::Bytes::from_static(b"\x89PNG"),
            }),
        );
        let response = app(upstream)
            .oneshot(post_json(
                "/inference",
                json!({"modelId": "org/image-model", "provider": "huggingface", "input": {"inputs": "cat"}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(body_bytes(response).await, b"\x89PNG".to_vec());
    }

    #[tokio::test]
    async fn inference_failures_are_500() {
        let upstream = RecordingUpstream::new().reply(
            "https://api-inference.huggingface.co/models/test-model",
            Reply::Status(502, "API Error".to_owned()),
        );
        let cases = [
            (
                json!({"modelId": "test-model", "provider": "huggingface", "input": {}}),
                "Request failed with status code 502: API Error",
            ),
            (
                json!({"modelId": "test-model", "provider": "unsupported", "input": {}}),
                "Unsupported provider: unsupported",
            ),
            (
                json!({"modelId": "gpt-4", "provider": "openai", "input": {}}),
                "OpenAI API key not configured (set OPENAI_API_KEY)",
            ),
        ];

        for (body, message) in cases {
            let response = app(upstream.clone())
                .oneshot(post_json("/inference", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body_json(response).await, json!({ "error": message }));
        }
    }

    #[tokio::test]
    async fn unreadable_inference_bodies_are_500() {
        let malformed = Request::builder()
            .method("POST")
            .uri("/inference")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let missing_input = post_json(
            "/inference",
            json!({"modelId": "m", "provider": "huggingface"}),
        );

        for request in [malformed, missing_input] {
            let upstream = RecordingUpstream::new();
            let response = app(upstream.clone()).oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert!(body_json(response).await.get("error").is_some());
            assert!(upstream.recorded().await.is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_compare_json_is_400() {
        let request = Request::builder()
            .method("POST")
            .uri("/compare")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(RecordingUpstream::new()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await.get("error").is_some());
    }

    #[tokio::test]
    async fn compare_success() {
        let response = app(RecordingUpstream::new())
            .oneshot(post_json(
                "/compare",
                json!({"models": ["gpt-4"], "metrics": ["modality", "cost", "capabilities"]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{
                "id": "gpt-4",
                "modality": "text",
                "cost": {"input": 0.03, "output": 0.06},
                "capabilities": {"text": true, "image": true, "audio": false, "video": false, "multimodal": true}
            }])
        );
    }

    #[tokio::test]
    async fn compare_keeps_rows_for_unusual_ids() {
        let response = app(RecordingUpstream::new())
            .oneshot(post_json(
                "/compare",
                json!({"models": ["gpt-4", "ft:gpt-3.5-turbo:my-org:custom:abc123"], "metrics": ["cost"]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([
                {"id": "gpt-4", "cost": {"input": 0.03, "output": 0.06}},
                {"id": "ft:gpt-3.5-turbo:my-org:custom:abc123", "cost": {"input": 0.0, "output": 0.0}}
            ])
        );
    }

    #[tokio::test]
    async fn compare_validation_is_400() {
        let cases = [
            (
                json!({"models": ["gpt-4"], "metrics": ["invalid-metric"]}),
                "Invalid metrics: invalid-metric",
            ),
            (
                json!({"models": [], "metrics": ["cost"]}),
                "models must be a non-empty array",
            ),
            (
                json!({"metrics": ["cost"]}),
                "models must be a non-empty array",
            ),
            (
                json!({"models": "gpt-4", "metrics": ["cost"]}),
                "models must be a non-empty array",
            ),
            (
                json!({"models": ["gpt-4"], "metrics": "cost"}),
                "metrics must be a non-empty array",
            ),
            (
                json!({"models": ["gpt-4"], "metrics": []}),
                "metrics must be a non-empty array",
            ),
        ];

        for (body, expected) in cases {
            let upstream = RecordingUpstream::new();
            let response = app(upstream.clone())
                .oneshot(post_json("/compare", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let error = body_json(response).await["error"]
                .as_str()
                .unwrap()
                .to_owned();
            assert!(error.contains(expected), "{} should contain {}", error, expected);
            assert!(upstream.recorded().await.is_empty());
        }
    }

    #[tokio::test]
    async fn demo_returns_url() {
        let upstream = RecordingUpstream::new().reply_json(
            "https://huggingface.co/api/models/test-model",
            json!({"spaces": []}),
        );
        let response = app(upstream.clone())
            .oneshot(post_json(
                "/demo",
                json!({"modelId": "test-model", "provider": "huggingface"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"demoUrl": "https://huggingface.co/test-model"})
        );

        let sent = upstream.recorded().await;
        assert_eq!(sent[0].header_value("Authorization"), Some("Bearer hf_key"));
    }

    #[tokio::test]
    async fn demo_validation_is_400() {
        let cases = [
            (json!({"provider": "huggingface"}), "Model ID is required"),
            (json!({"modelId": "", "provider": "huggingface"}), "Model ID is required"),
            (json!({"modelId": "test-model"}), "Provider is required"),
            (
                json!({"modelId": "test-model", "provider": "unsupported-provider"}),
                "Invalid provider: unsupported-provider. Valid providers are: huggingface, replicate, stability, openai, claude, gemini",
            ),
        ];

        for (body, expected) in cases {
            let response = app(RecordingUpstream::new())
                .oneshot(post_json("/demo", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(response).await, json!({ "error": expected }));
        }
    }
}
