//! Router-level tests for the REST API

#[cfg(test)]
mod tests {
    use crate::api::{build_router, ServerState};
    use crate::config::{EditorConfig, FundboardConfig, TokenGrant};
    use crate::extraction::{DocumentTextExtractor, ExtractionPipeline};
    use crate::testing::{InMemoryProfileStore, ScriptedGenerator, ScriptedPage, ScriptedPdfBackend};
    use crate::types::ProfileStore;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const DECK: &str = "Startup Name: Acme Robotics\nIndustries: AI\nRandomNoise\nFunding Stage: Seed";

    struct Harness {
        router: Router,
        store: Arc<InMemoryProfileStore>,
    }

    fn test_config() -> FundboardConfig {
        FundboardConfig {
            editor: EditorConfig {
                autosave_debounce: Duration::from_secs(60),
                persist_after_extraction: true,
            },
            ..FundboardConfig::default()
        }
    }

    fn harness_with(config: FundboardConfig, replies: Vec<&str>, extractor_ready: bool) -> Harness {
        let store = Arc::new(InMemoryProfileStore::new());
        let generator = Arc::new(ScriptedGenerator::new(
            replies.into_iter().map(str::to_string).collect(),
        ));
        let extractor = if extractor_ready {
            DocumentTextExtractor::with_backend(Arc::new(ScriptedPdfBackend::new(vec![
                ScriptedPage::text(&[DECK]),
            ])))
        } else {
            DocumentTextExtractor::new()
        };
        let pipeline = ExtractionPipeline::new(Arc::new(extractor), generator.clone());
        let state = ServerState::new(config, store.clone(), generator, pipeline);

        Harness {
            router: build_router(state),
            store,
        }
    }

    fn harness(replies: Vec<&str>) -> Harness {
        harness_with(test_config(), replies, true)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: Method, uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload(token: &str, content_type: &str, bytes: &'static [u8]) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/profile/draft/import")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, content_type)
            .header("x-file-name", "deck.pdf")
            .body(Body::from(bytes))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_needs_no_auth() {
        let h = harness(vec![]);
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&h.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["extractorReady"], true);
        assert_eq!(body["store"], "memory");
        assert_eq!(body["generator"], "scripted");
    }

    #[tokio::test]
    async fn test_missing_bearer_is_unauthorized() {
        let h = harness(vec![]);
        let request = Request::builder().uri("/profiles").body(Body::empty()).unwrap();
        let (status, body) = send(&h.router, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], 401);
    }

    #[tokio::test]
    async fn test_configured_tokens_map_to_users() {
        let config = FundboardConfig {
            api_tokens: vec![TokenGrant {
                token: "s3cret".to_string(),
                user_id: "founder-7".to_string(),
            }],
            ..test_config()
        };
        let h = harness_with(config, vec![], true);

        let (status, _) = send(&h.router, get("/profile/draft", "wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&h.router, get("/profile/draft", "s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["profile"]["userId"], "founder-7");
        assert_eq!(body["data"]["state"], "empty");
    }

    #[tokio::test]
    async fn test_opportunities_stage_filter() {
        let h = harness(vec![]);
        let (status, body) = send(&h.router, get("/opportunities?stage=seed", "alice")).await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "Green Energy Accelerator");

        let (_, body) = send(&h.router, get("/opportunities", "alice")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_import_fills_and_persists_draft() {
        let h = harness(vec![DECK]);
        let (status, body) = send(&h.router, upload("alice", "application/pdf", b"%PDF-1.7")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["recognizedFields"],
            json!(["name", "industries", "fundingStage"])
        );
        assert_eq!(body["data"]["draft"]["state"], "saved");
        assert_eq!(body["data"]["draft"]["profile"]["name"], "Acme Robotics");
        assert_eq!(h.store.write_count(), 1);

        let (_, body) = send(&h.router, get("/profiles", "alice")).await;
        let profiles = body["data"].as_array().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0]["fundingStage"], "Seed");
        assert_eq!(profiles[0]["userId"], "alice");
    }

    #[tokio::test]
    async fn test_import_rejects_non_pdf() {
        let h = harness(vec![DECK]);
        let (status, body) = send(&h.router, upload("alice", "image/png", b"\x89PNG")).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["success"], false);

        let (_, body) = send(&h.router, get("/profile/draft", "alice")).await;
        assert_eq!(body["data"]["state"], "empty");
        assert!(body["data"]["lastError"].as_str().unwrap().contains("image/png"));
    }

    #[tokio::test]
    async fn test_import_before_extractor_ready() {
        let h = harness_with(test_config(), vec![DECK], false);
        let (status, _) = send(&h.router, upload("alice", "application/pdf", b"%PDF")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_import_generator_failure_writes_nothing() {
        // no scripted reply left, so the generator errors out
        let h = harness(vec![]);
        let (status, _) = send(&h.router, upload("alice", "application/pdf", b"%PDF")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(h.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_over_body_limit() {
        let config = FundboardConfig {
            max_upload_bytes: 8,
            ..test_config()
        };
        let h = harness_with(config, vec![DECK], true);
        let (status, _) = send(
            &h.router,
            upload("alice", "application/pdf", b"%PDF-1.7 this is longer than eight bytes"),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_edit_then_save() {
        let h = harness(vec![]);

        let (status, body) = send(
            &h.router,
            json_request(
                Method::PATCH,
                "/profile/draft",
                "bob",
                json!({"field": "techStack", "value": "Rust, Postgres"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["state"], "dirty");
        assert_eq!(body["data"]["profile"]["techStack"], "Rust, Postgres");

        let (status, body) = send(
            &h.router,
            json_request(Method::POST, "/profile/save", "bob", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["state"], "saved");
        assert!(body["data"]["profile"]["id"].is_string());

        let stored = h.store.list_by_owner("bob").await.unwrap();
        assert_eq!(stored[0].tech_stack.as_deref(), Some("Rust, Postgres"));
    }

    #[tokio::test]
    async fn test_reload_restores_saved_values() {
        let h = harness(vec![]);
        let edit = |value: &str| {
            json_request(
                Method::PATCH,
                "/profile/draft",
                "dana",
                json!({"field": "location", "value": value}),
            )
        };

        send(&h.router, edit("Berlin")).await;
        send(&h.router, json_request(Method::POST, "/profile/save", "dana", json!({}))).await;
        send(&h.router, edit("Paris")).await;

        let (status, body) = send(
            &h.router,
            json_request(Method::POST, "/profile/draft/reload", "dana", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["state"], "saved");
        assert_eq!(body["data"]["profile"]["location"], "Berlin");
        assert_eq!(h.store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_field_is_rejected() {
        let h = harness(vec![]);
        let (status, _) = send(
            &h.router,
            json_request(
                Method::PATCH,
                "/profile/draft",
                "bob",
                json!({"field": "ceo", "value": "Jane"}),
            ),
        )
        .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let h = harness(vec!["**Angels** are a good start."]);

        let (status, body) = send(&h.router, get("/chat/greeting", "carol")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["message"]["content"],
            "Hello! How can I assist you with startup funding today?"
        );

        let (status, body) = send(
            &h.router,
            json_request(
                Method::POST,
                "/chat",
                "carol",
                json!({"messages": [{"role": "user", "content": "Who funds pre-seed?"}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"]["role"], "assistant");
        assert_eq!(body["data"]["message"]["content"], "Angels are a good start.");
    }

    #[tokio::test]
    async fn test_chat_without_user_message_is_bad_request() {
        let h = harness(vec![]);
        let (status, body) = send(
            &h.router,
            json_request(Method::POST, "/chat", "carol", json!({"messages": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
    }
}
