//! API integration tests over the in-memory router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use lclip_api::{create_router, ApiConfig, AppState, OllamaClient};
use lclip_pipeline::{
    Collaborators, JobRegistry, Pipeline, PipelineConfig, StatusStore, WorkQueue, WorkerPool,
};

/// State with real collaborator wiring but nothing running against it;
/// tests only exercise endpoints that never reach the external tools.
async fn test_state(root: &std::path::Path) -> AppState {
    let config = ApiConfig::default();
    let pipeline_config = PipelineConfig {
        worker_count: 1,
        source_dir: root.join("source"),
        work_dir: root.join("work"),
        outputs_dir: root.join("outputs"),
        default_max_clips: 15,
        whisper_model: None,
    };
    pipeline_config.ensure_dirs().await.unwrap();

    let registry = Arc::new(JobRegistry::new());
    let queue = WorkQueue::new();
    let collaborators = Collaborators::production(&pipeline_config);
    let pipeline = Arc::new(Pipeline::new(
        pipeline_config.clone(),
        Arc::clone(&registry),
        collaborators,
    ));
    let pool = WorkerPool::spawn(1, queue.clone(), Arc::clone(&pipeline));
    let worker_health = pool.health();
    drop(pool);

    AppState {
        status_store: StatusStore::new(&pipeline_config.work_dir),
        ollama: OllamaClient::new(&config),
        config,
        pipeline_config,
        registry,
        queue,
        pipeline,
        worker_health,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn health_reports_workers() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()).await);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["workers_alive"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn presets_lists_builtin_styles() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()).await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/presets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let presets = json.as_array().unwrap();
    assert_eq!(presets[0]["name"], "clean");
    assert!(presets.iter().any(|p| p["name"] == "mrbeast"));
}

#[tokio::test]
async fn unknown_job_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()).await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/job/no-such-job")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn from_url_rejects_non_http_source() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()).await);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/job/from_url")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"url": "file:///etc/passwd"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn from_url_enqueues_and_status_is_queryable() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path()).await;
    let app = create_router(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/job/from_url")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"url": "https://example.com/v", "max_clips": 3, "style_preset": "karaoke"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let job_id = json["job_id"].as_str().unwrap().to_string();
    assert!(!job_id.is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/job/{job_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    // The worker may already have picked the job up (and failed on the
    // missing tool); either way the record exists with a valid state.
    let status = json["status"].as_str().unwrap();
    assert!(["queued", "processing", "error"].contains(&status));
    assert!(json["steps"].is_array());
}

#[tokio::test]
async fn highlights_for_unknown_job_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()).await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/job/no-such-job/highlights")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cached_highlights_returned_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path()).await;
    let app = create_router(state.clone());

    // Pre-seed a highlights cache for a job the registry has never seen;
    // retrieval serves the artifact as-is.
    let job_dir = state.pipeline_config.job_dir("cached-job");
    std::fs::create_dir_all(&job_dir).unwrap();
    std::fs::write(
        job_dir.join("highlights.json"),
        r#"[{"id":"seg_1","start":0.0,"end":30.0,"rms":0.0,"flux":0.0,"zcr":0.0,"kw_count":0,"rake_count":0,"score":1.5,"extra":"kept"}]"#,
    )
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/job/cached-job/highlights")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json[0]["id"], "seg_1");
    // Unknown fields survive because the cache is returned untouched.
    assert_eq!(json[0]["extra"], "kept");
}

#[tokio::test]
async fn render_unknown_job_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()).await);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/job/no-such-job/render")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"segments": [{"id": "seg_1", "start": 0.0, "end": 30.0}]}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn result_for_job_without_outputs_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()).await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/job/whatever/result")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["outputs"].as_array().unwrap().len(), 0);
}
