#![cfg(feature = "e2e")]

use docqc_e2e::TestServer;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_endpoints_respond() {
    let server = TestServer::start().await.unwrap();

    let (status, body) = server.get("/api/v1/health").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = server.get("/api/v1/confidence/health").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["system_operational"], true);

    server.stop().await;
}

#[tokio::test]
async fn submit_then_review_then_resolve() {
    let server = TestServer::start().await.unwrap();

    let decision = server.submit("doc-0055", 0.55, false).await.unwrap();
    assert_eq!(decision["path"], "ENHANCED_REVIEW");
    assert_eq!(decision["band"], "LOW");
    assert_eq!(decision["requires_review"], true);

    let (_, queue) = server
        .get("/api/v1/confidence/review-queue?limit=10")
        .await
        .unwrap();
    assert_eq!(queue["total_count"], 1);
    assert_eq!(queue["pending_high"], 1);
    assert_eq!(queue["items"][0]["document_id"], "doc-0055");
    assert_eq!(queue["items"][0]["priority"], "HIGH");

    let (status, body) = server
        .post(
            "/api/v1/confidence/review-queue/doc-0055/resolve",
            &json!({"resolution": "fields corrected"}),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, queue) = server.get("/api/v1/confidence/review-queue").await.unwrap();
    assert_eq!(queue["total_count"], 0);

    let (_, stats) = server.get("/api/v1/confidence/stats").await.unwrap();
    assert_eq!(stats["quality_metrics"]["low_confidence_count"], 1);
    assert_eq!(stats["cache_stats"]["active_items"], 1);

    server.stop().await;
}

#[tokio::test]
async fn invalid_score_is_rejected_without_side_effects() {
    let server = TestServer::start().await.unwrap();

    let (status, body) = server
        .post(
            "/api/v1/confidence/submit",
            &json!({"document_id": "bad", "confidence_score": -0.1}),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_SCORE");

    let (_, summary) = server
        .get("/api/v1/confidence/metrics/summary")
        .await
        .unwrap();
    assert_eq!(summary["total_documents"], 0);

    server.stop().await;
}

#[tokio::test]
async fn alerts_follow_fixed_order() {
    let mut config = docqc_runtime::config::Config::default();
    config.alerts.high_review_volume_threshold = 3;
    let server = TestServer::start_with_config(config).await.unwrap();

    server.submit("critical", 0.4, true).await.unwrap();
    for i in 0..4 {
        server
            .submit(&format!("review-{}", i), 0.7, false)
            .await
            .unwrap();
    }

    let (status, body) = server.get("/api/v1/confidence/alerts").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alert_count"], 2);
    assert_eq!(body["alerts"][0]["type"], "safety_critical_low_confidence");
    assert_eq!(body["alerts"][1]["type"], "high_review_volume");

    server.stop().await;
}
