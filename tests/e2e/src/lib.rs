//! Helpers for end-to-end tests: boot a real API server on an ephemeral port
//! and talk to it over HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use docqc_runtime::api::{HttpApiConfig, HttpApiServer};
use docqc_runtime::config::Config;
use docqc_runtime::QualityEngine;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A running API server backed by its own engine.
pub struct TestServer {
    pub base_url: String,
    pub engine: Arc<QualityEngine>,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with_config(Config::default()).await
    }

    pub async fn start_with_config(config: Config) -> Result<Self> {
        config.validate().context("invalid test config")?;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind ephemeral port")?;
        let addr = listener.local_addr()?;

        let engine = Arc::new(QualityEngine::new(&config));
        let server = HttpApiServer::new(HttpApiConfig::from(&config.api), engine.clone());
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let signal = async {
                let _ = rx.await;
            };
            if let Err(e) = server.serve(listener, signal).await {
                tracing::error!("test server failed: {}", e);
            }
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            engine,
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    /// Submit a document through the HTTP API.
    pub async fn submit(&self, id: &str, score: f64, safety_critical: bool) -> Result<Value> {
        let (status, body) = self
            .post(
                "/api/v1/confidence/submit",
                &serde_json::json!({
                    "document_id": id,
                    "confidence_score": score,
                    "is_safety_critical": safety_critical,
                }),
            )
            .await?;
        anyhow::ensure!(status.is_success(), "submit {} failed: {} {}", id, status, body);
        Ok(body)
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
