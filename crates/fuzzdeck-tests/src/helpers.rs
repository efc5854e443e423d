//! Test helper functions and utilities.

use fuzzdeck_client::{ClientConfig, HttpFleetClient};
use fuzzdeck_console::Console;
use fuzzdeck_notify::{ScriptedConfirmer, ToastQueue};
use serde_json::Value;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock orchestrator plus the collaborators a console is built from.
pub struct TestBackend {
    pub server: MockServer,
    pub toasts: Arc<ToastQueue>,
    pub confirmer: Arc<ScriptedConfirmer>,
}

impl TestBackend {
    pub async fn start() -> Self {
        Self::with_confirmer(ScriptedConfirmer::accepting()).await
    }

    pub async fn with_confirmer(confirmer: ScriptedConfirmer) -> Self {
        crate::init_test_logging();
        Self {
            server: MockServer::start().await,
            toasts: Arc::new(ToastQueue::default()),
            confirmer: Arc::new(confirmer),
        }
    }

    pub fn client(&self) -> HttpFleetClient {
        HttpFleetClient::new(&ClientConfig::new(self.server.uri()))
            .expect("Failed to create client")
    }

    pub fn console(&self) -> Console {
        Console::new(
            Arc::new(self.client()),
            self.toasts.clone(),
            self.confirmer.clone(),
        )
    }

    /// Answer `GET {route}` with a JSON body.
    pub async fn get_json(&self, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer `method {route}` with a status and text body.
    pub async fn respond(&self, verb: &str, route: &str, status: u16, body: &str) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    pub async fn agents(&self, body: Value) {
        self.get_json("/api/agents", body).await;
    }

    /// Answer a metric query posted to `route`.
    pub async fn metrics(&self, route: &str, query: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path(route))
            .and(body_json(serde_json::json!({ "query": query })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Requests received for `route`.
    pub async fn requests_to(&self, route: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == route)
            .collect()
    }
}
