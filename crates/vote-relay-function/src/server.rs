//! HTTP trigger endpoint.
//!
//! The store delivers vote events as HTTP POSTs whose body is the created
//! vote document. Every request runs one invocation and answers with the
//! response contract.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use vote_relay_publisher::Publisher;
use vote_relay_store::VoteStore;

use crate::controller::InvocationController;

/// Header naming the event that fired the trigger.
pub const EVENT_HEADER: &str = "x-appwrite-event";

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Create the trigger router.
pub fn create_router<S, P>(controller: Arc<InvocationController<S, P>>) -> Router
where
    S: VoteStore + 'static,
    P: Publisher + 'static,
{
    Router::new()
        .route("/", post(invoke::<S, P>))
        .route("/v1/invocations", post(invoke::<S, P>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(controller)
}

async fn invoke<S, P>(
    State(controller): State<Arc<InvocationController<S, P>>>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse
where
    S: VoteStore + 'static,
    P: Publisher + 'static,
{
    if let Some(event) = headers.get(EVENT_HEADER).and_then(|v| v.to_str().ok()) {
        tracing::debug!(event, "Trigger event received");
    }

    let (status, response) = controller.handle(Some(&body)).await;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use axum_test::TestServer;
    use vote_relay_core::{TargetId, VoteType};
    use vote_relay_publisher::RecordingPublisher;
    use vote_relay_store::MemoryVoteStore;

    use super::*;
    use crate::config::{env, RelaySettings};
    use crate::response::InvocationResponse;

    const POST42: &str =
        r#"{"$id":"vote-9","targetId":"post42","targetType":"post","userId":"u7"}"#;

    fn server() -> (TestServer, Arc<MemoryVoteStore>, Arc<RecordingPublisher>) {
        let settings = RelaySettings::from_lookup(|name| {
            let value = match name {
                env::STORE_ENDPOINT => "https://cloud.example.com/v1",
                env::STORE_PROJECT_ID => "forum",
                env::STORE_API_KEY => "store-secret",
                env::DATABASE_ID => "main",
                env::VOTES_COLLECTION_ID => "votes",
                env::GATEWAY_URL => "wss://gw.example.com/v0/events",
                env::GATEWAY_ACCESS_KEY => "gw-secret",
                _ => return None,
            };
            Some(value.to_string())
        });

        let store = Arc::new(MemoryVoteStore::new());
        let target = TargetId::new("post42").unwrap();
        store.insert_votes(&target, VoteType::Up, 3);
        store.insert_votes(&target, VoteType::Down, 1);

        let publisher = Arc::new(RecordingPublisher::new());
        let controller = Arc::new(InvocationController::new(
            settings,
            Arc::clone(&store),
            Arc::clone(&publisher),
        ));

        let server = TestServer::new(create_router(controller)).unwrap();
        (server, store, publisher)
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (server, _store, _publisher) = server();

        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn trigger_publishes() {
        let (server, _store, publisher) = server();

        let response = server
            .post("/")
            .add_header(
                axum::http::HeaderName::from_static(EVENT_HEADER),
                HeaderValue::from_static("databases.main.collections.votes.documents.vote-9.create"),
            )
            .text(POST42)
            .await;

        response.assert_status_ok();
        let body: InvocationResponse = response.json();
        assert!(body.success);
        assert_eq!(publisher.attempts(), 1);
    }

    #[tokio::test]
    async fn versioned_route_is_equivalent() {
        let (server, _store, publisher) = server();

        let response = server.post("/v1/invocations").text(POST42).await;

        response.assert_status_ok();
        assert_eq!(publisher.attempts(), 1);
    }

    #[tokio::test]
    async fn empty_body_is_bad_request() {
        let (server, store, publisher) = server();

        let response = server.post("/").text("").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: InvocationResponse = response.json();
        assert!(!body.success);
        assert!(body.message.is_none());
        assert!(body.error.unwrap().starts_with("PayloadParseError"));
        assert_eq!(store.call_count(), 0);
        assert_eq!(publisher.attempts(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_server_error() {
        let (server, store, publisher) = server();
        store.fail_on(vote_relay_store::Query::equal("voteType", "down"));

        let response = server.post("/").text(POST42).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: InvocationResponse = response.json();
        assert!(body.error.unwrap().starts_with("AggregationError"));
        assert_eq!(publisher.attempts(), 0);
    }
}
