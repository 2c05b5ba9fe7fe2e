use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use larder_api::{
    config::AppConfig,
    db,
    entities::location::LocationKind,
    events::{self, EventSender},
    handlers::AppServices,
    services::{importer::ExternalCatalogClient, locations::CreateLocationInput},
    AppState,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Test harness backed by a fresh in-memory SQLite database. The pool is
/// pinned to a single connection so the schema survives across queries.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_catalog_client(None).await
    }

    /// Construct a test application, optionally wired to an external
    /// catalog client (tests point it at a mock server).
    pub async fn with_catalog_client(client: Option<ExternalCatalogClient>) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(
            db_arc.clone(),
            event_sender.clone(),
            client,
            cfg.import_unit(),
        );

        let state = AppState {
            db: db_arc,
            config: cfg.clone(),
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", larder_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Registers a location and returns its id.
    #[allow(dead_code)]
    pub async fn create_location(&self, code: &str, kind: LocationKind) -> Uuid {
        let created = self
            .state
            .services
            .locations
            .create(CreateLocationInput {
                code: code.to_string(),
                name: format!("{} test site", code),
                kind,
            })
            .await
            .expect("failed to create test location");
        created.id
    }

    /// Send a JSON request against the router.
    #[allow(dead_code)]
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

/// Reads a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not valid json")
}
