use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use launchpad_api::app::build_router;
use launchpad_api::config::ServerConfig;
use launchpad_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        bind: "127.0.0.1:0".to_string(),
        workers: 1,
        timeout: Some(30),
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
    }
}

/// Build the full application router using the given database pool,
/// with the same middleware stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_timeout(pool, Some(Duration::from_secs(30)))
}

/// Build the router with an explicit request timeout (`None` disables it).
pub fn build_test_app_with_timeout(pool: PgPool, request_timeout: Option<Duration>) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
    };
    build_router(state, request_timeout)
}

/// A single-connection pool against the same test database as `pool`.
///
/// Holding the returned pool's only connection makes every handler that
/// touches the database wait on acquire.
pub async fn single_connection_pool(pool: &PgPool) -> PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with((*pool.connect_options()).clone())
        .await
        .unwrap()
}

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
