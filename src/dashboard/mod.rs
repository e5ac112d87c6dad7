//! Dashboard — Axum web server for read-only monitoring.
//!
//! Serves the session state as a JSON REST API. Strictly read-only: every
//! route is a GET and nothing here mutates the ledger or the history.
//! CORS enabled for local development.

pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use routes::AppState;

/// Start the dashboard web server.
///
/// This spawns a background task — it doesn't block.
pub fn spawn_dashboard(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);

    tokio::spawn(async move {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        info!(port, "Dashboard server starting on http://localhost:{port}");

        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(port, error = %e, "Failed to bind dashboard port");
                return;
            }
        };

        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Dashboard server error");
        }
    });

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().expect("static origin"))
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/status", get(routes::get_status))
        .route("/api/analytics", get(routes::get_analytics))
        .route("/api/active-bets", get(routes::get_active_bets))
        .route("/api/history", get(routes::get_history))
        .route("/api/picks", get(routes::get_picks))
        .route("/api/export", get(routes::get_export))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::storage::MemoryStore;
    use crate::types::{Game, PickOutcome, Prediction};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use routes::DashboardState;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let mut session = Session::open(Arc::new(MemoryStore::new())).unwrap();
        session
            .place_bet(Game::new("Lakers", "Clippers"), dec!(2), -110)
            .unwrap();
        session
            .grade_pick(&Prediction::sample(), PickOutcome::Win)
            .unwrap();
        Arc::new(DashboardState::new(session))
    }

    async fn get_json(uri: &str) -> serde_json::Value {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let json = get_json("/api/status").await;
        assert_eq!(json["current_bankroll"].as_f64().unwrap(), 1000.0);
        assert_eq!(json["active_bets"].as_u64().unwrap(), 1);
        assert_eq!(json["graded_picks"].as_u64().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_analytics_endpoint() {
        let json = get_json("/api/analytics").await;
        assert_eq!(json["graded"].as_u64().unwrap(), 1);
        assert!(json["accuracy"].as_f64().unwrap() > 0.99);
    }

    #[tokio::test]
    async fn test_active_bets_endpoint() {
        let json = get_json("/api/active-bets").await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_endpoint() {
        let json = get_json("/api/history").await;
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_picks_endpoint() {
        let json = get_json("/api/picks").await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["result"].as_str().unwrap(), "W");
    }

    #[tokio::test]
    async fn test_export_endpoint() {
        let json = get_json("/api/export").await;
        assert!(json.get("bettingHistory").is_some());
        assert!(json.get("exportDate").is_some());
    }

    #[tokio::test]
    async fn test_unknown_route_404() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
