//! HTTP API surface
//!
//! Route table:
//!
//! | Method | Path | Auth | Purpose |
//! |--------|------|------|---------|
//! | GET | /health | public | liveness probe |
//! | POST | /orders | api key | order intake |
//! | GET | /orders | api key | recent orders, newest first |
//! | GET | /orders/{id} | api key | full order record |
//! | GET | /order-status | api key | compact polling summary |
//! | POST | /tg-webhook | public | inbound bot updates |

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub mod auth;
pub mod health;
pub mod orders;
pub mod webhook;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Order API - api key required
        .route("/orders", post(orders::create).get(orders::list))
        .route("/orders/{id}", get(orders::get_by_id))
        .route("/order-status", get(orders::status))
        // Bot webhook - public route, authenticated by URL secrecy
        .route("/tg-webhook", post(webhook::webhook))
        // Health API - public route
        .route("/health", get(health::health))
}

/// Build a fully configured application with all middleware
///
/// Used by both the HTTP server and the oneshot tests
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - the storefront calls from the browser
        .layer(CorsLayer::permissive())
        // Trace - request logging at INFO level
        .layer(TraceLayer::new_for_http())
        // ========== Application Middleware ==========
        // Shared-secret check - outermost, executed first
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, config};
    use crate::notify::{NotifyChannel, RecordingChannel};
    use crate::orders::storage::OrderStorage;
    use axum::body::Body;
    use http::{Request, StatusCode, header};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const API_KEY: &str = "test-key";

    fn test_config() -> Config {
        Config {
            work_dir: ".".into(),
            http_port: 0,
            environment: "development".into(),
            api_key: API_KEY.into(),
            bot_token: "token".into(),
            admin_chat_id: 1,
            courier_chat_id: 2,
            store_chats: config::parse_store_chats(r#"{"pizzeria": -100200}"#).unwrap(),
            district_fees: config::parse_district_fees(r#"{"Kentron": 400}"#).unwrap(),
            catalog: config::parse_catalog(r#"{"pizzeria": {"Pizza": 1000, "Cola": 300}}"#)
                .unwrap(),
        }
    }

    fn test_app() -> (Router, Arc<RecordingChannel>) {
        let channel = Arc::new(RecordingChannel::default());
        let state = ServerState::with_channel(
            test_config(),
            OrderStorage::open_in_memory().unwrap(),
            channel.clone() as Arc<dyn NotifyChannel>,
        );
        let app = build_app(&state).with_state(state);
        (app, channel)
    }

    fn authed(builder: http::request::Builder) -> http::request::Builder {
        builder.header("x-api-key", API_KEY)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn submission_body() -> String {
        serde_json::json!({
            "name": "Ani",
            "phone": "+37491000000",
            "address": "1 Main St",
            "district": "Kentron",
            "payment": "cash",
            "carts": {"pizzeria": {"Pizza": 2}}
        })
        .to_string()
    }

    async fn post_order(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(
                authed(Request::post("/orders"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(submission_body()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["ok"], Value::Bool(true));
        json["id"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["environment"], "development");
    }

    #[tokio::test]
    async fn test_orders_require_api_key() {
        let (app, _) = test_app();

        let response = app
            .clone()
            .oneshot(Request::get("/orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::get("/orders")
                    .header("x-api-key", "wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_preflight_skips_auth() {
        let (app, _) = test_app();
        let response = app
            .oneshot(
                Request::options("/orders")
                    .header(header::ORIGIN, "https://storefront.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_order_persists_and_returns_id() {
        let (app, _) = test_app();
        let id = post_order(&app).await;
        assert!(!id.is_empty());

        let response = app
            .oneshot(
                authed(Request::get(format!("/orders/{id}")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["order"]["id"], Value::String(id));
        assert_eq!(json["order"]["status"], "NEW");
        // 2 x 1000 + 400 delivery
        assert_eq!(json["order"]["totals"]["grand_total"], "2400");
    }

    #[tokio::test]
    async fn test_list_returns_created_orders_newest_first() {
        let (app, _) = test_app();
        let first = post_order(&app).await;
        let second = post_order(&app).await;

        let response = app
            .oneshot(authed(Request::get("/orders")).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let orders = json["orders"].as_array().unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0]["id"], Value::String(second));
        assert_eq!(orders[1]["id"], Value::String(first));
    }

    #[tokio::test]
    async fn test_status_summary_for_polling() {
        let (app, _) = test_app();
        let id = post_order(&app).await;

        let response = app
            .oneshot(
                authed(Request::get(format!("/order-status?id={id}")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["id"], Value::String(id));
        assert_eq!(json["status"], "NEW");
        assert!(json["updated_at"].as_i64().unwrap() > 0);
        assert!(json.get("order").is_none());
    }

    #[tokio::test]
    async fn test_unknown_order_is_404() {
        let (app, _) = test_app();
        let response = app
            .oneshot(
                authed(Request::get("/order-status?id=missing"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["ok"], Value::Bool(false));
        assert!(json["error"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn test_invalid_submission_is_rejected() {
        let (app, _) = test_app();
        let response = app
            .oneshot(
                authed(Request::post("/orders"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name": "Ani"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_webhook_answers_200_on_garbage() {
        let (app, _) = test_app();
        let response = app
            .oneshot(
                Request::post("/tg-webhook")
                    .body(Body::from("not json at all"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
