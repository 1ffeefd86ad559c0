use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{guard_middleware, session_middleware};
use crate::pages::page_routes;
use crate::state::AppState;

/// Multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Full router. The session layer is outermost so the guard and every
/// handler see the decoded `SessionContext`.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(property_routes())
        .merge(account_routes(state.assets.max_bytes()))
        .merge(admin_routes())
        .merge(page_routes())
        .nest_service(&config.uploads.public_path, ServeDir::new(&config.uploads.directory))
        .layer(middleware::from_fn(guard_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(cors_layer(&config.security))
        .with_state(state);

    if config.server.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(public::register::register))
        .route("/api/register/federated", post(public::register::register_federated))
        .route("/api/auth/signin", post(public::session::signin))
        .route("/api/auth/federated", post(public::session::federated_signin))
        .route("/api/auth/signout", post(public::session::signout))
        .route("/api/auth/session", get(protected::session::whoami))
        .route("/api/verify-admin", get(public::verify_admin::verify_admin))
}

fn property_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/properties",
            get(public::properties::list_available).post(protected::properties::create),
        )
        .route("/api/properties/user", get(protected::properties::mine))
        .route(
            "/api/properties/:id",
            get(public::properties::show)
                .put(protected::properties::update)
                .delete(protected::properties::delete),
        )
}

fn account_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/payments", get(protected::payments::history).post(protected::payments::create))
        .route("/api/notifications", get(protected::notifications::unread))
        .route("/api/notifications/:id/read", patch(protected::notifications::mark_read))
        .route(
            "/api/settings/profile",
            get(protected::settings::show).put(protected::settings::update),
        )
        .route(
            "/api/upload",
            post(protected::upload::upload).layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD)),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/analytics", get(elevated::admin::analytics))
        .route("/api/admin/users", get(elevated::admin::users))
        .route("/api/admin/moderation", axum::routing::delete(elevated::admin::moderate))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let methods = [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE];
    let origins: Vec<HeaderValue> = security.cors_origins.iter().filter_map(|o| o.parse().ok()).collect();

    if origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any).allow_methods(methods).allow_headers(Any)
    } else {
        // Credentialed requests need explicit origins
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(methods)
            .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION])
            .allow_credentials(true)
    }
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "LuxeHaven API",
            "version": version,
            "description": "Real-estate listings, rentals and purchases",
            "endpoints": {
                "auth": "/api/register, /api/auth/signin, /api/auth/federated, /api/auth/signout, /api/auth/session",
                "properties": "/api/properties[/:id], /api/properties/user",
                "payments": "/api/payments (session)",
                "notifications": "/api/notifications (session)",
                "settings": "/api/settings/profile (session)",
                "upload": "/api/upload (session)",
                "admin": "/api/admin/* (ADMIN)",
                "health": "/health",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewUser, Role, User};
    use crate::database::MemoryStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn fixture() -> (Router, AppState) {
        let config = AppConfig::development();
        let state = AppState::with_store(&config, Arc::new(MemoryStore::new())).unwrap();
        (app(state.clone(), &config), state)
    }

    async fn token_for(state: &AppState, role: Role) -> (User, String) {
        let user = state
            .store
            .create_user(NewUser {
                name: "Routed".to_string(),
                email: format!("{}@example.com", uuid::Uuid::new_v4().simple()),
                password_hash: Some("unused".to_string()),
                federated_id: None,
                role,
            })
            .await
            .unwrap();
        let (token, _) = state.keys.issue(&user).unwrap();
        (user, token)
    }

    fn get(path: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("luxehaven_session={}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn guarded_page_redirects_to_sign_in() {
        let (router, _) = fixture().await;
        let response = router.oneshot(get("/dashboard", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/auth/signin");
    }

    #[tokio::test]
    async fn admin_page_renders_for_admin() {
        let (router, state) = fixture().await;
        let (_, token) = token_for(&state, Role::Admin).await;
        let response = router.oneshot(get("/admin", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_without_session_is_unauthorized_json() {
        let (router, _) = fixture().await;
        let response = router.oneshot(get("/api/auth/session", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn admin_api_is_forbidden_for_users() {
        let (router, state) = fixture().await;
        let (_, token) = token_for(&state, Role::User).await;
        let response = router.oneshot(get("/api/admin/analytics", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn tampered_token_counts_as_signed_out() {
        let (router, state) = fixture().await;
        let (_, token) = token_for(&state, Role::User).await;
        let tampered = format!("{}x", token);

        let response = router.clone().oneshot(get("/api/verify-admin", Some(&tampered))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["data"], false);

        let response = router.oneshot(get("/auth/signin", Some(&tampered))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
