// Page route guard. Runs after the session middleware and before any page
// handler; API, health and asset routes are left to handler extractors.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::SessionContext;
use crate::auth::Claims;

pub const SIGN_IN_PAGE: &str = "/auth/signin";
pub const DASHBOARD_PAGE: &str = "/dashboard";
pub const ADMIN_PAGE: &str = "/admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCategory {
    Auth,
    Admin,
    Dashboard,
    Protected,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Continue,
    Redirect(&'static str),
}

pub fn classify(path: &str) -> PageCategory {
    if path.starts_with("/auth") {
        PageCategory::Auth
    } else if path == ADMIN_PAGE {
        PageCategory::Admin
    } else if path.starts_with(DASHBOARD_PAGE) {
        PageCategory::Dashboard
    } else if path.starts_with("/properties/new") || path.starts_with("/payment") {
        PageCategory::Protected
    } else {
        PageCategory::Public
    }
}

fn role_home(claims: &Claims) -> &'static str {
    if claims.is_admin() {
        ADMIN_PAGE
    } else {
        DASHBOARD_PAGE
    }
}

/// Decide what happens to a page request
pub fn decide(path: &str, claims: Option<&Claims>) -> GuardDecision {
    match (classify(path), claims) {
        (PageCategory::Auth, Some(claims)) => GuardDecision::Redirect(role_home(claims)),
        (PageCategory::Admin | PageCategory::Dashboard | PageCategory::Protected, None) => {
            GuardDecision::Redirect(SIGN_IN_PAGE)
        }
        (PageCategory::Admin, Some(claims)) if !claims.is_admin() => GuardDecision::Redirect(DASHBOARD_PAGE),
        (PageCategory::Dashboard, Some(claims)) if claims.is_admin() => GuardDecision::Redirect(ADMIN_PAGE),
        _ => GuardDecision::Continue,
    }
}

fn is_unguarded(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/") || path == "/health" || path.starts_with("/uploads/")
}

pub async fn guard_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if is_unguarded(path) {
        return next.run(request).await;
    }

    let claims = request.extensions().get::<SessionContext>().and_then(SessionContext::claims);
    match decide(path, claims) {
        GuardDecision::Continue => next.run(request).await,
        GuardDecision::Redirect(target) => {
            tracing::debug!("Guard redirect {} -> {}", path, target);
            Redirect::temporary(target).into_response()
        }
    }
}
