use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "luxehaven_session";

/// Request-scoped session, inserted for every request by `session_middleware`.
/// `None` means signed out; a bad or expired token counts as signed out.
#[derive(Clone, Debug, Default)]
pub struct SessionContext(pub Option<Claims>);

impl SessionContext {
    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref()
    }
}

/// Decode the session token from the cookie or a Bearer header
pub async fn session_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let claims = extract_token(request.headers()).and_then(|token| match state.keys.verify(&token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!("Ignoring session token: {}", e);
            None
        }
    });

    request.extensions_mut().insert(SessionContext(claims));
    next.run(request).await
}

/// Bearer header wins over the cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, max_age_hours: u64, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age_hours * 3600
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value that removes the session cookie
pub fn cleared_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static("luxehaven_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure")
    } else {
        HeaderValue::from_static("luxehaven_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}
