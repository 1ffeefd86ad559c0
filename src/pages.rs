// Server-rendered page shells. They carry no data of their own; the client
// loads everything through /api. Access control is done by the route guard.

use axum::{extract::Path, response::Html, routing::get, Router};

use crate::state::AppState;

fn shell(title: &str, page: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | LuxeHaven</title>\n</head>\n\
         <body>\n<main id=\"app\" data-page=\"{page}\"></main>\n</body>\n</html>\n"
    ))
}

async fn properties() -> Html<String> {
    shell("Properties", "properties")
}

async fn new_property() -> Html<String> {
    shell("List a property", "properties/new")
}

async fn property(Path(id): Path<String>) -> Html<String> {
    shell("Property", &format!("properties/{}", escape(&id)))
}

async fn payment(Path(id): Path<String>) -> Html<String> {
    shell("Checkout", &format!("payment/{}", escape(&id)))
}

async fn dashboard() -> Html<String> {
    shell("Dashboard", "dashboard")
}

async fn admin() -> Html<String> {
    shell("Admin", "admin")
}

async fn sign_in() -> Html<String> {
    shell("Sign in", "auth/signin")
}

async fn sign_up() -> Html<String> {
    shell("Create an account", "auth/signup")
}

async fn profile() -> Html<String> {
    shell("Profile settings", "settings/profile")
}

/// Path segments end up inside an HTML attribute
fn escape(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            c => c.to_string(),
        })
        .collect()
}

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/properties", get(properties))
        .route("/properties/new", get(new_property))
        .route("/properties/:id", get(property))
        .route("/payment/:id", get(payment))
        .route("/dashboard", get(dashboard))
        .route("/admin", get(admin))
        .route("/auth/signin", get(sign_in))
        .route("/auth/signup", get(sign_up))
        .route("/settings/profile", get(profile))
}
