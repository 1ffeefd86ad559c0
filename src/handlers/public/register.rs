// handlers/public/register.rs - POST /api/register, POST /api/register/federated

use axum::extract::State;
use serde::Deserialize;
use tracing::info;

use crate::auth::password::{hash_password, MIN_PASSWORD_LENGTH};
use crate::database::models::{NewUser, Role, User};
use crate::error::ApiError;
use crate::handlers::validate::{is_email, normalize_email, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FederatedRegisterRequest {
    /// Identity assertion issued by the federated provider
    pub assertion: Option<String>,
    pub name: Option<String>,
}

async fn ensure_email_free(state: &AppState, email: &str) -> Result<(), ApiError> {
    if state.store.find_user_by_email(email).await?.is_some() {
        return Err(ApiError::invalid_field("email", "Email already exists"));
    }
    Ok(())
}

/// Create an account with a password credential
pub async fn register(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> ApiResult<User> {
    let email = body.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = body.password.unwrap_or_default();

    FieldErrors::new()
        .require("name", body.name.as_deref())
        .require("email", Some(email.as_str()))
        .check("email", email.is_empty() || is_email(&email), "Invalid email address")
        .check(
            "password",
            password.chars().count() >= MIN_PASSWORD_LENGTH,
            "Password must be at least 8 characters",
        )
        .finish("Invalid registration")?;

    ensure_email_free(&state, &email).await?;

    let password_hash = hash_password(&password, state.bcrypt_cost).await?;
    let user = state
        .store
        .create_user(NewUser {
            name: body.name.unwrap_or_default().trim().to_string(),
            email,
            password_hash: Some(password_hash),
            federated_id: None,
            role: Role::User,
        })
        .await?;

    info!("Registered user {} with password", user.id);
    Ok(ApiResponse::created(user))
}

/// Create an account bound to a federated identity
pub async fn register_federated(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<FederatedRegisterRequest>,
) -> ApiResult<User> {
    FieldErrors::new().require("assertion", body.assertion.as_deref()).finish("Invalid registration")?;
    let assertion = body.assertion.unwrap_or_default();

    let identity = state.verifier.verify(&assertion).await?;
    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .or(identity.name)
        .map(|n| n.trim().to_string())
        .unwrap_or_default();
    let email = normalize_email(&identity.email);

    FieldErrors::new()
        .require("name", Some(name.as_str()))
        .check("email", is_email(&email), "Invalid email address")
        .finish("Invalid registration")?;

    ensure_email_free(&state, &email).await?;

    let user = state
        .store
        .create_user(NewUser {
            name,
            email,
            password_hash: None,
            federated_id: Some(identity.uid),
            role: Role::User,
        })
        .await?;

    info!("Registered user {} with federated identity", user.id);
    Ok(ApiResponse::created(user))
}
