use tracing::{info, warn};

use super::password::{hash_password, MIN_PASSWORD_LENGTH};
use super::AuthError;
use crate::database::models::{NewUser, Role, User};
use crate::database::Store;

#[derive(Debug)]
pub enum AdminBootstrap {
    Created(User),
    /// An account with the email already exists and was left untouched
    Exists(User),
}

/// Create the ADMIN account for `email` unless one with that email exists
pub async fn ensure_admin(
    store: &dyn Store,
    email: &str,
    password: &str,
    name: &str,
    bcrypt_cost: u32,
) -> Result<AdminBootstrap, AuthError> {
    let email = email.trim().to_ascii_lowercase();

    if let Some(existing) = store.find_user_by_email(&email).await? {
        if !existing.role.is_admin() {
            warn!("Bootstrap admin {} already exists with role {:?}; not promoting", email, existing.role);
        }
        return Ok(AdminBootstrap::Exists(existing));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LENGTH));
    }

    let user = store
        .create_user(NewUser {
            name: name.to_string(),
            email,
            password_hash: Some(hash_password(password, bcrypt_cost).await?),
            federated_id: None,
            role: Role::Admin,
        })
        .await?;

    info!("Created admin account {}", user.id);
    Ok(AdminBootstrap::Created(user))
}
