// Credential checks for the two sign-in paths. Both end in a `User` that the
// caller turns into a session token.

use tracing::warn;

use super::federated::{FederatedIdentity, IdentityVerifier};
use super::password::verify_password;
use super::AuthError;
use crate::database::models::User;
use crate::database::Store;

/// Password path: the user must exist and have a password hash on file.
pub async fn authenticate_password(store: &dyn Store, email: &str, password: &str) -> Result<User, AuthError> {
    let user = store.find_user_by_email(email).await?.ok_or(AuthError::UserNotFound)?;

    let Some(hash) = user.password_hash.as_deref() else {
        warn!("Password sign-in refused for {}: no password on file", user.id);
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(password, hash).await? {
        warn!("Password sign-in refused for {}: wrong password", user.id);
        return Err(AuthError::InvalidPassword);
    }

    Ok(user)
}

/// Federated path: the stored federated id must match the asserted one, so an
/// email registered through the password path cannot be claimed by assertion.
pub async fn authenticate_federated(
    store: &dyn Store,
    verifier: &dyn IdentityVerifier,
    assertion: &str,
) -> Result<User, AuthError> {
    let identity = verifier.verify(assertion).await?;
    let user = store.find_user_by_email(&identity.email).await?.ok_or(AuthError::UserNotFound)?;

    if !matches_identity(&user, &identity) {
        warn!("Federated sign-in refused for {}: identity mismatch", user.id);
        return Err(AuthError::FederatedMismatch);
    }

    Ok(user)
}

fn matches_identity(user: &User, identity: &FederatedIdentity) -> bool {
    user.federated_id.as_deref() == Some(identity.uid.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::database::models::{NewUser, Role};
    use crate::database::MemoryStore;
    use async_trait::async_trait;

    /// Treats the assertion text as "uid|email"
    struct PlainVerifier;

    #[async_trait]
    impl IdentityVerifier for PlainVerifier {
        async fn verify(&self, assertion: &str) -> Result<FederatedIdentity, AuthError> {
            let (uid, email) = assertion
                .split_once('|')
                .ok_or_else(|| AuthError::InvalidAssertion("malformed".to_string()))?;
            Ok(FederatedIdentity { uid: uid.to_string(), email: email.to_string(), name: None })
        }
    }

    async fn seed(store: &MemoryStore, email: &str, password: Option<&str>, federated: Option<&str>) {
        let password_hash = match password {
            Some(p) => Some(hash_password(p, 4).await.unwrap()),
            None => None,
        };
        store
            .create_user(NewUser {
                name: "Seeded".to_string(),
                email: email.to_string(),
                password_hash,
                federated_id: federated.map(str::to_string),
                role: Role::User,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn password_path_outcomes() {
        let store = MemoryStore::new();
        seed(&store, "pw@example.com", Some("s3cret-pass"), None).await;

        assert!(authenticate_password(&store, "pw@example.com", "s3cret-pass").await.is_ok());
        assert!(matches!(
            authenticate_password(&store, "pw@example.com", "nope").await,
            Err(AuthError::InvalidPassword)
        ));
        assert!(matches!(
            authenticate_password(&store, "missing@example.com", "x").await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn federated_only_user_cannot_use_password_path() {
        let store = MemoryStore::new();
        seed(&store, "fed@example.com", None, Some("uid-42")).await;

        let result = authenticate_password(&store, "fed@example.com", "guess").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn federated_path_requires_matching_uid() {
        let store = MemoryStore::new();
        seed(&store, "fed@example.com", None, Some("uid-42")).await;
        seed(&store, "pw@example.com", Some("s3cret-pass"), None).await;

        assert!(authenticate_federated(&store, &PlainVerifier, "uid-42|fed@example.com").await.is_ok());
        assert!(matches!(
            authenticate_federated(&store, &PlainVerifier, "uid-7|fed@example.com").await,
            Err(AuthError::FederatedMismatch)
        ));
        // An email registered with a password cannot be claimed by assertion
        assert!(matches!(
            authenticate_federated(&store, &PlainVerifier, "uid-42|pw@example.com").await,
            Err(AuthError::FederatedMismatch)
        ));
    }
}
