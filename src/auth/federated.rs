use async_trait::async_trait;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Identity asserted by the federated provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederatedIdentity {
    /// Provider-side user id
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
}

/// Verifies identity assertions issued by an external identity provider
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, assertion: &str) -> Result<FederatedIdentity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct AssertionClaims {
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
}

/// Accepts HS256 assertions signed with a secret shared with the provider
pub struct SharedSecretVerifier {
    key: DecodingKey,
}

impl SharedSecretVerifier {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(Self { key: DecodingKey::from_secret(secret.as_bytes()) })
    }
}

#[async_trait]
impl IdentityVerifier for SharedSecretVerifier {
    async fn verify(&self, assertion: &str) -> Result<FederatedIdentity, AuthError> {
        let data = decode::<AssertionClaims>(assertion, &self.key, &Validation::default())
            .map_err(|e| AuthError::InvalidAssertion(e.to_string()))?;
        let claims = data.claims;
        if claims.sub.trim().is_empty() || claims.email.trim().is_empty() {
            return Err(AuthError::InvalidAssertion("assertion is missing subject or email".to_string()));
        }
        Ok(FederatedIdentity { uid: claims.sub, email: claims.email, name: claims.name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn assertion(secret: &str, sub: &str, email: &str) -> String {
        let exp = chrono::Utc::now().timestamp() + 600;
        encode(
            &Header::default(),
            &json!({ "sub": sub, "email": email, "name": "Baraka", "exp": exp }),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn accepts_assertion_signed_with_shared_secret() {
        let verifier = SharedSecretVerifier::new("provider-secret").unwrap();
        let identity = verifier.verify(&assertion("provider-secret", "uid-9", "b@example.com")).await.unwrap();
        assert_eq!(identity.uid, "uid-9");
        assert_eq!(identity.email, "b@example.com");
        assert_eq!(identity.name.as_deref(), Some("Baraka"));
    }

    #[tokio::test]
    async fn rejects_foreign_signature_and_blank_subject() {
        let verifier = SharedSecretVerifier::new("provider-secret").unwrap();
        assert!(verifier.verify(&assertion("someone-else", "uid-9", "b@example.com")).await.is_err());
        assert!(verifier.verify(&assertion("provider-secret", " ", "b@example.com")).await.is_err());
    }
}
