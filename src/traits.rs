use async_trait::async_trait;

use crate::models::{AuthError, CompanyRecord, FederatedCredential, Session, StoreError};

/// Third-party sign-in. Rejections carry the provider's message for display.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_in_federated(&self, credential: &FederatedCredential) -> Result<Session, AuthError>;
}

/// Hosted record store. `key_path` is `<collection>/<id>`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn write_record(&self, key_path: &str, record: &CompanyRecord) -> Result<(), StoreError>;
}

/// Splits `companies/abc` into `("companies", "abc")`.
pub fn split_key_path(key_path: &str) -> Result<(&str, &str), StoreError> {
    match key_path.split_once('/') {
        Some((collection, id)) if !collection.is_empty() && !id.is_empty() && !id.contains('/') => {
            Ok((collection, id))
        }
        _ => Err(StoreError::InvalidKeyPath(key_path.to_string())),
    }
}
