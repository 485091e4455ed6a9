use std::sync::Arc;

use log::{error, info};

use crate::models::{ApiError, FederatedCredential, LoginRequest, LoginResponse};
use crate::traits::IdentityProvider;

/// Farmer sign-in. Delegates to the identity provider and hands back the
/// fixed post-login destination.
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    post_login_redirect: String,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>, post_login_redirect: String) -> Self {
        Self { provider, post_login_redirect }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let session = self.provider
            .sign_in(&request.email, &request.password)
            .await
            .map_err(|e| {
                error!("Password sign-in failed: {}", e);
                ApiError::from(e)
            })?;

        info!("Signed in user {}", session.local_id);
        Ok(LoginResponse {
            redirect: self.post_login_redirect.clone(),
            session,
        })
    }

    pub async fn login_federated(&self, credential: &FederatedCredential) -> Result<LoginResponse, ApiError> {
        let session = self.provider
            .sign_in_federated(credential)
            .await
            .map_err(|e| {
                error!("Federated sign-in via {} failed: {}", credential.provider_id, e);
                ApiError::from(e)
            })?;

        info!("Signed in user {} via {}", session.local_id, credential.provider_id);
        Ok(LoginResponse {
            redirect: self.post_login_redirect.clone(),
            session,
        })
    }
}
