use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::{AuthError, FederatedCredential, Session};
use crate::traits::IdentityProvider;

/// Client for an Identity Toolkit style REST sign-in API.
#[derive(Clone)]
pub struct IdentityClient {
    base_url: String,
    api_key: String,
    request_uri: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

impl From<SignInResponse> for Session {
    fn from(r: SignInResponse) -> Self {
        Session {
            local_id: r.local_id,
            email: r.email,
            id_token: r.id_token,
            refresh_token: r.refresh_token,
            expires_in: r.expires_in,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

/// Pulls the provider's own message out of an error body, falling back to
/// the raw body.
fn provider_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ProviderErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => format!("Sign-in failed: HTTP {}", status),
        Err(_) => body.to_string(),
    }
}

impl IdentityClient {
    pub fn new(base_url: &str, api_key: &str, request_uri: &str) -> Self {
        info!("Identity client using: {}", base_url);
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            request_uri: request_uri.to_string(),
            client: Client::new(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", self.base_url, method, self.api_key)
    }

    async fn post_sign_in<T: Serialize + ?Sized>(&self, method: &str, body: &T) -> Result<Session, AuthError> {
        let response = self.client
            .post(self.endpoint(method))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // the URL carries the API key
                let e = e.without_url();
                error!("Request to identity provider failed: {}", e);
                AuthError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            let parsed = response.json::<SignInResponse>().await.map_err(|e| {
                let e = e.without_url();
                error!("Failed to deserialize sign-in response: {}", e);
                AuthError::Transport(format!("Malformed sign-in response: {}", e))
            })?;
            Ok(parsed.into())
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = provider_message(status, &body);
            info!("Identity provider rejected {}: HTTP {} {}", method, status, message);
            Err(AuthError::Rejected(message))
        }
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        self.post_sign_in("signInWithPassword", &body).await
    }

    async fn sign_in_federated(&self, credential: &FederatedCredential) -> Result<Session, AuthError> {
        let body = IdpRequest {
            post_body: format!("id_token={}&providerId={}", credential.id_token, credential.provider_id),
            request_uri: &self.request_uri,
            return_idp_credential: true,
            return_secure_token: true,
        };
        self.post_sign_in("signInWithIdp", &body).await
    }
}
