use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Credential obtained from an interactive federated sign-in (e.g. a Google popup).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FederatedCredential {
    pub provider_id: String,
    pub id_token: String,
}

/// Opaque session handed back by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub local_id: String,
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub redirect: String,
    pub session: Session,
}
