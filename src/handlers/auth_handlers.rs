use actix_web::{web, HttpResponse};
use log::info;

use crate::models::{ApiError, FederatedCredential, LoginRequest};
use crate::services::AuthService;

/// Email/password sign-in
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Sign-in attempt for {}", request.email);
    let response = auth_service.login(&request).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Sign-in with a credential from an interactive provider popup
pub async fn login_federated(
    auth_service: web::Data<AuthService>,
    credential: web::Json<FederatedCredential>,
) -> Result<HttpResponse, ApiError> {
    info!("Federated sign-in attempt via {}", credential.provider_id);
    let response = auth_service.login_federated(&credential).await?;
    Ok(HttpResponse::Ok().json(response))
}
