use actix_web::{web, HttpResponse};
use log::info;
use uuid::Uuid;

use crate::models::{ApiError, CardUpdate, RegistrationForm};
use crate::services::CheckoutService;

fn parse_checkout_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("Checkout {} does not exist", raw)))
}

// Open a checkout for a filled-in registration form
pub async fn open_checkout(
    checkout_service: web::Data<CheckoutService>,
    form: web::Json<RegistrationForm>,
) -> Result<HttpResponse, ApiError> {
    info!("Opening checkout for '{}'", form.company_name);
    let view = checkout_service.open(form.into_inner()).await?;
    Ok(HttpResponse::Created().json(view))
}

pub async fn get_checkout(
    checkout_service: web::Data<CheckoutService>,
    checkout_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let checkout_id = parse_checkout_id(&checkout_id)?;
    let view = checkout_service.get(checkout_id).await?;
    Ok(HttpResponse::Ok().json(view))
}

// Apply a single field edit; the response carries the normalized card view
pub async fn update_card(
    checkout_service: web::Data<CheckoutService>,
    checkout_id: web::Path<String>,
    update: web::Json<CardUpdate>,
) -> Result<HttpResponse, ApiError> {
    let checkout_id = parse_checkout_id(&checkout_id)?;
    let view = checkout_service.update_card(checkout_id, update.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn submit_checkout(
    checkout_service: web::Data<CheckoutService>,
    checkout_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let checkout_id = parse_checkout_id(&checkout_id)?;
    info!("Submitting checkout {}", checkout_id);
    let view = checkout_service.submit(checkout_id).await?;
    Ok(HttpResponse::Accepted().json(view))
}

pub async fn dismiss_checkout(
    checkout_service: web::Data<CheckoutService>,
    checkout_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let checkout_id = parse_checkout_id(&checkout_id)?;
    checkout_service.dismiss(checkout_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
