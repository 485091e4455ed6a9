use actix_web::{web, HttpResponse};
use log::info;

use crate::models::{RegistrationForm, ValidateRegistrationResponse};
use crate::services::RegistrationService;

/// Runs the registration rules without opening a checkout, so the form can
/// show inline errors as the user goes.
pub async fn validate_registration(
    registration_service: web::Data<RegistrationService>,
    form: web::Json<RegistrationForm>,
) -> HttpResponse {
    let errors = registration_service.validate(&form);
    info!("Validated registration for '{}': {} error(s)", form.company_name, errors.len());

    HttpResponse::Ok().json(ValidateRegistrationResponse {
        valid: errors.is_empty(),
        errors,
    })
}
