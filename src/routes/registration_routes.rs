use actix_web::web;
use crate::handlers::registration_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/registrations")
            .route("/validate", web::post().to(registration_handlers::validate_registration))
    );
}
