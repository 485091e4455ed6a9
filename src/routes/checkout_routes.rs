use actix_web::web;
use crate::handlers::checkout_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/checkout")
            .route("", web::post().to(checkout_handlers::open_checkout))
            .route("/{checkout_id}", web::get().to(checkout_handlers::get_checkout))
            .route("/{checkout_id}", web::delete().to(checkout_handlers::dismiss_checkout))
            .route("/{checkout_id}/card", web::patch().to(checkout_handlers::update_card))
            .route("/{checkout_id}/submit", web::post().to(checkout_handlers::submit_checkout))
    );
}
