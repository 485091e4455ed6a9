mod auth_routes;
mod checkout_routes;
mod registration_routes;

pub use auth_routes::configure as configure_auth_routes;
pub use checkout_routes::configure as configure_checkout_routes;
pub use registration_routes::configure as configure_registration_routes;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    configure_auth_routes(cfg);
    configure_registration_routes(cfg);
    configure_checkout_routes(cfg);
}
