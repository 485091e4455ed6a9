use actix_web::web;
use crate::handlers::auth_handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(auth_handlers::login))
            .route("/federated", web::post().to(auth_handlers::login_federated))
    );
}
