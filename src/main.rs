use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use dotenv::dotenv;
use log::info;

mod config;
mod handlers;
mod models;
mod routes;
mod services;
mod traits;
mod utils;

use config::AppConfig;
use services::{
    AuthService, CheckoutService, IdentityClient, InMemoryRecordStore, MongoDBService,
    PaymentSequencer, RegistrationService,
};
use traits::RecordStore;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(log_level));

    let config = AppConfig::load()?;

    let store: Arc<dyn RecordStore> = match &config.mongodb_uri {
        Some(uri) => Arc::new(MongoDBService::init(uri, &config.mongodb_database).await?),
        None => Arc::new(InMemoryRecordStore::new()),
    };

    let identity = Arc::new(IdentityClient::new(
        &config.identity_base_url,
        &config.identity_api_key,
        &config.identity_request_uri,
    ));

    let auth_service = web::Data::new(AuthService::new(identity, config.post_login_redirect.clone()));

    let registrations = Arc::new(RegistrationService::new(store, config.registration_fee));
    let registration_service = web::Data::from(registrations.clone());
    let checkout_service = web::Data::new(CheckoutService::new(
        PaymentSequencer::new(registrations, config.timings),
        config.session_expiry,
    ));

    let (host, port) = (config.host.clone(), config.port);
    info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_headers(vec!["content-type", "content-length", "accept"])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(auth_service.clone())
            .app_data(registration_service.clone())
            .app_data(checkout_service.clone())
            .configure(routes::configure)
            .route("/health", web::get().to(|| async {
                info!("Health check");
                HttpResponse::Ok().body("OK")
            }))
    })
    .bind(format!("{host}:{port}"))?
    .run()
    .await?;

    info!("Server shutting down");
    Ok(())
}
