use std::env;
use std::time::Duration;

use log::{info, warn};
use thiserror::Error;

use crate::services::{SequencerTimings, SessionExpiry};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub identity_api_key: String,
    pub identity_base_url: String,
    pub identity_request_uri: String,
    pub post_login_redirect: String,
    pub registration_fee: f64,
    pub timings: SequencerTimings,
    pub session_expiry: SessionExpiry,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let identity_api_key = lookup("IDENTITY_API_KEY").unwrap_or_default();
        if identity_api_key.is_empty() {
            warn!("IDENTITY_API_KEY is empty - sign-in requests will be rejected by the provider");
        }

        let mongodb_uri = lookup("MONGODB_URI").filter(|v| !v.trim().is_empty());
        if mongodb_uri.is_none() {
            info!("MONGODB_URI not set, registrations will be kept in memory");
        }

        Ok(AppConfig {
            host: var("SERVER_HOST", "0.0.0.0"),
            port: parse_number("SERVER_PORT", &var("SERVER_PORT", "8080"))?,
            mongodb_uri,
            mongodb_database: var("MONGODB_DATABASE", "harb"),
            identity_api_key,
            identity_base_url: var("IDENTITY_BASE_URL", "https://identitytoolkit.googleapis.com/v1"),
            identity_request_uri: var("IDENTITY_REQUEST_URI", "http://localhost"),
            post_login_redirect: var("POST_LOGIN_REDIRECT", "/farmer"),
            registration_fee: parse_number("REGISTRATION_FEE", &var("REGISTRATION_FEE", "99.0"))?,
            timings: SequencerTimings {
                submit_delay: Duration::from_millis(parse_number(
                    "PAYMENT_SUBMIT_DELAY_MS",
                    &var("PAYMENT_SUBMIT_DELAY_MS", "2000"),
                )?),
                confirm_delay: Duration::from_millis(parse_number(
                    "PAYMENT_CONFIRM_DELAY_MS",
                    &var("PAYMENT_CONFIRM_DELAY_MS", "1500"),
                )?),
            },
            session_expiry: SessionExpiry {
                idle_ttl: Duration::from_secs(parse_number(
                    "CHECKOUT_IDLE_TTL_SECS",
                    &var("CHECKOUT_IDLE_TTL_SECS", "1800"),
                )?),
                receipt_ttl: Duration::from_secs(parse_number(
                    "CHECKOUT_RECEIPT_TTL_SECS",
                    &var("CHECKOUT_RECEIPT_TTL_SECS", "300"),
                )?),
                sweep_interval: Duration::from_secs(parse_number(
                    "CHECKOUT_SWEEP_INTERVAL_SECS",
                    &var("CHECKOUT_SWEEP_INTERVAL_SECS", "60"),
                )?),
            },
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}
