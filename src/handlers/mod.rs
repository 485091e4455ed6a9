pub mod auth_handlers;
pub mod checkout_handlers;
pub mod registration_handlers;
