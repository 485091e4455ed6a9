pub mod auth_service;
pub mod checkout_service;
mod identity_client;
mod memory_store;
mod mongodb;
pub mod payment_sequencer;
pub mod registration_service;

pub use auth_service::AuthService;
pub use checkout_service::{CheckoutService, SessionExpiry};
pub use identity_client::IdentityClient;
pub use memory_store::InMemoryRecordStore;
pub use mongodb::MongoDBService;
pub use payment_sequencer::{PaymentSequencer, SequencerTimings};
pub use registration_service::RegistrationService;
