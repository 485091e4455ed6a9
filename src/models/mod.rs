pub mod auth;
pub mod card;
pub mod checkout;
pub mod error;
pub mod registration;

pub use auth::{FederatedCredential, LoginRequest, LoginResponse, Session};
pub use card::{CardInput, CardUpdate, CardView};
pub use checkout::{CheckoutState, CheckoutView};
pub use error::{ApiError, AuthError, StoreError};
pub use registration::{CompanyRecord, ErrorMap, RegistrationForm, ValidateRegistrationResponse};
