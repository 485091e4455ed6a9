use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::card::{CardInput, CardView, FieldError};
use crate::models::error::ApiError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingPhase {
    Submitting,
    Confirming,
}

/// Checkout progression: `editing -> processing -> succeeded`.
///
/// The only way back is `processing -> editing`, which carries the error
/// message that stopped the run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckoutState {
    Editing {
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Processing {
        phase: ProcessingPhase,
    },
    #[serde(rename_all = "camelCase")]
    Succeeded {
        company_id: String,
        card_last_four: String,
    },
}

impl Default for CheckoutState {
    fn default() -> Self {
        CheckoutState::Editing { error: None }
    }
}

impl CheckoutState {
    pub fn is_processing(&self) -> bool {
        matches!(self, CheckoutState::Processing { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Editing { .. } => "editing",
            CheckoutState::Processing { .. } => "processing",
            CheckoutState::Succeeded { .. } => "succeeded",
        }
    }

    /// `editing -> processing`, gated on the card validator.
    ///
    /// A rejected card keeps the state in `editing` with the failure attached.
    pub fn begin(
        &mut self,
        card: &CardInput,
        validate: impl Fn(&CardInput) -> Result<(), FieldError>,
    ) -> Result<(), ApiError> {
        match self {
            CheckoutState::Editing { .. } => match validate(card) {
                Ok(()) => {
                    *self = CheckoutState::Processing { phase: ProcessingPhase::Submitting };
                    Ok(())
                }
                Err(rejection) => {
                    *self = CheckoutState::Editing { error: Some(rejection.message.clone()) };
                    Err(ApiError::CardRejected(rejection))
                }
            },
            _ => Err(self.invalid("submit")),
        }
    }

    /// `processing(submitting) -> processing(confirming)`
    pub fn confirm(&mut self) -> Result<(), ApiError> {
        match self {
            CheckoutState::Processing { phase: ProcessingPhase::Submitting } => {
                *self = CheckoutState::Processing { phase: ProcessingPhase::Confirming };
                Ok(())
            }
            _ => Err(self.invalid("confirm")),
        }
    }

    /// `processing(confirming) -> succeeded`
    pub fn succeed(&mut self, company_id: String, card_last_four: String) -> Result<(), ApiError> {
        match self {
            CheckoutState::Processing { phase: ProcessingPhase::Confirming } => {
                *self = CheckoutState::Succeeded { company_id, card_last_four };
                Ok(())
            }
            _ => Err(self.invalid("succeed")),
        }
    }

    /// `processing -> editing` with the failure message attached.
    pub fn fail(&mut self, message: String) -> Result<(), ApiError> {
        match self {
            CheckoutState::Processing { .. } => {
                *self = CheckoutState::Editing { error: Some(message) };
                Ok(())
            }
            _ => Err(self.invalid("fail")),
        }
    }

    fn invalid(&self, action: &str) -> ApiError {
        ApiError::Conflict(format!("Cannot {} a checkout that is {}", action, self.name()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub checkout_id: Uuid,
    #[serde(flatten)]
    pub state: CheckoutState,
    pub amount_due: f64,
    pub card: CardView,
}
