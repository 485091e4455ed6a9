use serde::{Deserialize, Serialize};

use crate::utils::card_format::{
    clamp_input, digits_only, format_card_number, format_expiry, CARD_NUMBER_MAX_LEN,
    CVC_MAX_LEN, EXPIRY_MAX_LEN,
};

/// The four editable payment fields of the checkout dialog.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CardField {
    Number,
    Name,
    Expiry,
    Cvc,
}

impl std::fmt::Display for CardField {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CardField::Number => write!(f, "number"),
            CardField::Name => write!(f, "name"),
            CardField::Expiry => write!(f, "expiry"),
            CardField::Cvc => write!(f, "cvc"),
        }
    }
}

/// One keystroke-level edit of a card field, as sent by the client.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CardUpdate {
    pub field: CardField,
    pub value: String,
}

impl CardUpdate {
    #[cfg(test)]
    pub fn new(field: CardField, value: impl Into<String>) -> Self {
        Self { field, value: value.into() }
    }
}

/// A single failed card rule. Card validation surfaces only the first one.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: CardField,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// In-progress payment details.
///
/// `number` is stored digits-only; grouping is applied on read through
/// [`CardInput::display_number`]. `expiry` is stored already formatted.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CardInput {
    pub number: String,
    pub name: String,
    pub expiry: String,
    pub cvc: String,
}

impl CardInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reducer for card edits. Input ceilings are applied before normalizing.
    pub fn apply(&mut self, update: CardUpdate) {
        match update.field {
            CardField::Number => {
                let typed = clamp_input(&update.value, CARD_NUMBER_MAX_LEN);
                self.number = digits_only(&format_card_number(&typed));
            }
            CardField::Name => self.name = update.value,
            CardField::Expiry => {
                let typed = clamp_input(&update.value, EXPIRY_MAX_LEN);
                self.expiry = format_expiry(&typed);
            }
            CardField::Cvc => self.cvc = clamp_input(&update.value, CVC_MAX_LEN),
        }
    }

    pub fn display_number(&self) -> String {
        format_card_number(&self.number)
    }

    pub fn last_four(&self) -> String {
        let skip = self.number.chars().count().saturating_sub(4);
        self.number.chars().skip(skip).collect()
    }

    /// `•••• •••• •••• 1111` as shown on the payment receipt.
    pub fn masked_number(&self) -> String {
        format!("•••• •••• •••• {}", self.last_four())
    }
}

/// What the client renders for the card form. Never carries the raw number.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub number: String,
    pub name: String,
    pub expiry: String,
    pub cvc: String,
}

impl From<&CardInput> for CardView {
    fn from(card: &CardInput) -> Self {
        CardView {
            number: card.display_number(),
            name: card.name.clone(),
            expiry: card.expiry.clone(),
            cvc: card.cvc.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_is_stored_without_separators() {
        let mut card = CardInput::new();
        card.apply(CardUpdate::new(CardField::Number, "4111 1111 1111 1111"));
        assert_eq!(card.number, "4111111111111111");
        assert_eq!(card.display_number(), "4111 1111 1111 1111");
    }

    #[test]
    fn test_number_input_is_clamped_to_nineteen_chars() {
        let mut card = CardInput::new();
        // 20 characters typed; the trailing "9" never reaches the normalizer
        card.apply(CardUpdate::new(CardField::Number, "4111 1111 1111 11119"));
        assert_eq!(card.number, "4111111111111111");
    }

    #[test]
    fn test_short_number_keeps_digits_only() {
        let mut card = CardInput::new();
        card.apply(CardUpdate::new(CardField::Number, "4a1"));
        assert_eq!(card.number, "41");
    }

    #[test]
    fn test_expiry_is_stored_formatted() {
        let mut card = CardInput::new();
        card.apply(CardUpdate::new(CardField::Expiry, "1225"));
        assert_eq!(card.expiry, "12/25");

        card.apply(CardUpdate::new(CardField::Expiry, "12/255"));
        assert_eq!(card.expiry, "12/25");

        card.apply(CardUpdate::new(CardField::Expiry, "1"));
        assert_eq!(card.expiry, "1");
    }

    #[test]
    fn test_cvc_ceiling_and_name_passthrough() {
        let mut card = CardInput::new();
        card.apply(CardUpdate::new(CardField::Cvc, "12345"));
        card.apply(CardUpdate::new(CardField::Name, "Asha Patil"));
        assert_eq!(card.cvc, "1234");
        assert_eq!(card.name, "Asha Patil");
    }

    #[test]
    fn test_masked_number() {
        let mut card = CardInput::new();
        card.apply(CardUpdate::new(CardField::Number, "4111111111114242"));
        assert_eq!(card.last_four(), "4242");
        assert_eq!(card.masked_number(), "•••• •••• •••• 4242");

        let empty = CardInput::new();
        assert_eq!(empty.last_four(), "");
    }

    #[test]
    fn test_card_update_deserializes_lowercase_field() {
        let update: CardUpdate =
            serde_json::from_str(r#"{"field":"cvc","value":"123"}"#).unwrap();
        assert_eq!(update, CardUpdate::new(CardField::Cvc, "123"));
    }
}
