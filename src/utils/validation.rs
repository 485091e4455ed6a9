use crate::models::card::{CardField, CardInput, FieldError};
use crate::models::registration::{ErrorMap, RegistrationField, RegistrationForm};

const CARD_NUMBER_DIGITS: usize = 16;
const EXPIRY_FORMATTED_LEN: usize = 5;
const CVC_MIN_LEN: usize = 3;

/// Checks the card in field order and stops at the first failure.
pub fn validate_card(card: &CardInput) -> Result<(), FieldError> {
    let number_len = card.number.chars().filter(|c| !c.is_whitespace()).count();
    if number_len != CARD_NUMBER_DIGITS {
        return Err(rejection(CardField::Number, "Please enter a valid 16-digit card number"));
    }

    if card.name.is_empty() {
        return Err(rejection(CardField::Name, "Please enter cardholder name"));
    }

    if card.expiry.chars().count() != EXPIRY_FORMATTED_LEN {
        return Err(rejection(CardField::Expiry, "Please enter a valid expiry date (MM/YY)"));
    }

    if card.cvc.chars().count() < CVC_MIN_LEN {
        return Err(rejection(CardField::Cvc, "Please enter a valid CVC"));
    }

    Ok(())
}

fn rejection(field: CardField, message: &str) -> FieldError {
    FieldError { field, message: message.to_string() }
}

fn required_message(field: RegistrationField) -> &'static str {
    match field {
        RegistrationField::CompanyName => "Company name is required",
        RegistrationField::RegistrationNumber => "Registration number is required",
        RegistrationField::HeadOfficeAddress => "Address is required",
        RegistrationField::PhoneNumber => "Phone number is required",
        RegistrationField::EmailAddress => "Email is required",
        RegistrationField::BrandName | RegistrationField::Website => "",
    }
}

/// Collects every missing required field at once. An empty map means the
/// form may proceed to payment.
pub fn validate_registration(form: &RegistrationForm) -> ErrorMap {
    RegistrationField::ALL
        .into_iter()
        .filter(|field| field.is_required() && form.get(*field).is_empty())
        .map(|field| (field, required_message(field).to_string()))
        .collect()
}
