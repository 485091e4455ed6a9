use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Business fields of the company registration form.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationField {
    CompanyName,
    BrandName,
    RegistrationNumber,
    HeadOfficeAddress,
    PhoneNumber,
    EmailAddress,
    Website,
}

impl RegistrationField {
    pub const ALL: [RegistrationField; 7] = [
        RegistrationField::CompanyName,
        RegistrationField::BrandName,
        RegistrationField::RegistrationNumber,
        RegistrationField::HeadOfficeAddress,
        RegistrationField::PhoneNumber,
        RegistrationField::EmailAddress,
        RegistrationField::Website,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationField::CompanyName => "companyName",
            RegistrationField::BrandName => "brandName",
            RegistrationField::RegistrationNumber => "registrationNumber",
            RegistrationField::HeadOfficeAddress => "headOfficeAddress",
            RegistrationField::PhoneNumber => "phoneNumber",
            RegistrationField::EmailAddress => "emailAddress",
            RegistrationField::Website => "website",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, RegistrationField::BrandName | RegistrationField::Website)
    }
}

impl std::fmt::Display for RegistrationField {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Field name to human-readable failure message.
pub type ErrorMap = BTreeMap<RegistrationField, String>;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    pub company_name: String,
    pub brand_name: String,
    pub registration_number: String,
    pub head_office_address: String,
    pub phone_number: String,
    pub email_address: String,
    pub website: String,
}

impl RegistrationForm {
    pub fn get(&self, field: RegistrationField) -> &str {
        match field {
            RegistrationField::CompanyName => &self.company_name,
            RegistrationField::BrandName => &self.brand_name,
            RegistrationField::RegistrationNumber => &self.registration_number,
            RegistrationField::HeadOfficeAddress => &self.head_office_address,
            RegistrationField::PhoneNumber => &self.phone_number,
            RegistrationField::EmailAddress => &self.email_address,
            RegistrationField::Website => &self.website,
        }
    }

    #[cfg(test)]
    pub fn set(&mut self, field: RegistrationField, value: impl Into<String>) {
        let value = value.into();
        match field {
            RegistrationField::CompanyName => self.company_name = value,
            RegistrationField::BrandName => self.brand_name = value,
            RegistrationField::RegistrationNumber => self.registration_number = value,
            RegistrationField::HeadOfficeAddress => self.head_office_address = value,
            RegistrationField::PhoneNumber => self.phone_number = value,
            RegistrationField::EmailAddress => self.email_address = value,
            RegistrationField::Website => self.website = value,
        }
    }
}

pub const PAYMENT_STATUS_COMPLETED: &str = "completed";

/// Flat record persisted under `companies/<id>` once the mock payment clears.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    #[serde(flatten)]
    pub form: RegistrationForm,
    pub timestamp: i64,
    pub payment_status: String,
    pub amount_paid: f64,
}

impl CompanyRecord {
    pub fn new(form: RegistrationForm, timestamp: i64, amount_paid: f64) -> Self {
        Self {
            form,
            timestamp,
            payment_status: PAYMENT_STATUS_COMPLETED.to_string(),
            amount_paid,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateRegistrationResponse {
    pub valid: bool,
    pub errors: ErrorMap,
}
