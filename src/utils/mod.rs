pub mod card_format;
pub mod unique_id;
pub mod validation;
