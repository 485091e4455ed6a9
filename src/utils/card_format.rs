use std::sync::OnceLock;

use regex::Regex;

/// 16 digits plus 3 separators.
pub const CARD_NUMBER_MAX_LEN: usize = 19;
/// `MM/YY`
pub const EXPIRY_MAX_LEN: usize = 5;
pub const CVC_MAX_LEN: usize = 4;

fn digit_run() -> &'static Regex {
    static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();
    DIGIT_RUN.get_or_init(|| Regex::new(r"\d{4,16}").expect("digit run pattern is valid"))
}

/// Keeps ASCII digits only.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Truncates typed text to `max` characters, the way a form input's
/// `maxlength` does.
pub fn clamp_input(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Groups the first 4-16 digit run into blocks of four for display.
///
/// Fewer than four digits leaves the input untouched.
pub fn format_card_number(value: &str) -> String {
    let cleaned = digits_only(value);
    let Some(run) = digit_run().find(&cleaned) else {
        return value.to_string();
    };

    run.as_str()
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Inserts the `MM/YY` slash once at least three digits have been typed.
///
/// No month-range check is made.
pub fn format_expiry(value: &str) -> String {
    let cleaned = digits_only(value);
    if cleaned.len() >= 3 {
        return format!("{}/{}", &cleaned[..2], &cleaned[2..]);
    }
    value.to_string()
}
