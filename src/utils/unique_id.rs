use chrono::Utc;
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Random base-36 fragment followed by the epoch-millis in base 36.
///
/// Fine for low-volume record keys. Not suitable where uniqueness has to be
/// guaranteed cryptographically.
pub fn generate_unique_id() -> String {
    let random: u64 = rand::thread_rng().gen();
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!("{}{}", to_base36(random), to_base36(millis))
}
