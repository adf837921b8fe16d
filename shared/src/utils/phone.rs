//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// E.164: '+', non-zero leading digit, 8 to 15 digits in total
static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{7,14}$").expect("E.164 pattern is valid")
});

/// Characters tolerated as visual separators in user input
const SEPARATORS: [char; 5] = [' ', '-', '.', '(', ')'];

/// Normalise user input to E.164 form
///
/// Strips separators and adds a missing leading `+`. Returns `None` when the
/// input contains anything other than digits, separators and one leading `+`,
/// or when the result is not a valid E.164 number.
pub fn normalize_e164(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !SEPARATORS.contains(&c) {
            return None;
        }
    }

    let candidate = format!("+{}", digits);
    if is_valid_e164(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Check whether a string already is a canonical E.164 number
pub fn is_valid_e164(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Mask a phone number for logs, keeping the `+`, the first digit and the last four
///
/// `+15551234567` becomes `+1******4567`.
pub fn mask_phone_number(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 6 {
        return "*".repeat(chars.len());
    }
    let head = if chars[0] == '+' { 2 } else { 1 };
    let tail = 4;
    let hidden = chars.len() - head - tail;
    let mut masked: String = chars[..head].iter().collect();
    masked.push_str(&"*".repeat(hidden));
    masked.extend(&chars[chars.len() - tail..]);
    masked
}
