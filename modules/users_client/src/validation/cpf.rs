//! CPF formatting and checksum validation.
//!
//! A CPF is an 11-digit Brazilian national ID whose last two digits are
//! verification digits computed by two weighted mod-11 passes. All functions
//! here are pure and total.

/// Remove everything but ASCII digits.
pub fn strip(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Apply the progressive `000.000.000-00` mask.
///
/// Input digits are truncated to 11; punctuation appears as the digit count
/// crosses 3, 6 and 9, so the mask grows while the user types.
pub fn format_mask(input: &str) -> String {
    let mut digits = strip(input);
    digits.truncate(11);

    let len = digits.len();
    if len > 9 {
        format!(
            "{}.{}.{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..]
        )
    } else if len > 6 {
        format!("{}.{}.{}", &digits[..3], &digits[3..6], &digits[6..])
    } else if len > 3 {
        format!("{}.{}", &digits[..3], &digits[3..])
    } else {
        digits
    }
}

/// Validate the two verification digits.
///
/// Rejects anything whose stripped form is not exactly 11 digits or is a
/// single repeated digit (those pass the arithmetic but are not valid CPFs).
pub fn validate_checksum(input: &str) -> bool {
    let cleaned = strip(input);
    if cleaned.len() != 11 {
        return false;
    }

    let digits: Vec<u32> = cleaned.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    verification_digit(&digits[..9], 10) == digits[9]
        && verification_digit(&digits[..10], 11) == digits[10]
}

/// One weighted-sum pass: weights run from `first_weight` down to 2, the
/// result is `11 - (sum % 11)`, and 10 or 11 collapse to 0.
fn verification_digit(digits: &[u32], first_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| d * (first_weight - i as u32))
        .sum();
    let digit = 11 - (sum % 11);
    if digit >= 10 {
        0
    } else {
        digit
    }
}
