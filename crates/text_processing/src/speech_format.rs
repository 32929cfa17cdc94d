//! Spoken rendering of numeric fields
//!
//! Zip codes and phone numbers are read back one digit at a time so neither
//! the synthesizer nor the caller groups them into larger numbers.

/// Render each digit separately; "0" is spoken as "zero". Non-digits are dropped.
///
/// ```
/// use voice_intake_text_processing::spell_digits;
/// assert_eq!(spell_digits("02321"), "zero 2 3 2 1");
/// ```
pub fn spell_digits(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit())
        .map(|c| match c {
            '0' => "zero".to_string(),
            d => d.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Phone numbers read back in 3-3-4 groups, each digit spelled
pub fn spell_phone(value: &str) -> String {
    let digits: Vec<char> = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 10 {
        return spell_digits(value);
    }

    let group = |range: std::ops::Range<usize>| spell_digits(&digits[range].iter().collect::<String>());
    format!("{}, {}, {}", group(0..3), group(3..6), group(6..10))
}
