//! Name, zip and phone extraction

use once_cell::sync::Lazy;
use regex::Regex;

use voice_intake_core::SlotKind;

use super::{ExtractionContext, SlotExtractor, SlotValue};
use crate::vocabulary::{contains_symptom, CAR_MAKES, NAME_STOP_WORDS};
use crate::{digits_only, normalize_utterance};

pub(crate) static ZIP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{5}(?:-\d{4})?\b").unwrap());

// "0 2 3 2 1" as some recognizers emit it
static SPACED_ZIP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(\d(?:\s\d){4})(?:\s|$)").unwrap());

pub(crate) static INTRODUCTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:my name is|my name's|name is|name's|this is|call me)\s+([a-z][a-z'-]{1,14})(?:\s+([a-z][a-z'-]{1,19}))?")
        .unwrap()
});

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)((?:\+?1[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4})(?:\D|$)").unwrap()
});

static CALLER_NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:this number|this one|same number|the number i'm calling from|number i'm calling from|calling from|caller id|this phone)\b")
        .unwrap()
});

fn is_stop_word(token: &str) -> bool {
    NAME_STOP_WORDS.contains(&token)
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A single 2-15 letter token that is not a stop word, a make, or a symptom
pub(crate) fn looks_like_bare_name(normalized: &str) -> bool {
    let mut tokens = normalized.split_whitespace();
    let (Some(token), None) = (tokens.next(), tokens.next()) else {
        return false;
    };

    let len = token.chars().count();
    (2..=15).contains(&len)
        && token.chars().all(|c| c.is_alphabetic())
        && !is_stop_word(token)
        && !CAR_MAKES.contains(&token)
        && !contains_symptom(token)
}

/// Normalize a 10-digit number, or 11 digits with a leading country 1
fn normalize_phone_digits(digits: &str) -> Option<String> {
    match digits.len() {
        10 => Some(digits.to_string()),
        11 if digits.starts_with('1') => Some(digits[1..].to_string()),
        _ => None,
    }
}

/// Digits plus the separators a recognizer puts between them
fn is_only_digits(utterance: &str) -> bool {
    utterance
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || "+-.,()".contains(c))
}

/// Caller's name
///
/// Accepts "my name is X" / "this is X" phrasing, then a bare single-token
/// name. Utterances with vehicle-problem vocabulary never yield a name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameExtractor;

impl SlotExtractor for NameExtractor {
    fn kind(&self) -> SlotKind {
        SlotKind::Name
    }

    fn extract(&self, _ctx: &ExtractionContext<'_>, utterance: &str) -> Option<SlotValue> {
        if contains_symptom(utterance) {
            return None;
        }

        let normalized = normalize_utterance(utterance);

        if let Some(caps) = INTRODUCTION_PATTERN.captures(&normalized) {
            let first = caps.get(1).map(|m| m.as_str())?;
            if !is_stop_word(first) {
                let mut name = capitalize(first);
                if let Some(last) = caps.get(2).map(|m| m.as_str()) {
                    if !is_stop_word(last) {
                        name.push(' ');
                        name.push_str(&capitalize(last));
                    }
                }
                return Some(SlotValue::Name(name));
            }
        }

        if looks_like_bare_name(&normalized) {
            return Some(SlotValue::Name(capitalize(&normalized)));
        }

        None
    }
}

/// 5-digit zip, optionally with a +4 suffix, anywhere in the utterance
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl SlotExtractor for ZipExtractor {
    fn kind(&self) -> SlotKind {
        SlotKind::Zip
    }

    fn extract(&self, _ctx: &ExtractionContext<'_>, utterance: &str) -> Option<SlotValue> {
        if let Some(m) = ZIP_PATTERN.find(utterance) {
            return Some(SlotValue::Zip(m.as_str().to_string()));
        }

        SPACED_ZIP_PATTERN
            .captures(utterance)
            .and_then(|caps| caps.get(1))
            .map(|m| SlotValue::Zip(digits_only(m.as_str())))
    }
}

/// 10-digit phone number (11 with a leading country 1, which is stripped)
///
/// "this number" resolves to the caller identifier when that is a valid number.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneExtractor;

impl SlotExtractor for PhoneExtractor {
    fn kind(&self) -> SlotKind {
        SlotKind::Phone
    }

    fn extract(&self, ctx: &ExtractionContext<'_>, utterance: &str) -> Option<SlotValue> {
        let all_digits = digits_only(utterance);

        if all_digits.is_empty() {
            let caller = ctx.caller?;
            if CALLER_NUMBER_PATTERN.is_match(&normalize_utterance(utterance)) {
                return normalize_phone_digits(&digits_only(caller)).map(SlotValue::Phone);
            }
            return None;
        }

        // Digit-by-digit dictation ("6 1 7 5 5 5 ...") only counts when the
        // reply is nothing but the number
        if is_only_digits(utterance) {
            if let Some(phone) = normalize_phone_digits(&all_digits) {
                return Some(SlotValue::Phone(phone));
            }
        }

        PHONE_PATTERN
            .captures_iter(utterance)
            .filter_map(|caps| caps.get(1))
            .find_map(|m| normalize_phone_digits(&digits_only(m.as_str())))
            .map(SlotValue::Phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ExtractionContext<'static> {
        ExtractionContext::default()
    }

    fn name(text: &str) -> Option<String> {
        match NameExtractor.extract(&ctx(), text) {
            Some(SlotValue::Name(n)) => Some(n),
            _ => None,
        }
    }

    #[test]
    fn test_name_introductions() {
        assert_eq!(name("my name is maria lopez"), Some("Maria Lopez".to_string()));
        assert_eq!(name("Hi, this is Dave."), Some("Dave".to_string()));
        assert_eq!(name("my name is Sam and I"), Some("Sam".to_string()));
        assert_eq!(name("Tom"), Some("Tom".to_string()));
    }

    #[test]
    fn test_name_rejects_symptoms_and_fillers() {
        assert_eq!(name("it's leaking"), None);
        assert_eq!(name("this is pulling left"), None);
        assert_eq!(name("brakes"), None);
        assert_eq!(name("yes"), None);
        assert_eq!(name("honda"), None);
        assert_eq!(name("a"), None);
        assert_eq!(name("supercalifragilistic"), None);
    }

    #[test]
    fn test_zip() {
        let zip = |t: &str| ZipExtractor.extract(&ctx(), t);
        assert_eq!(zip("02321"), Some(SlotValue::Zip("02321".to_string())));
        assert_eq!(
            zip("I'm in 90210-1234 area"),
            Some(SlotValue::Zip("90210-1234".to_string()))
        );
        assert_eq!(zip("0 2 3 2 1"), Some(SlotValue::Zip("02321".to_string())));
        assert_eq!(zip("6175550123"), None);
        assert_eq!(zip("1234"), None);
    }

    #[test]
    fn test_phone() {
        let phone = |t: &str| PhoneExtractor.extract(&ctx(), t);
        assert_eq!(phone("617-555-0123"), Some(SlotValue::Phone("6175550123".to_string())));
        assert_eq!(phone("1 617 555 0123"), Some(SlotValue::Phone("6175550123".to_string())));
        assert_eq!(phone("555 0123"), None);
        assert_eq!(phone("617 555 01234"), None);
        assert_eq!(
            phone("zip 02321, number 617 555 0123"),
            Some(SlotValue::Phone("6175550123".to_string()))
        );
    }

    #[test]
    fn test_phone_ignores_scattered_digits() {
        let phone = |t: &str| PhoneExtractor.extract(&ctx(), t);
        assert_eq!(phone("it's 02321, I'm at 40 Main Street apartment 123"), None);
        assert_eq!(phone("2015 Civic with 120000 miles"), None);
        assert_eq!(
            phone("6 1 7 5 5 5 0 1 2 3"),
            Some(SlotValue::Phone("6175550123".to_string()))
        );
        assert_eq!(
            phone("sure, it's (617) 555-0123"),
            Some(SlotValue::Phone("6175550123".to_string()))
        );
    }

    #[test]
    fn test_phone_caller_shortcut() {
        let caller_ctx = ExtractionContext {
            caller: Some("+16175550123"),
            ..ExtractionContext::default()
        };
        assert_eq!(
            PhoneExtractor.extract(&caller_ctx, "you can use this number"),
            Some(SlotValue::Phone("6175550123".to_string()))
        );

        let anonymous = ExtractionContext {
            caller: Some("anonymous"),
            ..ExtractionContext::default()
        };
        assert!(PhoneExtractor.extract(&anonymous, "this number").is_none());
        assert!(PhoneExtractor.extract(&ctx(), "this number").is_none());
    }
}
