use once_cell::sync::Lazy;
use regex::Regex;

use voice_intake_core::SlotKind;

use super::{ExtractionContext, SlotExtractor, SlotValue};
use crate::normalize_utterance;
use crate::vocabulary::{contains_symptom, CAR_MAKES, MODEL_MAKES, NAME_STOP_WORDS};

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19[5-9]\d|20[0-4]\d)\b").unwrap());

// Max model tokens following a make
const MAX_MODEL_TOKENS: usize = 2;

/// Spoken form for a make or model token: acronyms and alphanumerics uppercased
fn display_token(token: &str) -> String {
    if token.len() <= 3 || token.chars().any(|c| c.is_ascii_digit() || c == '-') {
        token.to_uppercase()
    } else {
        let mut chars = token.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

fn is_model_token(token: &str) -> bool {
    !NAME_STOP_WORDS.contains(&token)
        && !YEAR_PATTERN.is_match(token)
        && token.chars().all(|c| c.is_alphanumeric() || c == '-')
}

/// Vehicle year, make and model
///
/// Needs a recognized make (or a model that implies one), or a
/// year+make+model shape. Symptom descriptions never count.
#[derive(Debug, Clone, Copy, Default)]
pub struct VehicleExtractor;

impl VehicleExtractor {
    fn make_and_model(tokens: &[&str], year_idx: Option<usize>) -> Option<String> {
        if let Some(make_idx) = tokens.iter().position(|t| CAR_MAKES.contains(t)) {
            let mut parts = vec![display_token(tokens[make_idx])];
            parts.extend(
                tokens[make_idx + 1..]
                    .iter()
                    .take_while(|t| is_model_token(t))
                    .take(MAX_MODEL_TOKENS)
                    .map(|t| display_token(t)),
            );
            return Some(parts.join(" "));
        }

        if let Some((model, make)) = tokens
            .iter()
            .find_map(|t| MODEL_MAKES.iter().find(|(model, _)| model == t))
        {
            return Some(format!("{} {}", display_token(make), display_token(model)));
        }

        // "2012 Saab 93" with an unlisted make
        let idx = year_idx?;
        let following: Vec<&str> = tokens[idx + 1..]
            .iter()
            .copied()
            .take_while(|t| is_model_token(t))
            .take(MAX_MODEL_TOKENS)
            .collect();
        if following.len() == MAX_MODEL_TOKENS {
            return Some(
                following
                    .iter()
                    .map(|t| display_token(t))
                    .collect::<Vec<_>>()
                    .join(" "),
            );
        }

        None
    }
}

impl SlotExtractor for VehicleExtractor {
    fn kind(&self) -> SlotKind {
        SlotKind::Car
    }

    fn extract(&self, _ctx: &ExtractionContext<'_>, utterance: &str) -> Option<SlotValue> {
        if contains_symptom(utterance) {
            return None;
        }

        let normalized = normalize_utterance(utterance);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();

        let year_idx = tokens.iter().position(|t| YEAR_PATTERN.is_match(t));
        let year = year_idx.and_then(|i| tokens[i].parse::<u16>().ok());

        let make_model = Self::make_and_model(&tokens, year_idx)?;

        Some(SlotValue::Car { make_model, year })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(text: &str) -> Option<(String, Option<u16>)> {
        match VehicleExtractor.extract(&ExtractionContext::default(), text) {
            Some(SlotValue::Car { make_model, year }) => Some((make_model, year)),
            _ => None,
        }
    }

    #[test]
    fn test_year_make_model() {
        assert_eq!(
            car("It's a 2015 Honda Civic"),
            Some(("Honda Civic".to_string(), Some(2015)))
        );
        assert_eq!(
            car("2019 ford f-150"),
            Some(("Ford F-150".to_string(), Some(2019)))
        );
        assert_eq!(
            car("2012 saab nine three"),
            Some(("Saab Nine".to_string(), Some(2012)))
        );
    }

    #[test]
    fn test_make_or_model_alone() {
        assert_eq!(car("a toyota"), Some(("Toyota".to_string(), None)));
        assert_eq!(car("my camry"), Some(("Toyota Camry".to_string(), None)));
        assert_eq!(car("BMW"), Some(("BMW".to_string(), None)));
    }

    #[test]
    fn test_rejects_symptoms_and_noise() {
        assert!(car("my Honda is pulling to the left").is_none());
        assert!(car("grinding when I stop").is_none());
        assert!(car("I'm not sure").is_none());
        assert!(car("2015").is_none());
    }
}
