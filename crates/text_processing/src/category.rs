//! Issue category classification
//!
//! Deterministic keyword rules; first matching rule wins, so more specific
//! systems (brakes, transmission) are listed ahead of generic symptoms
//! (noise, leak).

use once_cell::sync::Lazy;
use regex::Regex;

use voice_intake_core::IssueCategory;

use crate::normalize_utterance;

static CATEGORY_RULES: Lazy<Vec<(Regex, IssueCategory)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(?:brak\w*|rotors?|pads?|calipers?)\b").unwrap(),
            IssueCategory::Brakes,
        ),
        (
            Regex::new(r"\b(?:won't start|wont start|doesn't start|does not start|not starting|no start|won't turn over|won't crank|dead battery|battery|clicking)\b").unwrap(),
            IssueCategory::NoStart,
        ),
        (
            Regex::new(r"\b(?:overheat\w*|temperature|temp gauge|steam\w*|coolant|running hot)\b").unwrap(),
            IssueCategory::Overheating,
        ),
        (
            Regex::new(r"\b(?:transmission|shift\w*|slipp\w*|gears?|clutch)\b").unwrap(),
            IssueCategory::Transmission,
        ),
        (
            Regex::new(r"\b(?:check engine|warning light|engine light|dash\w* light|light (?:is |came |keeps )?(?:on|flashing|blinking))\b").unwrap(),
            IssueCategory::WarningLight,
        ),
        (
            Regex::new(r"\b(?:ac|a/c|air condition\w*|heater|blowing warm|blowing hot|no cold air)\b").unwrap(),
            IssueCategory::AirConditioning,
        ),
        (
            Regex::new(r"\b(?:leak\w*|drip\w*|puddle|fluid)\b").unwrap(),
            IssueCategory::Leak,
        ),
        (
            Regex::new(r"\b(?:pull\w*|alignment|drift\w*|steering)\b").unwrap(),
            IssueCategory::Pulling,
        ),
        (
            Regex::new(r"\b(?:tires?|tyres?|flat|blowout|tread)\b").unwrap(),
            IssueCategory::Tires,
        ),
        (
            Regex::new(r"\b(?:electric\w*|headlights?|tail ?lights?|windows?|fuses?|alternator|wiring)\b").unwrap(),
            IssueCategory::Electrical,
        ),
        (
            Regex::new(r"\b(?:nois\w*|sound\w*|squeal\w*|squeak\w*|rattl\w*|clunk\w*|knock\w*|grind\w*|hum\w*|whin\w*|vibrat\w*|shak\w*)\b").unwrap(),
            IssueCategory::Noise,
        ),
    ]
});

/// Derive the issue category from the caller's description
pub fn classify_issue(text: &str) -> IssueCategory {
    let normalized = normalize_utterance(text);
    CATEGORY_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(&normalized))
        .map(|(_, category)| *category)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brakes_beat_noise() {
        assert_eq!(classify_issue("my brakes are grinding"), IssueCategory::Brakes);
        assert_eq!(
            classify_issue("grinding noise whenever I brake"),
            IssueCategory::Brakes
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(classify_issue("the car won't start"), IssueCategory::NoStart);
        assert_eq!(classify_issue("it keeps overheating"), IssueCategory::Overheating);
        assert_eq!(classify_issue("there's oil leaking"), IssueCategory::Leak);
        assert_eq!(classify_issue("pulling to the right"), IssueCategory::Pulling);
        assert_eq!(classify_issue("check engine light is on"), IssueCategory::WarningLight);
        assert_eq!(classify_issue("the AC is blowing warm"), IssueCategory::AirConditioning);
        assert_eq!(classify_issue("I have a flat tire"), IssueCategory::Tires);
        assert_eq!(classify_issue("weird rattling sound"), IssueCategory::Noise);
        assert_eq!(classify_issue("it's slipping out of gear"), IssueCategory::Transmission);
    }

    #[test]
    fn test_unknown_is_other() {
        assert_eq!(classify_issue("something feels off"), IssueCategory::Other);
    }
}
