//! Lexicons for intent-like decisions the policy makes outside slot filling
//!
//! Escalation requests, confirmation replies and correction-field choices
//! are all keyword decisions over the normalized utterance.

use once_cell::sync::Lazy;
use regex::Regex;

use voice_intake_core::SlotKind;

use crate::normalize_utterance;

// =============================================================================
// STATIC REGEX PATTERNS
// =============================================================================

/// Vehicle-problem vocabulary; a hit disqualifies name and vehicle extraction
static SYMPTOM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:leak\w*|drip\w*|pull\w*|brak\w*|grind\w*|shak\w*|start\w*|overheat\w*|nois\w*|squeal\w*|squeak\w*|clunk\w*|knock\w*|rattl\w*|smok\w*|smell\w*|vibrat\w*|stall\w*|sputter\w*|slipp\w*|flat|dead|broke\w*|steam\w*|hot|warning|battery|making|won't|wont)\b",
    )
    .unwrap()
});

// A request for a human, not a mention of one: "the service manager said"
// stays an issue description
static ESCALATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \b(?:talk|speak|chat)\s+(?:to|with)\b.{0,20}?\b(?:person|human|representative|rep|agent|operator|manager|someone|somebody|mechanic|technician)\b
        | \b(?:connect|transfer)\s+me\b
        | \bput\s+me\s+through\b
        | \b(?:get|want|need|give\s+me)\s+(?:a|an|the|some)?\s*(?:real\s+|live\s+|actual\s+)?(?:person|human|representative|rep|operator)\b
        | \b(?:real|live|actual)\s+(?:person|human|agent)\b
        | \bsomeone\s+real\b
        | ^(?:a\s+)?(?:human|person|representative|operator|agent)(?:\s+please)?$
        ",
    )
    .unwrap()
});

/// Rejections that hold wherever they appear in the reply
static NEGATIVE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:wrong|incorrect|not right|not correct|that's not|isn't right|mistake|no wait)\b")
        .unwrap()
});

static LEADING_NO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:no|nope|nah)\b").unwrap());

static BARE_NO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:no|nope|nah)\b").unwrap());

static AFFIRMATIVE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:yes|yeah|yep|yup|ya|correct|right|sure|sounds good|that's it|perfect|absolutely|exactly|all good|looks good)\b",
    )
    .unwrap()
});

/// Correction-field synonyms, checked in order
static CORRECTION_FIELDS: Lazy<Vec<(Regex, SlotKind)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"\b(?:zip|zipcode|location|postal|area)\b").unwrap(), SlotKind::Zip),
        (Regex::new(r"\b(?:phone|number|callback)\b").unwrap(), SlotKind::Phone),
        (Regex::new(r"\b(?:drive|drivable|driveable|tow)\b").unwrap(), SlotKind::Drivable),
        (Regex::new(r"\b(?:urgency|when|time|timing|soon|schedule|day)\b").unwrap(), SlotKind::Urgency),
        (Regex::new(r"\bname\b").unwrap(), SlotKind::Name),
        (Regex::new(r"\b(?:car|vehicle|make|model|year)\b").unwrap(), SlotKind::Car),
        (Regex::new(r"\b(?:issue|problem|symptom|description)\b").unwrap(), SlotKind::Issue),
    ]
});

/// Reply to the read-back confirmation question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationReply {
    Affirmative,
    Negative,
    Unclear,
}

/// True if the utterance carries vehicle-problem vocabulary
pub fn contains_symptom(text: &str) -> bool {
    SYMPTOM_PATTERN.is_match(&normalize_utterance(text))
}

/// True if the caller is asking for a human
pub fn is_escalation_request(text: &str) -> bool {
    ESCALATION_PATTERN.is_match(&normalize_utterance(text))
}

/// Classify a confirmation reply.
///
/// Explicit rejections and a leading "no" win. Otherwise an affirmative wins
/// over a trailing "no <noun>" ("yes, no changes"), and a bare "no" with no
/// affirmative is still a rejection.
pub fn classify_confirmation(text: &str) -> ConfirmationReply {
    let normalized = normalize_utterance(text);
    if NEGATIVE_PATTERN.is_match(&normalized) || LEADING_NO_PATTERN.is_match(&normalized) {
        ConfirmationReply::Negative
    } else if AFFIRMATIVE_PATTERN.is_match(&normalized) {
        ConfirmationReply::Affirmative
    } else if BARE_NO_PATTERN.is_match(&normalized) {
        ConfirmationReply::Negative
    } else {
        ConfirmationReply::Unclear
    }
}

/// Map a correction-choice reply to the slot the caller wants to change
pub fn match_correction_field(text: &str) -> Option<SlotKind> {
    let normalized = normalize_utterance(text);
    CORRECTION_FIELDS
        .iter()
        .find(|(pattern, _)| pattern.is_match(&normalized))
        .map(|(_, slot)| *slot)
}

/// Single words that are never a caller's name
pub(crate) const NAME_STOP_WORDS: &[&str] = &[
    "yes", "yeah", "yep", "yup", "no", "nope", "nah", "ok", "okay", "sure", "hi", "hello", "hey",
    "um", "uh", "umm", "hmm", "so", "well", "thanks", "thank", "please", "sorry", "what",
    "huh", "correct", "right", "wrong", "fine", "good", "great", "nothing", "car", "vehicle",
    "truck", "zip", "phone", "number", "name", "today", "tomorrow", "whenever", "asap", "maybe",
    "hold", "wait", "again", "repeat", "the", "a", "an", "it", "this", "that", "just", "and",
    "about", "for", "my", "calling", "from", "with", "regarding", "is", "was", "here", "me", "i",
    "i'm", "you", "your", "of", "on", "in", "to", "at", "not", "really", "speaking", "how", "are",
    "doing", "there", "morning", "afternoon", "evening", "today's",
];

/// Known manufacturers, lowercase
pub(crate) const CAR_MAKES: &[&str] = &[
    "acura", "audi", "bmw", "buick", "cadillac", "chevy", "chevrolet", "chrysler", "dodge",
    "fiat", "ford", "genesis", "gmc", "honda", "hyundai", "infiniti", "jaguar", "jeep", "kia",
    "lexus", "lincoln", "mazda", "mercedes", "mini", "mitsubishi", "nissan", "porsche", "ram",
    "subaru", "tesla", "toyota", "volkswagen", "vw", "volvo",
];

/// Common models that identify their make on their own
pub(crate) const MODEL_MAKES: &[(&str, &str)] = &[
    ("civic", "honda"),
    ("accord", "honda"),
    ("cr-v", "honda"),
    ("crv", "honda"),
    ("pilot", "honda"),
    ("camry", "toyota"),
    ("corolla", "toyota"),
    ("rav4", "toyota"),
    ("tacoma", "toyota"),
    ("prius", "toyota"),
    ("f-150", "ford"),
    ("f150", "ford"),
    ("escape", "ford"),
    ("explorer", "ford"),
    ("mustang", "ford"),
    ("silverado", "chevrolet"),
    ("malibu", "chevrolet"),
    ("equinox", "chevrolet"),
    ("altima", "nissan"),
    ("sentra", "nissan"),
    ("rogue", "nissan"),
    ("outback", "subaru"),
    ("forester", "subaru"),
    ("elantra", "hyundai"),
    ("sonata", "hyundai"),
    ("jetta", "volkswagen"),
    ("wrangler", "jeep"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation() {
        assert!(is_escalation_request("I want to talk to a person"));
        assert!(is_escalation_request("Can I get a human please?"));
        assert!(is_escalation_request("let me speak to someone real"));
        assert!(!is_escalation_request("my brakes are grinding"));
        assert!(is_escalation_request("transfer me please"));
        assert!(is_escalation_request("Representative."));
        assert!(is_escalation_request("is there a real person I can talk to"));
    }

    #[test]
    fn test_mentioning_people_is_not_escalation() {
        assert!(!is_escalation_request(
            "the service manager at the dealer said my brakes are grinding"
        ));
        assert!(!is_escalation_request("my insurance agent told me to call"));
        assert!(!is_escalation_request("another person hit my bumper"));
        assert!(!is_escalation_request("I talked to someone at the dealer already"));
        assert!(!is_escalation_request("I need someone to look at my brakes"));
    }

    #[test]
    fn test_confirmation_negative_wins() {
        assert_eq!(classify_confirmation("Yes"), ConfirmationReply::Affirmative);
        assert_eq!(classify_confirmation("yeah that's right"), ConfirmationReply::Affirmative);
        assert_eq!(classify_confirmation("No"), ConfirmationReply::Negative);
        assert_eq!(classify_confirmation("that's not right"), ConfirmationReply::Negative);
        assert_eq!(classify_confirmation("right, no wait"), ConfirmationReply::Negative);
        assert_eq!(classify_confirmation("hmm"), ConfirmationReply::Unclear);
        assert_eq!(classify_confirmation("um no"), ConfirmationReply::Negative);
    }

    #[test]
    fn test_confirmation_trailing_no_noun_is_a_yes() {
        assert_eq!(
            classify_confirmation("yes that's right, no changes"),
            ConfirmationReply::Affirmative
        );
        assert_eq!(classify_confirmation("yes, no problem"), ConfirmationReply::Affirmative);
        assert_eq!(
            classify_confirmation("no, the zip is wrong"),
            ConfirmationReply::Negative
        );
    }

    #[test]
    fn test_correction_field() {
        assert_eq!(match_correction_field("zip"), Some(SlotKind::Zip));
        assert_eq!(match_correction_field("the zip code"), Some(SlotKind::Zip));
        assert_eq!(match_correction_field("my phone number"), Some(SlotKind::Phone));
        assert_eq!(match_correction_field("the car"), Some(SlotKind::Car));
        assert_eq!(match_correction_field("the year"), Some(SlotKind::Car));
        assert_eq!(match_correction_field("my name"), Some(SlotKind::Name));
        assert_eq!(match_correction_field("the problem"), Some(SlotKind::Issue));
        assert_eq!(match_correction_field("whether it can drive"), Some(SlotKind::Drivable));
        assert_eq!(match_correction_field("when"), Some(SlotKind::Urgency));
        assert_eq!(match_correction_field("banana"), None);
    }

    #[test]
    fn test_symptom_vocabulary() {
        assert!(contains_symptom("it's leaking oil"));
        assert!(contains_symptom("pulling to the left"));
        assert!(contains_symptom("won't start"));
        assert!(!contains_symptom("Maria"));
        assert!(!contains_symptom("2015 Honda Civic"));
    }
}
