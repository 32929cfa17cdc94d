//! Urgency and drivability answers

use once_cell::sync::Lazy;
use regex::Regex;

use voice_intake_core::{SlotKind, UrgencyWindow};

use super::{ExtractionContext, SlotExtractor, SlotValue};
use crate::normalize_utterance;

// Flexible first so "not urgent" never reads as urgent
static URGENCY_PATTERNS: Lazy<Vec<(Regex, UrgencyWindow)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(?:no rush|no hurry|not urgent|whenever|flexible|any ?time|doesn't matter|next week|not in a hurry)\b").unwrap(),
            UrgencyWindow::Flexible,
        ),
        (
            Regex::new(r"\b(?:tomorrow)\b").unwrap(),
            UrgencyWindow::Tomorrow,
        ),
        (
            Regex::new(r"\b(?:asap|as soon as possible|right away|immediately|today|urgent\w*|emergency|right now|tonight|this morning|this afternoon)\b").unwrap(),
            UrgencyWindow::Today,
        ),
        (
            Regex::new(r"\b(?:this week|few days|couple (?:of )?days|later this week|monday|tuesday|wednesday|thursday|friday|weekend|saturday|sunday)\b").unwrap(),
            UrgencyWindow::ThisWeek,
        ),
    ]
});

// Explicit negatives first so "not drivable" never reads as a yes
static NOT_DRIVABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:can't|cannot|can not|won't|wont|isn't|doesn't|does not|not safe|unsafe|not drivable|undrivable|not running|tow\w*|stuck|dead)\b")
        .unwrap()
});

static DRIVABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:yes|yeah|yep|yup|sure|it drives|drives fine|drivable|driveable|can drive|safe|fine|okay|ok|runs)\b")
        .unwrap()
});

// A bare "no" only counts when it opens the reply; "no problem" is not a refusal
static LEADING_NO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:no|nope|nah|not really)\b").unwrap());

/// When the caller needs the work done
#[derive(Debug, Clone, Copy, Default)]
pub struct UrgencyExtractor;

impl SlotExtractor for UrgencyExtractor {
    fn kind(&self) -> SlotKind {
        SlotKind::Urgency
    }

    fn extract(&self, _ctx: &ExtractionContext<'_>, utterance: &str) -> Option<SlotValue> {
        let normalized = normalize_utterance(utterance);
        URGENCY_PATTERNS
            .iter()
            .find(|(pattern, _)| pattern.is_match(&normalized))
            .map(|(_, window)| SlotValue::Urgency(*window))
    }
}

/// Whether the car can be driven to the shop
#[derive(Debug, Clone, Copy, Default)]
pub struct DrivableExtractor;

impl SlotExtractor for DrivableExtractor {
    fn kind(&self) -> SlotKind {
        SlotKind::Drivable
    }

    fn extract(&self, _ctx: &ExtractionContext<'_>, utterance: &str) -> Option<SlotValue> {
        let normalized = normalize_utterance(utterance);
        if NOT_DRIVABLE_PATTERN.is_match(&normalized) {
            Some(SlotValue::Drivable(false))
        } else if DRIVABLE_PATTERN.is_match(&normalized) {
            Some(SlotValue::Drivable(true))
        } else if LEADING_NO_PATTERN.is_match(&normalized) {
            Some(SlotValue::Drivable(false))
        } else {
            None
        }
    }
}
