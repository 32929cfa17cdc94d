use voice_intake_core::SlotKind;

use super::contact::{looks_like_bare_name, INTRODUCTION_PATTERN, ZIP_PATTERN};
use super::{ExtractionContext, SlotExtractor, SlotValue};
use crate::vocabulary::NAME_STOP_WORDS;
use crate::{classify_issue, normalize_utterance};

/// Free-text issue capture
///
/// Rejects fragments shorter than the configured minimum, fragments that
/// are only a name, an introduction or a zip code, and small talk. Gating
/// on the current step is the policy's job.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueExtractor;

impl SlotExtractor for IssueExtractor {
    fn kind(&self) -> SlotKind {
        SlotKind::Issue
    }

    fn extract(&self, ctx: &ExtractionContext<'_>, utterance: &str) -> Option<SlotValue> {
        let text = utterance.trim();
        if text.chars().count() < ctx.min_issue_chars {
            return None;
        }

        let normalized = normalize_utterance(text);
        if looks_like_bare_name(&normalized) {
            return None;
        }

        // "my name is Tom" leaves nothing behind; "this is about my brakes" does
        let without_intro = INTRODUCTION_PATTERN.replace_all(&normalized, "");
        let without_zip = ZIP_PATTERN.replace_all(&without_intro, "");

        // "um okay", "hi how are you"
        if without_zip
            .split_whitespace()
            .all(|token| NAME_STOP_WORDS.contains(&token))
        {
            return None;
        }

        Some(SlotValue::Issue {
            text: text.to_string(),
            category: classify_issue(text),
        })
    }
}
