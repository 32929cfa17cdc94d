//! Dialogue policy
//!
//! A single transition function per utterance over [`DialogueState`]. The
//! rules run in a fixed priority order:
//!
//! 1. escalation request
//! 2. correction choice
//! 3. confirmation reply
//! 4. slot extraction for the current step
//! 5. category follow-up (once)
//! 6. next missing slot
//! 7. confirmation read-back
//! 8. generic clarification
//!
//! The policy performs no I/O; the session actor turns the returned
//! [`PolicyAction`] into speech, call control and outcome writes.

use std::sync::Arc;

use voice_intake_config::{DialogueConfig, PromptsConfig};
use voice_intake_core::SlotKind;
use voice_intake_text_processing::{
    classify_confirmation, is_escalation_request, match_correction_field, spell_digits,
    spell_phone, ConfirmationReply, ExtractionContext, ExtractorSet,
};

use crate::dst::{DialogueState, Phase, Step};

/// What the session should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyAction {
    /// Ask the question for `step`
    Ask { step: Step, prompt: String },
    /// Read back the summary and wait for yes/no
    Confirm { summary: String },
    /// Ask which field to correct
    AskCorrection { prompt: String },
    /// Repeat a question without changing state
    Reprompt { prompt: String },
    /// Acknowledge, then hand the call to a human
    Transfer { ack: String },
    /// Emit the record, speak the closing line, hang up
    Finalize { closing: String },
    /// Generic clarifying question
    Clarify { prompt: String },
    /// Session already terminal; input ignored
    Ignore,
}

impl PolicyAction {
    /// Line to speak for this action
    pub fn speech(&self) -> Option<&str> {
        match self {
            PolicyAction::Ask { prompt, .. }
            | PolicyAction::AskCorrection { prompt }
            | PolicyAction::Reprompt { prompt }
            | PolicyAction::Clarify { prompt } => Some(prompt),
            PolicyAction::Confirm { summary } => Some(summary),
            PolicyAction::Transfer { ack } => Some(ack),
            PolicyAction::Finalize { closing } => Some(closing),
            PolicyAction::Ignore => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PolicyAction::Ask { .. } => "ask",
            PolicyAction::Confirm { .. } => "confirm",
            PolicyAction::AskCorrection { .. } => "ask_correction",
            PolicyAction::Reprompt { .. } => "reprompt",
            PolicyAction::Transfer { .. } => "transfer",
            PolicyAction::Finalize { .. } => "finalize",
            PolicyAction::Clarify { .. } => "clarify",
            PolicyAction::Ignore => "ignore",
        }
    }
}

/// Slots whose value can be given in the same breath as the correction
/// choice ("the zip is 02321"). Issue and drivability answers overlap too
/// much with the field names themselves.
const INLINE_CORRECTION_SLOTS: [SlotKind; 5] = [
    SlotKind::Zip,
    SlotKind::Phone,
    SlotKind::Car,
    SlotKind::Name,
    SlotKind::Urgency,
];

/// Deterministic slot-filling policy
#[derive(Debug, Clone)]
pub struct DialoguePolicy {
    extractors: ExtractorSet,
    prompts: Arc<PromptsConfig>,
    max_confirmation_reprompts: u32,
    min_issue_chars: usize,
}

impl DialoguePolicy {
    pub fn new(config: &DialogueConfig, prompts: Arc<PromptsConfig>) -> Self {
        Self {
            extractors: ExtractorSet::rule_based(),
            prompts,
            max_confirmation_reprompts: config.max_confirmation_reprompts,
            min_issue_chars: config.min_issue_chars,
        }
    }

    /// Replace the rule-based extractors
    pub fn with_extractors(mut self, extractors: ExtractorSet) -> Self {
        self.extractors = extractors;
        self
    }

    pub fn prompts(&self) -> &PromptsConfig {
        &self.prompts
    }

    /// Greeting spoken at stream start; it ends with the issue question
    pub fn opening(&self, state: &mut DialogueState) -> PolicyAction {
        state.phase = Phase::Collecting { step: Step::Issue };
        PolicyAction::Ask {
            step: Step::Issue,
            prompt: self.prompts.greeting.clone(),
        }
    }

    /// Advance the state machine by one caller utterance
    pub fn on_utterance(
        &self,
        state: &mut DialogueState,
        utterance: &str,
        caller: Option<&str>,
    ) -> PolicyAction {
        if state.phase.is_terminal() {
            return PolicyAction::Ignore;
        }

        if is_escalation_request(utterance) {
            return self.transfer(state);
        }

        let ctx = ExtractionContext {
            caller,
            min_issue_chars: self.min_issue_chars,
        };

        match state.phase {
            Phase::AwaitingCorrectionChoice => {
                return self.on_correction_choice(state, &ctx, utterance);
            }
            Phase::AwaitingConfirmation { reprompts } => {
                return self.on_confirmation_reply(state, reprompts, utterance);
            }
            _ => {}
        }

        self.extract(state, &ctx, utterance);
        self.next_question(state)
    }

    fn transfer(&self, state: &mut DialogueState) -> PolicyAction {
        state.phase = Phase::Transferred;
        state.correcting_field = None;
        PolicyAction::Transfer {
            ack: self.prompts.transfer_ack.clone(),
        }
    }

    fn on_correction_choice(
        &self,
        state: &mut DialogueState,
        ctx: &ExtractionContext<'_>,
        utterance: &str,
    ) -> PolicyAction {
        let Some(slot) = match_correction_field(utterance) else {
            return PolicyAction::Reprompt {
                prompt: self.prompts.correction_choice_reprompt.clone(),
            };
        };

        tracing::debug!(slot = %slot, "Correction requested");
        state.begin_correction(slot);

        if INLINE_CORRECTION_SLOTS.contains(&slot) {
            if let Some(value) = self.extractors.extract(slot, ctx, utterance) {
                state.fill(value);
                return self.next_question(state);
            }
        }

        PolicyAction::Ask {
            step: Step::for_slot(slot),
            prompt: self.prompts.ask_for(slot).to_string(),
        }
    }

    fn on_confirmation_reply(
        &self,
        state: &mut DialogueState,
        reprompts: u32,
        utterance: &str,
    ) -> PolicyAction {
        match classify_confirmation(utterance) {
            ConfirmationReply::Affirmative => {
                state.phase = Phase::Confirmed;
                state.confirmed = true;
                PolicyAction::Finalize {
                    closing: self.prompts.closing.clone(),
                }
            }
            ConfirmationReply::Negative => {
                state.phase = Phase::AwaitingCorrectionChoice;
                PolicyAction::AskCorrection {
                    prompt: self.prompts.ask_correction_choice.clone(),
                }
            }
            ConfirmationReply::Unclear if reprompts < self.max_confirmation_reprompts => {
                state.phase = Phase::AwaitingConfirmation {
                    reprompts: reprompts + 1,
                };
                PolicyAction::Reprompt {
                    prompt: self.summary(state),
                }
            }
            ConfirmationReply::Unclear => {
                tracing::info!(reprompts, "Confirmation still unclear, escalating");
                self.transfer(state)
            }
        }
    }

    /// Rule 4: fill what the current step allows
    fn extract(&self, state: &mut DialogueState, ctx: &ExtractionContext<'_>, utterance: &str) {
        if let Some(slot) = state.correcting_field {
            if let Some(value) = self.extractors.extract(slot, ctx, utterance) {
                state.fill(value);
            }
            return;
        }

        let step = state.current_step();
        match step {
            Step::Followup => {
                state.append_issue_detail(utterance);
                state.phase = Phase::Collecting { step: Step::Car };
                return;
            }
            Step::Confirm => return,
            _ => {}
        }

        if let Some(slot) = step.slot() {
            if !state.is_filled(slot) {
                if let Some(value) = self.extractors.extract(slot, ctx, utterance) {
                    state.fill(value);
                }
            }
        }

        if step.past_car() {
            for slot in [SlotKind::Zip, SlotKind::Phone] {
                if !state.is_filled(slot) {
                    if let Some(value) = self.extractors.extract(slot, ctx, utterance) {
                        state.fill(value);
                    }
                }
            }
        }
    }

    /// Rules 5 to 8
    fn next_question(&self, state: &mut DialogueState) -> PolicyAction {
        if let Some(category) = state.issue_category {
            if !state.asked_followup {
                state.asked_followup = true;
                state.phase = Phase::Collecting {
                    step: Step::Followup,
                };
                return PolicyAction::Ask {
                    step: Step::Followup,
                    prompt: self.prompts.followup_for(category).to_string(),
                };
            }
        }

        if let Some(slot) = state.next_missing() {
            let step = Step::for_slot(slot);
            state.phase = Phase::Collecting { step };
            return PolicyAction::Ask {
                step,
                prompt: self.prompts.ask_for(slot).to_string(),
            };
        }

        if !state.confirmed && !state.awaiting_confirmation() {
            state.phase = Phase::AwaitingConfirmation { reprompts: 0 };
            return PolicyAction::Confirm {
                summary: self.summary(state),
            };
        }

        PolicyAction::Clarify {
            prompt: self.prompts.fallback_clarify.clone(),
        }
    }

    /// Spoken read-back of every slot, zip and phone digit by digit
    pub fn summary(&self, state: &DialogueState) -> String {
        let mut parts = vec![self.prompts.confirm_prefix.clone()];

        if let Some(issue) = state.issue_text() {
            parts.push(format!("You're calling about: {}.", issue.trim_end_matches('.')));
        }
        if let Some(car) = state.car_make_model() {
            match state.car_year() {
                Some(year) => parts.push(format!("The car is a {} {}.", year, car)),
                None => parts.push(format!("The car is a {}.", car)),
            }
        }
        if let Some(name) = state.name() {
            parts.push(format!("Your name is {}.", name));
        }
        if let Some(zip) = state.zip() {
            parts.push(format!("Zip code {}.", spell_digits(zip)));
        }
        if let Some(phone) = state.phone() {
            parts.push(format!("Best number {}.", spell_phone(phone)));
        }
        if let Some(window) = state.urgency_window() {
            parts.push(format!("You'd like it looked at {}.", window.spoken()));
        }
        if let Some(drivable) = state.drivable() {
            parts.push(if drivable {
                "The car is drivable.".to_string()
            } else {
                "The car is not drivable.".to_string()
            });
        }

        parts.push(self.prompts.confirm_suffix.clone());
        parts.join(" ")
    }
}
