//! Prompt catalogue
//!
//! Every line the agent speaks. All entries are overridable from config
//! files or `VOICE_INTAKE__PROMPTS__*` environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use voice_intake_core::{IssueCategory, SlotKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Opening line; ends with the issue question
    pub greeting: String,
    pub ask_issue: String,
    pub ask_car: String,
    pub ask_name: String,
    pub ask_zip: String,
    pub ask_phone: String,
    pub ask_urgency: String,
    pub ask_drivable: String,

    /// Category-specific clarifying follow-ups, asked once
    pub followups: HashMap<IssueCategory, String>,
    pub default_followup: String,

    /// Lead-in and tail wrapped around the spoken summary
    pub confirm_prefix: String,
    pub confirm_suffix: String,

    pub ask_correction_choice: String,
    pub correction_choice_reprompt: String,

    pub closing: String,
    pub transfer_ack: String,

    /// `{alternate_contact}` is substituted
    pub speech_apology: String,

    pub fallback_clarify: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        let followups = [
            (
                IssueCategory::Brakes,
                "Got it. Do you hear the grinding or squealing every time you brake, or only sometimes?",
            ),
            (
                IssueCategory::NoStart,
                "Okay. When you turn the key, does it click, crank slowly, or do nothing at all?",
            ),
            (
                IssueCategory::Overheating,
                "Understood. Have you noticed any steam or coolant on the ground?",
            ),
            (
                IssueCategory::Noise,
                "Thanks. Where does the noise seem to come from, and when do you hear it?",
            ),
            (
                IssueCategory::Leak,
                "Okay. What color is the fluid, and where under the car is it dripping?",
            ),
            (
                IssueCategory::Pulling,
                "Got it. Does it pull all the time, or only when you brake?",
            ),
            (
                IssueCategory::Tires,
                "Okay. Is it a flat, or is the tire wearing or losing air slowly?",
            ),
            (
                IssueCategory::Electrical,
                "Understood. Which lights or electrical parts are acting up?",
            ),
            (
                IssueCategory::Transmission,
                "Okay. Is it slipping, shifting hard, or not going into gear?",
            ),
            (
                IssueCategory::WarningLight,
                "Thanks. Which warning light is on, and is it steady or flashing?",
            ),
            (
                IssueCategory::AirConditioning,
                "Got it. Is it blowing warm air, or not blowing at all?",
            ),
        ]
        .into_iter()
        .map(|(category, line)| (category, line.to_string()))
        .collect();

        Self {
            greeting: "Thanks for calling the service center. I can get you scheduled. What's going on with your car?".to_string(),
            ask_issue: "Could you describe the problem you're having with the car?".to_string(),
            ask_car: "What's the year, make, and model of the car?".to_string(),
            ask_name: "And what's your name?".to_string(),
            ask_zip: "What's your zip code?".to_string(),
            ask_phone: "What's the best phone number to reach you?".to_string(),
            ask_urgency: "How soon do you need it looked at? Today, tomorrow, this week, or are you flexible?".to_string(),
            ask_drivable: "Is the car safe to drive right now?".to_string(),
            followups,
            default_followup: "Can you tell me a little more about when it happens?".to_string(),
            confirm_prefix: "Let me make sure I have everything.".to_string(),
            confirm_suffix: "Is that all correct?".to_string(),
            ask_correction_choice: "No problem. What should I fix: the issue, car, name, zip, phone, urgency, or whether it's drivable?".to_string(),
            correction_choice_reprompt: "Sorry, which one should I change? You can say issue, car, name, zip, phone, urgency, or drivable.".to_string(),
            closing: "You're all set. Someone from the shop will reach out shortly. Thanks for calling, goodbye.".to_string(),
            transfer_ack: "Sure, let me connect you with someone now. Please hold.".to_string(),
            speech_apology: "Sorry, I'm having trouble on my end. {alternate_contact}.".to_string(),
            fallback_clarify: "Sorry, could you say that another way?".to_string(),
        }
    }
}

impl PromptsConfig {
    /// The question asked for a slot
    pub fn ask_for(&self, slot: SlotKind) -> &str {
        match slot {
            SlotKind::Issue => &self.ask_issue,
            SlotKind::Car => &self.ask_car,
            SlotKind::Name => &self.ask_name,
            SlotKind::Zip => &self.ask_zip,
            SlotKind::Phone => &self.ask_phone,
            SlotKind::Urgency => &self.ask_urgency,
            SlotKind::Drivable => &self.ask_drivable,
        }
    }

    pub fn followup_for(&self, category: IssueCategory) -> &str {
        self.followups
            .get(&category)
            .map(String::as_str)
            .unwrap_or(&self.default_followup)
    }

    pub fn apology(&self, alternate_contact: &str) -> String {
        self.speech_apology
            .replace("{alternate_contact}", alternate_contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_followup_lookup() {
        let prompts = PromptsConfig::default();
        assert!(prompts.followup_for(IssueCategory::Brakes).contains("brake"));
        assert_eq!(
            prompts.followup_for(IssueCategory::Other),
            prompts.default_followup
        );
    }

    #[test]
    fn test_apology_substitution() {
        let prompts = PromptsConfig::default();
        let line = prompts.apology("please call 555 0100");
        assert!(line.ends_with("please call 555 0100."));
        assert!(!line.contains('{'));
    }

    #[test]
    fn test_every_slot_has_a_question() {
        let prompts = PromptsConfig::default();
        for slot in SlotKind::ORDER {
            assert!(!prompts.ask_for(slot).is_empty());
        }
    }
}
