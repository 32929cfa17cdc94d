use serde::{Deserialize, Serialize};

use voice_intake_core::SlotKind;

/// Question the policy is currently waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Issue,
    Followup,
    Car,
    Name,
    Zip,
    Phone,
    Urgency,
    Drivable,
    Confirm,
}

impl Step {
    pub fn for_slot(slot: SlotKind) -> Self {
        match slot {
            SlotKind::Issue => Step::Issue,
            SlotKind::Car => Step::Car,
            SlotKind::Name => Step::Name,
            SlotKind::Zip => Step::Zip,
            SlotKind::Phone => Step::Phone,
            SlotKind::Urgency => Step::Urgency,
            SlotKind::Drivable => Step::Drivable,
        }
    }

    /// Slot collected at this step, if any
    pub fn slot(&self) -> Option<SlotKind> {
        match self {
            Step::Issue => Some(SlotKind::Issue),
            Step::Car => Some(SlotKind::Car),
            Step::Name => Some(SlotKind::Name),
            Step::Zip => Some(SlotKind::Zip),
            Step::Phone => Some(SlotKind::Phone),
            Step::Urgency => Some(SlotKind::Urgency),
            Step::Drivable => Some(SlotKind::Drivable),
            Step::Followup | Step::Confirm => None,
        }
    }

    /// Steps after the vehicle question, where zip and phone are picked up
    /// opportunistically
    pub fn past_car(&self) -> bool {
        matches!(
            self,
            Step::Name | Step::Zip | Step::Phone | Step::Urgency | Step::Drivable
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Issue => "issue",
            Step::Followup => "followup",
            Step::Car => "car",
            Step::Name => "name",
            Step::Zip => "zip",
            Step::Phone => "phone",
            Step::Urgency => "urgency",
            Step::Drivable => "drivable",
            Step::Confirm => "confirm",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position in the dialogue state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum Phase {
    /// Asking for (or waiting on an answer to) a step
    Collecting { step: Step },
    /// Summary read back; `reprompts` counts ambiguous replies so far
    AwaitingConfirmation { reprompts: u32 },
    /// Caller said the summary was wrong; waiting for which field
    AwaitingCorrectionChoice,
    Confirmed,
    Transferred,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Collecting { step: Step::Issue }
    }
}

impl Phase {
    /// Terminal phases accept no further input
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Confirmed | Phase::Transferred)
    }

    pub fn current_step(&self) -> Step {
        match self {
            Phase::Collecting { step } => *step,
            _ => Step::Confirm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_slot_round_trip() {
        for slot in SlotKind::ORDER {
            assert_eq!(Step::for_slot(slot).slot(), Some(slot));
        }
        assert_eq!(Step::Followup.slot(), None);
    }

    #[test]
    fn test_phase_step() {
        assert_eq!(Phase::default().current_step(), Step::Issue);
        assert_eq!(
            Phase::AwaitingConfirmation { reprompts: 1 }.current_step(),
            Step::Confirm
        );
        assert!(Phase::Transferred.is_terminal());
        assert!(!Phase::AwaitingCorrectionChoice.is_terminal());
    }
}
