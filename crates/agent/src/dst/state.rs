use voice_intake_core::{DialogueSnapshot, IssueCategory, SlotKind, UrgencyWindow};
use voice_intake_text_processing::SlotValue;

use super::{Phase, Step};

/// Per-call dialogue state
///
/// Filled slots are immutable until [`DialogueState::begin_correction`]
/// clears them; `correcting_field` then names the only slot that may be
/// refilled.
#[derive(Debug, Clone, Default)]
pub struct DialogueState {
    pub(crate) issue_text: Option<String>,
    pub(crate) issue_category: Option<IssueCategory>,
    pub(crate) car_make_model: Option<String>,
    pub(crate) car_year: Option<u16>,
    pub(crate) name: Option<String>,
    pub(crate) zip: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) urgency_window: Option<UrgencyWindow>,
    pub(crate) drivable: Option<bool>,

    pub(crate) phase: Phase,
    pub(crate) asked_followup: bool,
    pub(crate) correcting_field: Option<SlotKind>,
    pub(crate) confirmed: bool,
    record_emitted: bool,
}

impl DialogueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_text(&self) -> Option<&str> {
        self.issue_text.as_deref()
    }

    pub fn issue_category(&self) -> Option<IssueCategory> {
        self.issue_category
    }

    pub fn car_make_model(&self) -> Option<&str> {
        self.car_make_model.as_deref()
    }

    pub fn car_year(&self) -> Option<u16> {
        self.car_year
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn zip(&self) -> Option<&str> {
        self.zip.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn urgency_window(&self) -> Option<UrgencyWindow> {
        self.urgency_window
    }

    pub fn drivable(&self) -> Option<bool> {
        self.drivable
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_step(&self) -> Step {
        self.phase.current_step()
    }

    pub fn asked_followup(&self) -> bool {
        self.asked_followup
    }

    pub fn awaiting_confirmation(&self) -> bool {
        matches!(self.phase, Phase::AwaitingConfirmation { .. })
    }

    pub fn awaiting_correction_choice(&self) -> bool {
        matches!(self.phase, Phase::AwaitingCorrectionChoice)
    }

    pub fn correcting_field(&self) -> Option<SlotKind> {
        self.correcting_field
    }

    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn record_emitted(&self) -> bool {
        self.record_emitted
    }

    pub fn is_filled(&self, slot: SlotKind) -> bool {
        match slot {
            SlotKind::Issue => self.issue_text.is_some(),
            SlotKind::Car => self.car_make_model.is_some(),
            SlotKind::Name => self.name.is_some(),
            SlotKind::Zip => self.zip.is_some(),
            SlotKind::Phone => self.phone.is_some(),
            SlotKind::Urgency => self.urgency_window.is_some(),
            SlotKind::Drivable => self.drivable.is_some(),
        }
    }

    /// First unfilled slot in collection order
    pub fn next_missing(&self) -> Option<SlotKind> {
        SlotKind::ORDER.into_iter().find(|slot| !self.is_filled(*slot))
    }

    pub fn all_filled(&self) -> bool {
        self.next_missing().is_none()
    }

    /// Store an extracted value.
    ///
    /// Returns false and leaves the state untouched when the slot is already
    /// filled, or when a correction is in progress for a different slot.
    pub fn fill(&mut self, value: SlotValue) -> bool {
        let kind = value.kind();
        if self.is_filled(kind) {
            return false;
        }
        if let Some(correcting) = self.correcting_field {
            if correcting != kind {
                return false;
            }
        }

        match value {
            SlotValue::Issue { text, category } => {
                self.issue_text = Some(text);
                self.issue_category = Some(category);
            }
            SlotValue::Car { make_model, year } => {
                self.car_make_model = Some(make_model);
                self.car_year = year;
            }
            SlotValue::Name(name) => self.name = Some(name),
            SlotValue::Zip(zip) => self.zip = Some(zip),
            SlotValue::Phone(phone) => self.phone = Some(phone),
            SlotValue::Urgency(window) => self.urgency_window = Some(window),
            SlotValue::Drivable(drivable) => self.drivable = Some(drivable),
        }

        if self.correcting_field == Some(kind) {
            self.correcting_field = None;
        }
        true
    }

    /// Append the caller's follow-up elaboration to the issue text
    pub fn append_issue_detail(&mut self, detail: &str) {
        let detail = detail.trim();
        if detail.is_empty() {
            return;
        }
        match self.issue_text.as_mut() {
            Some(text) => {
                text.push_str(". ");
                text.push_str(detail);
            }
            None => self.issue_text = Some(detail.to_string()),
        }
    }

    /// Clear `slot` and make it the only refillable slot
    pub fn begin_correction(&mut self, slot: SlotKind) {
        match slot {
            SlotKind::Issue => {
                self.issue_text = None;
                self.issue_category = None;
            }
            SlotKind::Car => {
                self.car_make_model = None;
                self.car_year = None;
            }
            SlotKind::Name => self.name = None,
            SlotKind::Zip => self.zip = None,
            SlotKind::Phone => self.phone = None,
            SlotKind::Urgency => self.urgency_window = None,
            SlotKind::Drivable => self.drivable = None,
        }
        self.correcting_field = Some(slot);
        self.phase = Phase::Collecting {
            step: Step::for_slot(slot),
        };
    }

    /// Claim the single record emission. True exactly once per state.
    pub fn claim_record_emission(&mut self) -> bool {
        if self.record_emitted {
            return false;
        }
        self.record_emitted = true;
        true
    }

    pub fn snapshot(&self) -> DialogueSnapshot {
        DialogueSnapshot {
            issue_text: self.issue_text.clone(),
            issue_category: self.issue_category,
            car_make_model: self.car_make_model.clone(),
            car_year: self.car_year.map(|y| y.to_string()),
            name: self.name.clone(),
            zip: self.zip.clone(),
            phone: self.phone.clone(),
            urgency_window: self.urgency_window,
            drivable: self.drivable,
        }
    }
}
