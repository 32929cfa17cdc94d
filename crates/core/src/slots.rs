//! Slot vocabulary shared by the extractor, the policy and the outcome record

use serde::{Deserialize, Serialize};

/// One named fact the dialogue collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Issue,
    Car,
    Name,
    Zip,
    Phone,
    Urgency,
    Drivable,
}

impl SlotKind {
    /// Fixed collection order; also the loop-prevention order
    pub const ORDER: [SlotKind; 7] = [
        SlotKind::Issue,
        SlotKind::Car,
        SlotKind::Name,
        SlotKind::Zip,
        SlotKind::Phone,
        SlotKind::Urgency,
        SlotKind::Drivable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Issue => "issue",
            SlotKind::Car => "car",
            SlotKind::Name => "name",
            SlotKind::Zip => "zip",
            SlotKind::Phone => "phone",
            SlotKind::Urgency => "urgency",
            SlotKind::Drivable => "drivable",
        }
    }
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category derived from the issue description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Brakes,
    NoStart,
    Overheating,
    Noise,
    Leak,
    Pulling,
    Tires,
    Electrical,
    Transmission,
    WarningLight,
    AirConditioning,
    #[default]
    Other,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Brakes => "brakes",
            IssueCategory::NoStart => "no_start",
            IssueCategory::Overheating => "overheating",
            IssueCategory::Noise => "noise",
            IssueCategory::Leak => "leak",
            IssueCategory::Pulling => "pulling",
            IssueCategory::Tires => "tires",
            IssueCategory::Electrical => "electrical",
            IssueCategory::Transmission => "transmission",
            IssueCategory::WarningLight => "warning_light",
            IssueCategory::AirConditioning => "air_conditioning",
            IssueCategory::Other => "other",
        }
    }
}

/// When the caller needs the work done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyWindow {
    Today,
    Tomorrow,
    ThisWeek,
    Flexible,
}

impl UrgencyWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyWindow::Today => "today",
            UrgencyWindow::Tomorrow => "tomorrow",
            UrgencyWindow::ThisWeek => "this_week",
            UrgencyWindow::Flexible => "flexible",
        }
    }

    /// Phrase used when reading the summary back to the caller
    pub fn spoken(&self) -> &'static str {
        match self {
            UrgencyWindow::Today => "as soon as possible today",
            UrgencyWindow::Tomorrow => "tomorrow",
            UrgencyWindow::ThisWeek => "sometime this week",
            UrgencyWindow::Flexible => "whenever is convenient",
        }
    }
}
