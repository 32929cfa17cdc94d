//! Slot Value Extraction for intake calls
//!
//! One pure, stateless extractor per slot kind. Each takes the bits of
//! session state it needs ([`ExtractionContext`]) and the raw utterance and
//! returns a value or `None` ("no match"). No match is not an error; the
//! policy simply re-asks.
//!
//! Extractors sit behind the [`SlotExtractor`] trait so a model-backed
//! implementation can replace any rule-based one through
//! [`ExtractorSet::with_extractor`] without touching the state machine.
//!
//! ## Static Regex Patterns
//!
//! Patterns are compiled once using `once_cell::sync::Lazy`.

mod contact;
mod issue;
mod schedule;
mod vehicle;

pub use contact::{NameExtractor, PhoneExtractor, ZipExtractor};
pub use issue::IssueExtractor;
pub use schedule::{DrivableExtractor, UrgencyExtractor};
pub use vehicle::VehicleExtractor;

use std::collections::HashMap;
use std::sync::Arc;

use voice_intake_core::{IssueCategory, SlotKind, UrgencyWindow};

/// Session state an extractor may consult
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    /// Caller identifier from the carrier, if known
    pub caller: Option<&'a str>,
    /// Issue fragments shorter than this are rejected
    pub min_issue_chars: usize,
}

impl Default for ExtractionContext<'_> {
    fn default() -> Self {
        Self {
            caller: None,
            min_issue_chars: 6,
        }
    }
}

/// Value produced by a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    Issue {
        text: String,
        category: IssueCategory,
    },
    Car {
        make_model: String,
        year: Option<u16>,
    },
    Name(String),
    Zip(String),
    Phone(String),
    Urgency(UrgencyWindow),
    Drivable(bool),
}

impl SlotValue {
    pub fn kind(&self) -> SlotKind {
        match self {
            SlotValue::Issue { .. } => SlotKind::Issue,
            SlotValue::Car { .. } => SlotKind::Car,
            SlotValue::Name(_) => SlotKind::Name,
            SlotValue::Zip(_) => SlotKind::Zip,
            SlotValue::Phone(_) => SlotKind::Phone,
            SlotValue::Urgency(_) => SlotKind::Urgency,
            SlotValue::Drivable(_) => SlotKind::Drivable,
        }
    }
}

/// Capability interface for one slot kind
pub trait SlotExtractor: Send + Sync {
    fn kind(&self) -> SlotKind;

    fn extract(&self, ctx: &ExtractionContext<'_>, utterance: &str) -> Option<SlotValue>;
}

/// One extractor per slot kind
#[derive(Clone)]
pub struct ExtractorSet {
    extractors: HashMap<SlotKind, Arc<dyn SlotExtractor>>,
}

impl ExtractorSet {
    /// Rule-based extractors for every slot
    pub fn rule_based() -> Self {
        let all: [Arc<dyn SlotExtractor>; 7] = [
            Arc::new(IssueExtractor),
            Arc::new(VehicleExtractor),
            Arc::new(NameExtractor),
            Arc::new(ZipExtractor),
            Arc::new(PhoneExtractor),
            Arc::new(UrgencyExtractor),
            Arc::new(DrivableExtractor),
        ];

        Self {
            extractors: all.into_iter().map(|e| (e.kind(), e)).collect(),
        }
    }

    /// Swap the extractor registered for its slot kind
    pub fn with_extractor(mut self, extractor: Arc<dyn SlotExtractor>) -> Self {
        self.extractors.insert(extractor.kind(), extractor);
        self
    }

    pub fn extract(
        &self,
        kind: SlotKind,
        ctx: &ExtractionContext<'_>,
        utterance: &str,
    ) -> Option<SlotValue> {
        let value = self.extractors.get(&kind)?.extract(ctx, utterance);
        if let Some(ref v) = value {
            tracing::trace!(slot = %kind, value = ?v, "Slot extracted");
        }
        value
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::rule_based()
    }
}

impl std::fmt::Debug for ExtractorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorSet")
            .field("slots", &self.extractors.keys().collect::<Vec<_>>())
            .finish()
    }
}
