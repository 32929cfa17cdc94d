//! Deterministic text understanding for intake calls
//!
//! This crate provides:
//! - **Slot Extraction**: one pure extractor per slot kind behind [`SlotExtractor`]
//! - **Vocabulary**: escalation, confirmation and correction-field lexicons
//! - **Categories**: issue category classification
//! - **Speech Formatting**: digit-by-digit rendering of numeric fields
//!
//! # Example
//!
//! ```
//! use voice_intake_core::SlotKind;
//! use voice_intake_text_processing::{ExtractionContext, ExtractorSet, SlotValue};
//!
//! let extractors = ExtractorSet::rule_based();
//! let ctx = ExtractionContext::default();
//! assert_eq!(
//!     extractors.extract(SlotKind::Zip, &ctx, "it's 02321"),
//!     Some(SlotValue::Zip("02321".to_string()))
//! );
//! ```

pub mod category;
pub mod normalize;
pub mod slot_extraction;
pub mod speech_format;
pub mod vocabulary;

pub use category::classify_issue;
pub use normalize::{digits_only, normalize_utterance};
pub use slot_extraction::{
    DrivableExtractor, ExtractionContext, ExtractorSet, IssueExtractor, NameExtractor,
    PhoneExtractor, SlotExtractor, SlotValue, UrgencyExtractor, VehicleExtractor, ZipExtractor,
};
pub use speech_format::{spell_digits, spell_phone};
pub use vocabulary::{
    classify_confirmation, contains_symptom, is_escalation_request, match_correction_field,
    ConfirmationReply,
};
