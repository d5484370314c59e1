//! Load-time error types.
//!
//! Only catalog loading can fail: a malformed catalog cannot safely serve any
//! request, so every violation here is fatal and surfaces before the first
//! recognition. Per-line conditions (unrecognized input, ambiguous matches,
//! out-of-range rolls) are ordinary data on [`crate::LineOutcome`] and never
//! pass through these types.

use crate::TemplateId;
use thiserror::Error;

/// Failure to produce a frozen [`crate::Catalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog asset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to deserialize catalog asset: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] CatalogValidationError),
}

/// A malformed template record discovered during validation.
///
/// `ids` names the offending record; `position` (where present) names the
/// slot within it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogValidationError {
    #[error("record {record} declares no template ids")]
    NoIds { record: usize },

    #[error("template {ids:?}: effect text is empty")]
    EmptyEffect { ids: Vec<TemplateId> },

    #[error("template {ids:?}: effect has {placeholders} placeholder(s) but {slots} slot row(s)")]
    PlaceholderSlotMismatch { ids: Vec<TemplateId>, placeholders: usize, slots: usize },

    #[error("template {ids:?}: adjacent placeholders leave slot {position} unanchored")]
    EmptyInteriorFragment { ids: Vec<TemplateId>, position: usize },

    #[error("template {ids:?}: slot positions must be unique and contiguous from 0, got {positions:?}")]
    BadPositions { ids: Vec<TemplateId>, positions: Vec<usize> },

    #[error("template {ids:?}: slot {position} declares minRoll {min} greater than maxRoll {max}")]
    BadRange { ids: Vec<TemplateId>, position: usize, min: f64, max: f64 },

    #[error("template {ids:?}: slot {position} declares only one end of its numeric range")]
    HalfOpenRange { ids: Vec<TemplateId>, position: usize },

    #[error("template {ids:?}: slot {position} declares both a numeric range and text options")]
    ConflictingSlot { ids: Vec<TemplateId>, position: usize },

    #[error("template {ids:?}: slot {position} has neither a range nor options on a non-static template")]
    ValuelessSlot { ids: Vec<TemplateId>, position: usize },

    #[error("template {ids:?}: slot {position} option source is empty")]
    EmptyOptionSet { ids: Vec<TemplateId>, position: usize },

    #[error("template {ids:?}: slot {position} option source contains an empty token")]
    EmptyOption { ids: Vec<TemplateId>, position: usize },

    #[error("template {ids:?}: slot {position} option {token:?} is duplicated")]
    DuplicateOption { ids: Vec<TemplateId>, position: usize, token: String },

    #[error("template {ids:?}: static template carries placeholders or roll columns")]
    StaticWithValues { ids: Vec<TemplateId> },
}
