//! Roll resolution.
//!
//! Matching produces `MatchAttempt`s, which bind byte spans to slots without
//! interpreting them. Resolution turns an attempt into a `ResolvedAttempt`
//! by:
//!
//! - Parsing numeric bindings into `f64` rolls
//! - Replacing enumerated bindings with their canonical catalog token
//! - Checking declared bounds and counting out-of-range slots
//!
//! All slots of a multi-slot template resolve together as one unit. An
//! out-of-range roll *degrades* the attempt (it counts toward the ranking's
//! low-confidence rule and flips the final confidence to low) but never
//! discards it: catalog bounds reflect typical generation, not a hard
//! ceiling, and external effects can push a legitimate roll past them.
//!
//! ## Where this fits
//!
//! The matcher has already enforced binding *shape* (decimal lexing, option
//! membership), so resolution here cannot fail on well-formed attempts; the
//! `Option` return mirrors that contract defensively rather than reporting a
//! recoverable condition.

use super::index::TemplateIdx;
use super::matcher::MatchAttempt;
use crate::catalog::{ModifierTemplate, SlotKind};
use crate::{ResolvedRoll, Roll};

/// One attempt with every slot resolved to a typed roll.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedAttempt {
    pub template_idx: TemplateIdx,
    pub rolls: Vec<ResolvedRoll>,
    /// Number of numeric slots whose roll fell outside declared bounds.
    pub out_of_range: usize,
}

/// Resolve every binding of `attempt` against its template's slots.
///
/// ```text
/// MatchAttempt (spans) ──▶ resolve_attempt ──▶ ResolvedAttempt (typed rolls)
///                              └─ bounds check per numeric slot
/// ```
pub(crate) fn resolve_attempt(
    template: &ModifierTemplate,
    line: &str,
    attempt: &MatchAttempt,
) -> Option<ResolvedAttempt> {
    let mut rolls = Vec::with_capacity(template.slots.len());
    let mut out_of_range = 0;

    for (slot, binding) in template.slots.iter().zip(&attempt.bindings) {
        let bound = line.get(binding.start..binding.end)?;
        match &slot.kind {
            SlotKind::Numeric { min, max } => {
                let value = parse_decimal(bound)?;
                let in_range = value >= *min && value <= *max;
                if !in_range {
                    out_of_range += 1;
                }
                rolls.push(ResolvedRoll {
                    id: slot.id,
                    position: slot.position,
                    value: Roll::Number(value),
                    in_range,
                });
            }
            SlotKind::Enumerated { options } => {
                // Exact match; the canonical token is the catalog's copy.
                let token = options.iter().find(|option| option.as_str() == bound)?;
                rolls.push(ResolvedRoll {
                    id: slot.id,
                    position: slot.position,
                    value: Roll::Text(token.clone()),
                    in_range: true,
                });
            }
        }
    }

    tracing::trace!(template = ?template.ids, rolls = rolls.len(), out_of_range, "attempt resolved");

    Some(ResolvedAttempt { template_idx: attempt.template_idx, rolls, out_of_range })
}

/// Parse an optionally-signed decimal binding into `f64`.
pub(crate) fn parse_decimal(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}
