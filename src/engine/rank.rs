//! Disambiguation and ranking.
//!
//! Several templates can legitimately explain the same line — near-duplicate
//! catalog families (three "per Charge" variants sharing most of their
//! literal text) make this the common case, not the exception. Ranking picks
//! the best explanation deterministically, in strict rule order:
//!
//! 1. Fewer low-confidence (out-of-range) slots.
//! 2. Greater total literal-fragment length: a template that explains more
//!    of the line as fixed text outranks a generic one that happens to be a
//!    textual subset.
//! 3. Smaller enumerated-option-set size on any enum slot; a template with
//!    no enum slot is the least constrained and ranks last at this rule.
//! 4. Lowest numeric template id.
//!
//! A tie that survives all four rules is reported as an explicit ambiguous
//! selection carrying every tied candidate — never resolved by an arbitrary
//! pick.
//!
//! ## Same-template collapsing
//!
//! Repeated literals can decompose one line several ways under a *single*
//! template. Ambiguity is a cross-template condition, so those collapse to
//! one representative first: the attempt with the fewest out-of-range slots,
//! earliest in DFS order (leftmost anchors) on a tie.

use super::resolve::ResolvedAttempt;
use crate::catalog::Catalog;
use crate::TemplateId;
use std::cmp::Reverse;

/// Outcome of ranking: how the head of the ranked list is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Selection {
    /// No attempt survived; the line is unrecognized.
    None,
    /// The first ranked attempt is the unique best explanation.
    Unique,
    /// The first `n` ranked attempts tie after all four rules.
    Tied(usize),
}

type RankKey = (usize, Reverse<usize>, usize, TemplateId);

fn rank_key(catalog: &Catalog, attempt: &ResolvedAttempt) -> RankKey {
    let template = catalog.template(attempt.template_idx);
    (
        attempt.out_of_range,
        Reverse(template.literal_len()),
        template.smallest_option_set().unwrap_or(usize::MAX),
        template.lowest_id(),
    )
}

/// Order attempts by the four-rule key and classify the head of the list.
pub(crate) fn rank_attempts(
    catalog: &Catalog,
    resolved: Vec<ResolvedAttempt>,
) -> (Vec<ResolvedAttempt>, Selection) {
    let mut ranked: Vec<ResolvedAttempt> = Vec::with_capacity(resolved.len());
    for attempt in resolved {
        match ranked.iter_mut().find(|a| a.template_idx == attempt.template_idx) {
            Some(existing) => {
                if attempt.out_of_range < existing.out_of_range {
                    *existing = attempt;
                }
            }
            None => ranked.push(attempt),
        }
    }

    // Stable sort: catalog order is preserved among equal keys.
    ranked.sort_by_key(|a| rank_key(catalog, a));

    let selection = match ranked.len() {
        0 => Selection::None,
        1 => Selection::Unique,
        _ => {
            let best = rank_key(catalog, &ranked[0]);
            let tied = ranked.iter().take_while(|a| rank_key(catalog, a) == best).count();
            if tied > 1 {
                tracing::debug!(tied, "ranking tie after all rules");
                Selection::Tied(tied)
            } else {
                Selection::Unique
            }
        }
    };

    (ranked, selection)
}
