//! Anchor matching and the recognition driver.
//!
//! This module is the operational core of the engine:
//!
//! - Decompose a line against each candidate template's literal fragments,
//!   exploring every valid anchor combination (bounded backtracking).
//! - Prune bindings early by slot shape (decimal lexing, option-set
//!   membership) so the search never carries a dead branch.
//! - Orchestrate a full run (`Recognizer`): retrieval, matching, resolution,
//!   ranking, with per-stage timings.
//!
//! ## Key concepts
//!
//! - **Fragments** (`ModifierTemplate::fragments`): the literals `L0..Ln`
//!   around a template's `#` placeholders. `L0` must prefix the line, `Ln`
//!   must suffix it, and each interior `Li` anchors somewhere after the
//!   previous anchor.
//! - **Binding**: the substring between two consecutive anchors, assigned to
//!   the slot that sits between those fragments. Bindings are non-empty — a
//!   roll always has text.
//! - **MatchAttempt**: one complete, shape-valid assignment of bindings to
//!   all slots of one template.
//!
//! ## Why backtracking
//!
//! Literal fragments can legitimately recur within a line, and a more
//! specific template's fragments can be a sub-sequence of a more generic
//! one's. A greedy first-occurrence strategy binds the wrong span in exactly
//! those cases, so the matcher runs a stack-based DFS over anchor choices:
//!
//! ```text
//! [L0 ok] --anchor L1 @ i--> [slot0 bound] --anchor L2 @ j--> [complete]
//!    │                            │
//!    └─ anchor L1 @ i' ...        └─ (backtracks)
//! ```
//!
//! The search is bounded by line length × anchor positions per fragment; a
//! caller worried about adversarial input can cap expansions via
//! [`Options::max_anchor_combinations`].

use super::index::TemplateIdx;
use super::metrics::{RunCounts, RunMetrics, RunResult};
use super::rank::rank_attempts;
use super::resolve::resolve_attempt;
use super::trigger::LineInfo;
use crate::catalog::{Catalog, ModifierTemplate, Slot, SlotKind};
use crate::{Options, Range};
use std::time::Instant;

/// One complete binding of a line's substrings to one template's slots,
/// prior to value resolution and ranking.
#[derive(Debug, Clone)]
pub(crate) struct MatchAttempt {
    pub template_idx: TemplateIdx,
    /// Byte span bound to each slot, in slot order.
    pub bindings: Vec<Range>,
}

/// A partially anchored decomposition as the DFS advances through the
/// fragment list.
///
/// ```text
/// fragments: ["", "% chance to ", ""]
///                 ^ next_fragment (1) once L0 ("", trivially) is anchored
///
/// bindings: []    position: 0  ── anchor "% chance to " at 2 ──▶
/// bindings: [0..2] position: 14
/// ```
struct PartialBinding {
    next_fragment: usize,
    /// End of the last consumed anchor (next binding starts here).
    position: usize,
    bindings: Vec<Range>,
}

/// Matches one line against candidate templates.
pub(crate) struct Matcher<'a> {
    line: &'a str,
    /// Cap on DFS expansions per template, if the caller imposed one.
    budget: Option<usize>,
}

impl<'a> Matcher<'a> {
    pub fn new(line: &'a str, options: &Options) -> Self {
        Matcher { line, budget: options.max_anchor_combinations }
    }

    /// Every shape-valid decomposition of the line under `template`.
    ///
    /// Attempts come out in DFS order: leftmost anchor choices first. A line
    /// with no decomposition yields an empty vector — that is an ordinary
    /// outcome, not an error.
    pub fn match_template(&self, idx: TemplateIdx, template: &ModifierTemplate) -> Vec<MatchAttempt> {
        if template.is_static {
            return if self.line == template.effect {
                vec![MatchAttempt { template_idx: idx, bindings: Vec::new() }]
            } else {
                Vec::new()
            };
        }

        let fragments = &template.fragments;
        if !self.line.starts_with(fragments[0].as_str()) {
            return Vec::new();
        }

        let mut attempts = Vec::new();
        let mut budget = self.budget;
        let mut stack =
            vec![PartialBinding { next_fragment: 1, position: fragments[0].len(), bindings: Vec::new() }];

        while let Some(partial) = stack.pop() {
            if partial.next_fragment == fragments.len() {
                attempts.push(MatchAttempt { template_idx: idx, bindings: partial.bindings });
                continue;
            }

            let fragment = fragments[partial.next_fragment].as_str();
            let is_last = partial.next_fragment == fragments.len() - 1;
            let slot = &template.slots[partial.next_fragment - 1];

            if is_last && fragment.is_empty() {
                // Effect ends with a placeholder: the final slot runs to the
                // end of the line.
                let binding = Range { start: partial.position, end: self.line.len() };
                if self.slot_accepts(slot, &binding) {
                    attempts.push(MatchAttempt {
                        template_idx: idx,
                        bindings: with_binding(partial.bindings, binding),
                    });
                }
                continue;
            }

            // Bindings are non-empty, so the anchor starts at position + 1 at
            // the earliest. Occurrences may overlap; all are explored.
            let anchors = occurrences_from(self.line, fragment, next_boundary(self.line, partial.position));

            // Push in reverse so the stack pops leftmost anchors first.
            for at in anchors.into_iter().rev() {
                if is_last && at + fragment.len() != self.line.len() {
                    continue;
                }
                let binding = Range { start: partial.position, end: at };
                if !self.slot_accepts(slot, &binding) {
                    continue;
                }
                if let Some(remaining) = budget.as_mut() {
                    if *remaining == 0 {
                        tracing::debug!(
                            template = ?template.ids,
                            "anchor budget exhausted, truncating search"
                        );
                        return attempts;
                    }
                    *remaining -= 1;
                }
                stack.push(PartialBinding {
                    next_fragment: partial.next_fragment + 1,
                    position: at + fragment.len(),
                    bindings: with_binding(partial.bindings.clone(), binding),
                });
            }
        }

        attempts
    }

    /// Shape check for a candidate binding: numeric slots must lex as an
    /// optionally-signed decimal, enumerated slots must equal one option
    /// token exactly. Value-level checks (bounds) happen at resolution.
    fn slot_accepts(&self, slot: &Slot, binding: &Range) -> bool {
        if binding.end <= binding.start {
            return false;
        }
        let Some(bound) = self.line.get(binding.start..binding.end) else {
            return false;
        };
        match &slot.kind {
            SlotKind::Numeric { .. } => {
                regex!(r"^[+-]?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)$").is_match(bound)
            }
            SlotKind::Enumerated { options } => options.iter().any(|option| option == bound),
        }
    }
}

fn with_binding(mut bindings: Vec<Range>, binding: Range) -> Vec<Range> {
    bindings.push(binding);
    bindings
}

/// Byte index of the first char boundary strictly after `at`.
fn next_boundary(s: &str, at: usize) -> usize {
    let mut next = at + 1;
    while next < s.len() && !s.is_char_boundary(next) {
        next += 1;
    }
    next
}

/// Every occurrence of `needle` in `haystack` starting at or after `from`,
/// overlapping occurrences included (`str::match_indices` skips those).
fn occurrences_from(haystack: &str, needle: &str, mut from: usize) -> Vec<usize> {
    let mut out = Vec::new();
    while from <= haystack.len() {
        let Some(found) = haystack.get(from..).and_then(|rest| rest.find(needle)) else {
            break;
        };
        let at = from + found;
        out.push(at);
        from = next_boundary(haystack, at);
    }
    out
}

/// Recognizes lines against a frozen catalog.
///
/// Usage: create once with `Recognizer::new(&catalog)`, then call
/// [`run_with_metrics`] per line. The recognizer borrows the catalog and
/// holds no mutable state, so one instance serves concurrent callers.
///
/// High-level flow inside a run:
///
/// ```text
/// scan ──▶ candidates ──▶ match_template* ──▶ resolve_attempt* ──▶ rank
/// ```
pub(crate) struct Recognizer<'a> {
    catalog: &'a Catalog,
}

impl<'a> Recognizer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Recognizer { catalog }
    }

    /// Run the full pipeline for one line and return per-stage timings.
    pub fn run_with_metrics(&self, line: &str, options: &Options) -> RunResult {
        let total_start = Instant::now();

        let retrieval_start = Instant::now();
        let info = LineInfo::scan(line);
        let candidates = self.catalog.compiled.candidates(&info);
        let retrieval = retrieval_start.elapsed();

        let matching_start = Instant::now();
        let matcher = Matcher::new(line, options);
        let mut attempts = Vec::new();
        for &idx in &candidates {
            attempts.extend(matcher.match_template(idx, self.catalog.template(idx)));
        }
        let matching = matching_start.elapsed();
        let attempt_count = attempts.len();

        let resolve_start = Instant::now();
        let resolved = attempts
            .iter()
            .filter_map(|attempt| resolve_attempt(self.catalog.template(attempt.template_idx), line, attempt))
            .collect();
        let resolve = resolve_start.elapsed();

        let rank_start = Instant::now();
        let (ranked, selection) = rank_attempts(self.catalog, resolved);
        let rank = rank_start.elapsed();

        tracing::trace!(
            candidates = candidates.len(),
            attempts = attempt_count,
            ranked = ranked.len(),
            ?selection,
            "recognition run"
        );

        RunResult {
            counts: RunCounts { candidates: candidates.len(), attempts: attempt_count },
            ranked,
            selection,
            metrics: RunMetrics { total: total_start.elapsed(), retrieval, matching, resolve, rank },
        }
    }
}
