//! Matching and ranking engine.
//!
//! This module is the *public entry point* for the recognition engine. The
//! submodules under `src/engine/` each own one stage of the pipeline while
//! public paths stay stable (for example `crate::engine::Recognizer`).
//!
//! ## How the parts work together
//!
//! Recognizing one input line is a pipeline:
//!
//! ```text
//! templates (all) ──┐
//!                   │  CompiledCatalog::new          (index.rs)
//!                   └───────────────┬──────────────
//!                                   │
//! line ──── LineInfo::scan ─────────┼─ select candidates (head word + buckets)
//!          (trigger.rs)             │
//!                                   ▼
//!                      Matcher::match_template (matcher.rs)
//!                        - anchor L0 as prefix, Ln as suffix
//!                        - DFS over interior anchor positions
//!                        - slot-shape pruning (decimal / option token)
//!                                   │
//!                                   ▼
//!                        resolve_attempt (resolve.rs)
//!                          - typed rolls, bounds check
//!                                   │
//!                                   ▼
//!                        rank_attempts (rank.rs)
//!                          - deterministic four-rule order
//!                          - explicit ambiguity, never arbitrary picks
//! ```
//!
//! The engine leans on **exhaustive anchor search**: literal fragments can
//! legitimately recur within a line, and a more specific template's fragments
//! can be a sub-sequence of a more generic one's, so the matcher explores
//! every valid anchor combination instead of stopping at the first occurrence.
//!
//! ## Responsibilities by module
//!
//! - `index.rs`: derives `CompiledCatalog` from validated templates and builds
//!   cheap indexes (head-word groups, required bucket masks).
//! - `trigger.rs`: scans the raw line to compute coarse buckets and the head
//!   word for candidate selection.
//! - `matcher.rs`: performs the anchor DFS, producing `MatchAttempt`s, and
//!   hosts the `Recognizer` orchestrating a full run.
//! - `resolve.rs`: turns attempts into typed rolls with per-slot bounds flags.
//! - `rank.rs`: deterministic disambiguation across attempts.
//! - `metrics.rs`: optional timing/count data for runs.
//!
//! ## Adding catalog features
//!
//! - A new coarse bucket needs a `LineBuckets` bit, detection in
//!   `LineInfo::scan`, and derivation in `CompiledCatalog::new`.
//! - A new slot kind needs acceptance logic in `matcher.rs` and resolution in
//!   `resolve.rs`; ranking is slot-kind-agnostic beyond rule (3).

#[path = "engine/index.rs"]
mod index;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/rank.rs"]
mod rank;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/trigger.rs"]
mod trigger;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

#[allow(unused_imports)]
pub(crate) use index::{CompiledCatalog, LineBuckets, TemplateIdx};
#[allow(unused_imports)]
pub(crate) use matcher::{MatchAttempt, Matcher, Recognizer};
#[allow(unused_imports)]
pub(crate) use metrics::{RunCounts, RunMetrics, RunResult};
#[allow(unused_imports)]
pub(crate) use rank::Selection;
#[allow(unused_imports)]
pub(crate) use resolve::ResolvedAttempt;
#[allow(unused_imports)]
pub(crate) use trigger::LineInfo;
