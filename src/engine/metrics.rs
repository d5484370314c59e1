//! Engine run metrics.
//!
//! A small set of structs used to observe and debug engine behavior. Metrics
//! are intentionally simple and *opt-in*:
//!
//! - [`crate::recognize_with`] discards them after timing the run.
//! - [`crate::recognize_verbose_with`] surfaces them for profiling and for
//!   debugging near-duplicate template ranking.
//!
//! Stage boundaries mirror the pipeline: retrieval (scan + candidate
//! lookup), matching (anchor DFS), resolve (typed rolls), rank.

use super::rank::Selection;
use super::resolve::ResolvedAttempt;
use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

/// Per-stage timings for one recognition run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunMetrics {
    /// Total elapsed time for the run.
    pub total: Duration,
    /// Line scan + candidate retrieval.
    pub retrieval: Duration,
    /// Anchor matching across all candidates.
    pub matching: Duration,
    /// Roll resolution.
    pub resolve: Duration,
    /// Ranking and selection.
    pub rank: Duration,
}

/// Work counts for one recognition run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunCounts {
    /// Candidate templates that survived retrieval.
    pub candidates: usize,
    /// Match attempts produced by the anchor search.
    pub attempts: usize,
}

/// Engine output bundled with timing information.
#[derive(Debug)]
pub struct RunResult {
    /// All resolved attempts, best first.
    pub ranked: Vec<ResolvedAttempt>,
    /// How the head of `ranked` is to be read.
    pub selection: Selection,
    pub counts: RunCounts,
    pub metrics: RunMetrics,
}
