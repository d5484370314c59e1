//! Line scanning (input pre-classification).
//!
//! This module inspects the raw input line and produces coarse signals that
//! let the engine quickly decide which templates are worth decomposing.
//!
//! The scan produces two kinds of signals:
//!
//! - **Buckets** (`LineBuckets`): cheap booleans derived from the line such
//!   as "contains digits" or "contains `%`". A template whose literals or
//!   slots require a bucket the line lacks can never match it.
//! - **Head word** (`LineInfo::first_word`): the first whitespace-delimited
//!   word, used to hit the head-word groups in `CompiledCatalog`.
//!
//! ## Design notes
//!
//! - This is a *pruning* scan, not a decision: a surviving candidate still
//!   has to pass the full anchor decomposition in `matcher.rs`, so false
//!   positives cost time but never correctness.
//! - Matching is exact-text (punctuation, apostrophes, and multi-word proper
//!   names included), so the scan performs no case folding or normalization.

use super::index::LineBuckets;

/// Input characteristics detected from the raw line.
#[derive(Debug, Clone)]
pub struct LineInfo {
    pub buckets: LineBuckets,
    /// First whitespace-delimited word, verbatim. Empty for an empty line.
    pub first_word: String,
}

impl LineInfo {
    /// Scan `line` for coarse buckets and its head word.
    pub fn scan(line: &str) -> Self {
        let mut buckets = LineBuckets::empty();

        if line.bytes().any(|b| b.is_ascii_digit()) {
            buckets |= LineBuckets::HAS_DIGITS;
        }
        if line.contains('%') {
            buckets |= LineBuckets::HAS_PERCENT;
        }
        if line.contains('+') {
            buckets |= LineBuckets::HAS_PLUS;
        }
        if line.contains('-') {
            buckets |= LineBuckets::HAS_MINUS;
        }
        if line.contains('\'') {
            buckets |= LineBuckets::HAS_APOSTROPHE;
        }

        let first_word = line.split_whitespace().next().unwrap_or("").to_owned();

        LineInfo { buckets, first_word }
    }
}
