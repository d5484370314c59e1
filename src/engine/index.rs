//! Catalog compilation and indexing.
//!
//! This module holds the *static* side of the engine: the structures derived
//! from the validated template set that make a recognition run faster and
//! more predictable.
//!
//! Recognition is intentionally split into two phases:
//!
//! 1. **Compile/index templates** (this module): build `CompiledCatalog` with
//!    cheap per-template metadata and lookup groups.
//! 2. **Run** (see `matcher.rs`): scan the line for coarse signals
//!    (`trigger.rs`), select a candidate subset, then match, resolve, rank.
//!
//! The indexing currently supports:
//!
//! - **Buckets** (`LineBuckets`): coarse boolean features a template requires
//!   of any line it could match (digits for numeric slots, `%`/`+`/`-`/`'`
//!   characters pinned by literal fragments). A line missing a required
//!   bucket discards the template without touching its fragments.
//! - **Head words**: templates whose leading fragment pins down the line's
//!   first whitespace-delimited word are grouped under that word; the rest go
//!   to an always-checked list.
//!
//! ## Invariants
//!
//! - `TemplateIdx` is an index into the catalog's template vector; `metas`
//!   stays aligned with it.
//! - `by_head` values and `unanchored` are both sorted ascending, so a merged
//!   candidate list preserves catalog order.

use crate::catalog::{ModifierTemplate, SlotKind};
use super::trigger::LineInfo;
use std::collections::HashMap;

/// Template identifier (index into the catalog's template vector).
pub(crate) type TemplateIdx = usize;

bitflags::bitflags! {
    /// Coarse line features for fast candidate pruning.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LineBuckets: u32 {
        const HAS_DIGITS     = 1 << 0;
        const HAS_PERCENT    = 1 << 1;
        const HAS_PLUS       = 1 << 2;
        const HAS_MINUS      = 1 << 3;
        const HAS_APOSTROPHE = 1 << 4;
    }
}

/// Metadata derived from one template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateMeta {
    /// Buckets any matching line must exhibit.
    pub required: LineBuckets,
}

/// Pre-compiled candidate-retrieval index over a frozen template set.
#[derive(Debug)]
pub struct CompiledCatalog {
    metas: Vec<TemplateMeta>,
    /// Templates grouped by the first word their leading fragment pins down.
    by_head: HashMap<String, Vec<TemplateIdx>>,
    /// Templates whose leading fragment cannot pin a whole first word
    /// (effect starts with a placeholder, or `L0` is a word prefix only).
    unanchored: Vec<TemplateIdx>,
}

impl CompiledCatalog {
    /// Build the index from validated templates.
    ///
    /// Notes:
    /// - This is intentionally lightweight: no automata, no per-template
    ///   regex state; fragments are matched verbatim at run time.
    /// - Buckets are derived, not declared: literal fragments pin punctuation
    ///   the line must contain, and any numeric slot implies a digit.
    pub fn new(templates: &[ModifierTemplate]) -> Self {
        let mut metas = Vec::with_capacity(templates.len());
        let mut by_head: HashMap<String, Vec<TemplateIdx>> = HashMap::new();
        let mut unanchored = Vec::new();

        for (idx, template) in templates.iter().enumerate() {
            metas.push(TemplateMeta { required: required_buckets(template) });

            match head_word(template) {
                Some(word) => by_head.entry(word.to_owned()).or_default().push(idx),
                None => unanchored.push(idx),
            }
        }

        tracing::debug!(
            heads = by_head.len(),
            unanchored = unanchored.len(),
            templates = templates.len(),
            "catalog index built"
        );

        CompiledCatalog { metas, by_head, unanchored }
    }

    /// Ordered candidate list for a scanned line.
    ///
    /// Candidates are the union of the line's head-word group and the
    /// unanchored list, filtered by bucket requirements, in catalog order.
    /// This prunes without deciding: every returned candidate still has to
    /// survive the full anchor decomposition in `matcher.rs`.
    pub fn candidates(&self, info: &LineInfo) -> Vec<TemplateIdx> {
        let head_group = self.by_head.get(info.first_word.as_str()).map(Vec::as_slice).unwrap_or(&[]);

        // Both inputs are sorted ascending; merge to keep catalog order.
        let mut out = Vec::with_capacity(head_group.len() + self.unanchored.len());
        let (mut a, mut b) = (head_group.iter().peekable(), self.unanchored.iter().peekable());
        loop {
            let next = match (a.peek(), b.peek()) {
                (Some(&&x), Some(&&y)) => {
                    if x <= y {
                        a.next();
                        x
                    } else {
                        b.next();
                        y
                    }
                }
                (Some(&&x), None) => {
                    a.next();
                    x
                }
                (None, Some(&&y)) => {
                    b.next();
                    y
                }
                (None, None) => break,
            };
            if info.buckets.contains(self.metas[next].required) {
                out.push(next);
            }
        }

        tracing::trace!(candidates = out.len(), "candidate retrieval");
        out
    }
}

/// The first whitespace-delimited word `L0` pins down, when it pins a whole
/// word. A fragment like `"+"` only prefixes the line's first word, so it
/// cannot key a head group.
fn head_word(template: &ModifierTemplate) -> Option<&str> {
    let l0 = template.fragments[0].as_str();
    if template.is_static {
        // The whole effect is literal; its first word is the line's.
        return l0.split_whitespace().next();
    }
    let word_end = l0.find(char::is_whitespace)?;
    if word_end == 0 {
        return None;
    }
    Some(&l0[..word_end])
}

fn required_buckets(template: &ModifierTemplate) -> LineBuckets {
    let mut required = LineBuckets::empty();
    for fragment in &template.fragments {
        for ch in fragment.chars() {
            match ch {
                '%' => required |= LineBuckets::HAS_PERCENT,
                '+' => required |= LineBuckets::HAS_PLUS,
                '-' => required |= LineBuckets::HAS_MINUS,
                '\'' => required |= LineBuckets::HAS_APOSTROPHE,
                _ if ch.is_ascii_digit() => required |= LineBuckets::HAS_DIGITS,
                _ => {}
            }
        }
    }
    // Any numeric roll carries at least one digit.
    if template.slots.iter().any(|s| matches!(s.kind, SlotKind::Numeric { .. })) {
        required |= LineBuckets::HAS_DIGITS;
    }
    required
}
