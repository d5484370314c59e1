use crate::catalog::Catalog;
use crate::engine::{Recognizer, ResolvedAttempt, RunResult, Selection};
use crate::{Roll, TemplateId};
use std::time::Duration;

/// Options that affect matching behavior.
///
/// The default is fully unguarded: the anchor search is already bounded by
/// line length × template count × anchor combinations, so the cap exists for
/// callers feeding adversarial input, not for normal operation.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Cap on anchor-search expansions per template. When the cap is hit the
    /// search truncates deterministically (leftmost decompositions are kept).
    pub max_anchor_combinations: Option<usize>,
}

/// Confidence of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Normal,
    /// At least one numeric roll fell outside its declared bounds. Catalog
    /// bounds reflect typical generation, so the match stands, flagged.
    Low,
}

/// One resolved slot of a matched template.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoll {
    /// The template id owning this slot.
    pub id: TemplateId,
    /// Slot position within the template.
    pub position: usize,
    pub value: Roll,
    /// False when a numeric roll fell outside declared bounds.
    pub in_range: bool,
}

/// The finalized, ranked, resolved result of matching one line.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierInstance {
    /// Template id(s); one per slot for multi-slot modifiers.
    pub ids: Vec<TemplateId>,
    /// Resolved values in slot order. Empty for static templates, whose
    /// whole-line match is itself the complete observation.
    pub rolls: Vec<ResolvedRoll>,
    /// The source line, verbatim.
    pub line: String,
    pub confidence: Confidence,
}

/// Per-line outcome. Recoverable conditions are data, not errors: an
/// unrecognized or ambiguous line never aborts its batch.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Exactly one template best explains the line.
    Matched(ModifierInstance),
    /// Two or more templates tie after full ranking; all tied candidates are
    /// carried for caller-level resolution.
    Ambiguous(Vec<ModifierInstance>),
    /// No template structurally matches the line.
    Unrecognized,
}

impl LineOutcome {
    /// The single best instance, when the line matched unambiguously.
    pub fn instance(&self) -> Option<&ModifierInstance> {
        match self {
            LineOutcome::Matched(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, LineOutcome::Unrecognized)
    }
}

/// Result from [`recognize`] and [`recognize_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    /// The recognized input line.
    pub line: String,
    pub outcome: LineOutcome,
    /// Total elapsed time spent matching + resolving + ranking.
    pub elapsed: Duration,
}

/// Additional details returned by [`recognize_verbose_with`].
///
/// This is intentionally compact: it is meant for debugging near-duplicate
/// template ranking and for performance inspection without dumping the
/// engine's internal state.
#[derive(Debug, Clone)]
pub struct RecognitionDetails {
    /// Total elapsed time.
    pub total: Duration,
    /// Line scan + candidate retrieval.
    pub retrieval: Duration,
    /// Anchor matching across all candidates.
    pub matching: Duration,
    /// Roll resolution.
    pub resolve: Duration,
    /// Ranking and selection.
    pub rank: Duration,
    /// Candidate templates that survived retrieval.
    pub candidates: usize,
    /// Match attempts produced by the anchor search.
    pub attempts: usize,
    /// Every surviving candidate as an instance, best first, before final
    /// selection.
    pub ranked: Vec<ModifierInstance>,
}

/// Result from [`recognize_verbose_with`].
#[derive(Debug, Clone)]
pub struct RecognitionResultVerbose {
    pub line: String,
    pub outcome: LineOutcome,
    pub elapsed: Duration,
    pub details: RecognitionDetails,
}

/// Recognize `line` against `catalog` with default [`Options`].
///
/// # Example
/// ```
/// use modlex::{Catalog, LineOutcome, recognize};
///
/// let catalog = Catalog::from_json_str(
///     r#"[{"ids": [165], "positions": [0], "minRolls": [40], "maxRolls": [40],
///          "effect": "+# to Armour"}]"#,
/// )
/// .unwrap();
///
/// let result = recognize(&catalog, "+40 to Armour");
/// let instance = result.outcome.instance().unwrap();
/// assert_eq!(instance.ids, vec![165]);
/// assert_eq!(instance.rolls[0].value.as_number(), Some(40.0));
/// ```
pub fn recognize(catalog: &Catalog, line: &str) -> RecognitionResult {
    recognize_with(catalog, line, &Options::default())
}

/// Recognize `line` against `catalog` with the provided `options`.
pub fn recognize_with(catalog: &Catalog, line: &str, options: &Options) -> RecognitionResult {
    let run = Recognizer::new(catalog).run_with_metrics(line, options);
    RecognitionResult {
        line: line.to_owned(),
        outcome: outcome_from_run(catalog, line, &run),
        elapsed: run.metrics.total,
    }
}

/// Recognize a batch of lines, one outcome per line.
///
/// Lines are independent: an unrecognized or ambiguous line never affects
/// its siblings, and the shared catalog is read-only throughout.
pub fn recognize_batch<I, S>(catalog: &Catalog, lines: I, options: &Options) -> Vec<RecognitionResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().map(|line| recognize_with(catalog, line.as_ref(), options)).collect()
}

/// Recognize `line` and return extra (compact) debug details.
///
/// Useful for profiling and for inspecting why one of several near-identical
/// templates won. The plain [`recognize_with`] path does not allocate the
/// ranked candidate list.
pub fn recognize_verbose_with(catalog: &Catalog, line: &str, options: &Options) -> RecognitionResultVerbose {
    let run = Recognizer::new(catalog).run_with_metrics(line, options);
    let outcome = outcome_from_run(catalog, line, &run);

    let details = RecognitionDetails {
        total: run.metrics.total,
        retrieval: run.metrics.retrieval,
        matching: run.metrics.matching,
        resolve: run.metrics.resolve,
        rank: run.metrics.rank,
        candidates: run.counts.candidates,
        attempts: run.counts.attempts,
        ranked: run.ranked.iter().map(|attempt| to_instance(catalog, line, attempt)).collect(),
    };

    RecognitionResultVerbose { line: line.to_owned(), outcome, elapsed: run.metrics.total, details }
}

fn outcome_from_run(catalog: &Catalog, line: &str, run: &RunResult) -> LineOutcome {
    match run.selection {
        Selection::None => LineOutcome::Unrecognized,
        Selection::Unique => LineOutcome::Matched(to_instance(catalog, line, &run.ranked[0])),
        Selection::Tied(n) => {
            LineOutcome::Ambiguous(run.ranked[..n].iter().map(|a| to_instance(catalog, line, a)).collect())
        }
    }
}

fn to_instance(catalog: &Catalog, line: &str, attempt: &ResolvedAttempt) -> ModifierInstance {
    let template = catalog.template(attempt.template_idx);
    let confidence = if attempt.out_of_range > 0 { Confidence::Low } else { Confidence::Normal };
    ModifierInstance {
        ids: template.ids.clone(),
        rolls: attempt.rolls.clone(),
        line: line.to_owned(),
        confidence,
    }
}
