//! Catalog loading, validation, and the frozen template set.
//!
//! The catalog is a static, versioned data asset: a JSON array of template
//! records with per-slot parallel columns. It is ingested exactly once, at
//! process start:
//!
//! ```text
//! records (serde) ── compile_record ──▶ ModifierTemplate (fragments + slots)
//!                          │
//!                          ├─ violations  -> CatalogValidationError (fatal)
//!                          └─ suspicions  -> CatalogWarning (retained, logged)
//!                                │
//!                                ▼
//!                     Catalog { templates, warnings, compiled index }
//! ```
//!
//! After `Catalog::from_*` returns, the catalog is frozen: no mutation path
//! exists, and the value is `Send + Sync` so it can be shared across any
//! number of concurrent recognitions without locking. Catalog changes require
//! a redeploy.
//!
//! ## Record shape
//!
//! Each record carries `ids`, `positions`, `minRolls`, `maxRolls`,
//! `textRolls` as parallel arrays (index `i` of every column describes the
//! slot owned by `ids[i]`), plus `effect` and `static`. Numeric-only
//! templates may omit `textRolls` entirely (and vice versa); a missing
//! column reads as all-null.
//!
//! ## Enumerated options
//!
//! `textRolls` sources are dash-delimited (`"Ignite-Freeze-Shock"`). They are
//! split into an ordered token set here, once, and never re-split at match
//! time. A source whose canonical option legitimately contains a literal `-`
//! cannot be told apart from two options; such entries are *flagged* as
//! [`CatalogWarning::SuspectOptionSplit`] and kept as split — guessing a
//! re-join would silently change their meaning.

use crate::engine::CompiledCatalog;
use crate::error::{CatalogError, CatalogValidationError};
use crate::TemplateId;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

/// One raw catalog record, as published in the data asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    /// One id per slot; multi-id records are multi-slot modifiers.
    pub ids: Vec<TemplateId>,
    /// Slot position owned by each id (unique, contiguous from 0).
    #[serde(default)]
    pub positions: Vec<usize>,
    #[serde(default)]
    pub min_rolls: Vec<Option<f64>>,
    #[serde(default)]
    pub max_rolls: Vec<Option<f64>>,
    /// Dash-delimited option sources for enumerated slots.
    #[serde(default)]
    pub text_rolls: Vec<Option<String>>,
    /// Display text with one `#` per wildcard slot.
    pub effect: String,
    /// Presence/absence modifier with no values to extract.
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

/// What a wildcard slot accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotKind {
    /// Optionally-signed decimal roll. `[min, max]` is the typical generation
    /// range, inclusive at both ends; values outside it still match, at low
    /// confidence.
    Numeric { min: f64, max: f64 },
    /// Exact-match token from a pre-split, ordered option set.
    Enumerated { options: Vec<String> },
}

/// One wildcard position of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// The template id this slot belongs to.
    pub id: TemplateId,
    /// Position within the template (contiguous from 0).
    pub position: usize,
    pub kind: SlotKind,
}

/// A validated, immutable catalog entry.
///
/// Templates stay flat tagged records — near-duplicate families ("per Charge"
/// variants and the like) are separate entries, and the matcher/ranker decide
/// applicability rather than any per-type code.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierTemplate {
    pub ids: Vec<TemplateId>,
    pub effect: String,
    /// Literal fragments `L0..Ln` from splitting `effect` on `#`. Slot `i`
    /// sits between `fragments[i]` and `fragments[i + 1]`.
    pub(crate) fragments: Vec<String>,
    /// Value slots in position order. Empty for static templates.
    pub slots: Vec<Slot>,
    pub is_static: bool,
}

impl ModifierTemplate {
    /// Number of `#` placeholders in `effect` (equals `slots.len()`).
    pub fn placeholder_count(&self) -> usize {
        self.fragments.len() - 1
    }

    /// Total bytes of fixed text the template pins down. Ranking prefers
    /// templates that explain more of a line as literals.
    pub(crate) fn literal_len(&self) -> usize {
        self.fragments.iter().map(|f| f.len()).sum()
    }

    /// Size of the smallest option set across enumerated slots, if any.
    pub(crate) fn smallest_option_set(&self) -> Option<usize> {
        self.slots
            .iter()
            .filter_map(|s| match &s.kind {
                SlotKind::Enumerated { options } => Some(options.len()),
                SlotKind::Numeric { .. } => None,
            })
            .min()
    }

    /// The lowest id carried by this template (final ranking tie-break).
    pub(crate) fn lowest_id(&self) -> TemplateId {
        // `ids` is validated non-empty.
        self.ids.iter().copied().min().unwrap_or(TemplateId::MAX)
    }
}

/// A data-quality suspicion raised during validation.
///
/// Warnings never abort loading; they are retained on the catalog and logged
/// via `tracing::warn!` so the asset can be fixed upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogWarning {
    /// A dash-split option token short enough to look like a proper name
    /// fractured by the delimiter. The split is kept as-is.
    SuspectOptionSplit { ids: Vec<TemplateId>, position: usize, token: String },
    /// The same id appears in more than one record. Ranking cannot break a
    /// tie between such records; matching both yields an ambiguous outcome.
    DuplicateId { id: TemplateId },
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogWarning::SuspectOptionSplit { ids, position, token } => {
                write!(f, "template {ids:?}: slot {position} option {token:?} looks like a fractured dash-split")
            }
            CatalogWarning::DuplicateId { id } => write!(f, "id {id} appears in more than one record"),
        }
    }
}

/// The frozen template set plus its candidate-retrieval index.
///
/// Built once at startup; immutable for the process lifetime.
#[derive(Debug)]
pub struct Catalog {
    templates: Vec<ModifierTemplate>,
    warnings: Vec<CatalogWarning>,
    pub(crate) compiled: CompiledCatalog,
}

impl Catalog {
    /// Validate and freeze already-deserialized records.
    ///
    /// Any malformed record aborts the whole load: a catalog that fails
    /// validation cannot safely serve any request.
    pub fn from_records(records: Vec<TemplateRecord>) -> Result<Self, CatalogError> {
        let mut templates = Vec::with_capacity(records.len());
        let mut warnings = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            templates.push(compile_record(idx, record, &mut warnings)?);
        }

        let mut seen_ids = HashSet::new();
        for template in &templates {
            for &id in &template.ids {
                if !seen_ids.insert(id) {
                    warnings.push(CatalogWarning::DuplicateId { id });
                }
            }
        }

        for warning in &warnings {
            tracing::warn!(%warning, "catalog validation warning");
        }

        let compiled = CompiledCatalog::new(&templates);
        tracing::debug!(templates = templates.len(), warnings = warnings.len(), "catalog frozen");

        Ok(Catalog { templates, warnings, compiled })
    }

    /// Deserialize a JSON array of records, then validate and freeze.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<TemplateRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Read a JSON catalog asset from `reader`.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, CatalogError> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json_str(&json)
    }

    /// Read a JSON catalog asset from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Number of templates in the catalog.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// All templates, in catalog order.
    pub fn templates(&self) -> &[ModifierTemplate] {
        &self.templates
    }

    /// Find the template that owns `id`.
    pub fn template_by_id(&self, id: TemplateId) -> Option<&ModifierTemplate> {
        self.templates.iter().find(|t| t.ids.contains(&id))
    }

    /// Validation warnings retained from loading.
    pub fn warnings(&self) -> &[CatalogWarning] {
        &self.warnings
    }

    pub(crate) fn template(&self, idx: usize) -> &ModifierTemplate {
        &self.templates[idx]
    }
}

/// Read slot `row` of a parallel column; a missing or short column reads null.
fn column<T: Clone>(col: &[Option<T>], row: usize) -> Option<T> {
    col.get(row).and_then(Clone::clone)
}

fn compile_record(
    record_idx: usize,
    record: &TemplateRecord,
    warnings: &mut Vec<CatalogWarning>,
) -> Result<ModifierTemplate, CatalogValidationError> {
    let ids = record.ids.clone();
    if ids.is_empty() {
        return Err(CatalogValidationError::NoIds { record: record_idx });
    }
    if record.effect.is_empty() {
        return Err(CatalogValidationError::EmptyEffect { ids });
    }

    let fragments: Vec<String> = record.effect.split('#').map(str::to_owned).collect();
    let placeholders = fragments.len() - 1;

    if record.is_static {
        let has_roll_columns = record.min_rolls.iter().any(Option::is_some)
            || record.max_rolls.iter().any(Option::is_some)
            || record.text_rolls.iter().any(Option::is_some);
        if placeholders != 0 || has_roll_columns {
            return Err(CatalogValidationError::StaticWithValues { ids });
        }
        return Ok(ModifierTemplate {
            ids,
            effect: record.effect.clone(),
            fragments,
            slots: Vec::new(),
            is_static: true,
        });
    }

    if ids.len() != placeholders {
        return Err(CatalogValidationError::PlaceholderSlotMismatch { placeholders, slots: ids.len(), ids });
    }

    // Two placeholders with no literal between them have no anchor; no
    // deterministic decomposition exists for such an effect.
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 && i < fragments.len() - 1 && fragment.is_empty() {
            return Err(CatalogValidationError::EmptyInteriorFragment { ids, position: i - 1 });
        }
    }

    let mut sorted_positions = record.positions.clone();
    sorted_positions.sort_unstable();
    if sorted_positions != (0..placeholders).collect::<Vec<_>>() {
        return Err(CatalogValidationError::BadPositions { ids, positions: record.positions.clone() });
    }

    let mut slots = Vec::with_capacity(placeholders);
    for position in 0..placeholders {
        // Contiguity was just checked, so every position has exactly one row.
        let row = record.positions.iter().position(|&p| p == position).unwrap_or(position);
        let id = record.ids[row];

        let min = column(&record.min_rolls, row);
        let max = column(&record.max_rolls, row);
        let text = column(&record.text_rolls, row);

        let kind = match (min, max, text) {
            (Some(_), _, Some(_)) | (None, Some(_), Some(_)) => {
                return Err(CatalogValidationError::ConflictingSlot { ids, position });
            }
            (Some(min), Some(max), None) => {
                if min > max {
                    return Err(CatalogValidationError::BadRange { ids, position, min, max });
                }
                SlotKind::Numeric { min, max }
            }
            (Some(_), None, None) | (None, Some(_), None) => {
                return Err(CatalogValidationError::HalfOpenRange { ids, position });
            }
            (None, None, Some(source)) => {
                SlotKind::Enumerated { options: split_options(&ids, position, &source, warnings)? }
            }
            (None, None, None) => {
                return Err(CatalogValidationError::ValuelessSlot { ids, position });
            }
        };

        slots.push(Slot { id, position, kind });
    }

    Ok(ModifierTemplate { ids, effect: record.effect.clone(), fragments, slots, is_static: false })
}

/// Split a dash-delimited option source into its ordered token set.
///
/// Performed once per slot at load. Tokens short enough to look like a
/// fractured proper name are flagged, not altered.
fn split_options(
    ids: &[TemplateId],
    position: usize,
    source: &str,
    warnings: &mut Vec<CatalogWarning>,
) -> Result<Vec<String>, CatalogValidationError> {
    if source.is_empty() {
        return Err(CatalogValidationError::EmptyOptionSet { ids: ids.to_vec(), position });
    }

    let mut options = Vec::new();
    for token in source.split('-') {
        if token.is_empty() {
            return Err(CatalogValidationError::EmptyOption { ids: ids.to_vec(), position });
        }
        if options.iter().any(|o| o == token) {
            return Err(CatalogValidationError::DuplicateOption {
                ids: ids.to_vec(),
                position,
                token: token.to_owned(),
            });
        }
        if token.len() <= 2 {
            warnings.push(CatalogWarning::SuspectOptionSplit {
                ids: ids.to_vec(),
                position,
                token: token.to_owned(),
            });
        }
        options.push(token.to_owned());
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_record(ids: Vec<TemplateId>, effect: &str, ranges: &[(f64, f64)]) -> TemplateRecord {
        TemplateRecord {
            ids,
            positions: (0..ranges.len()).collect(),
            min_rolls: ranges.iter().map(|r| Some(r.0)).collect(),
            max_rolls: ranges.iter().map(|r| Some(r.1)).collect(),
            text_rolls: Vec::new(),
            effect: effect.to_owned(),
            is_static: false,
        }
    }

    fn static_record(id: TemplateId, effect: &str) -> TemplateRecord {
        TemplateRecord {
            ids: vec![id],
            positions: Vec::new(),
            min_rolls: Vec::new(),
            max_rolls: Vec::new(),
            text_rolls: Vec::new(),
            effect: effect.to_owned(),
            is_static: true,
        }
    }

    #[test]
    fn compiles_numeric_and_static_records() {
        let catalog = Catalog::from_records(vec![
            numeric_record(vec![1], "#% increased Damage", &[(10.0, 120.0)]),
            static_record(317, "All Damage can Ignite"),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);

        let damage = catalog.template_by_id(1).unwrap();
        assert_eq!(damage.placeholder_count(), 1);
        assert_eq!(damage.fragments, vec!["", "% increased Damage"]);
        assert_eq!(damage.slots[0].kind, SlotKind::Numeric { min: 10.0, max: 120.0 });

        let ignite = catalog.template_by_id(317).unwrap();
        assert!(ignite.is_static);
        assert!(ignite.slots.is_empty());
        assert_eq!(ignite.placeholder_count(), 0);
    }

    #[test]
    fn splits_options_once_in_order() {
        let record = TemplateRecord {
            ids: vec![86],
            positions: vec![0],
            min_rolls: vec![None],
            max_rolls: vec![None],
            text_rolls: vec![Some("Ignite-Freeze-Shock".to_owned())],
            effect: "Hits always #".to_owned(),
            is_static: false,
        };
        let catalog = Catalog::from_records(vec![record]).unwrap();
        let slot = &catalog.template_by_id(86).unwrap().slots[0];
        assert_eq!(
            slot.kind,
            SlotKind::Enumerated { options: vec!["Ignite".into(), "Freeze".into(), "Shock".into()] }
        );
        assert!(catalog.warnings().is_empty());
    }

    #[test]
    fn placeholder_slot_mismatch_fails_loading() {
        // Two placeholders but a single slot row.
        let err = Catalog::from_records(vec![numeric_record(vec![85], "#% chance to #", &[(21.0, 23.0)])])
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(CatalogValidationError::PlaceholderSlotMismatch {
                placeholders: 2,
                slots: 1,
                ..
            })
        ));
    }

    #[test]
    fn bad_range_fails_loading() {
        let err =
            Catalog::from_records(vec![numeric_record(vec![9], "# Mana", &[(50.0, 10.0)])]).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(CatalogValidationError::BadRange { .. })));
    }

    #[test]
    fn half_open_range_fails_loading() {
        let record = TemplateRecord {
            ids: vec![9],
            positions: vec![0],
            min_rolls: vec![Some(10.0)],
            max_rolls: vec![None],
            text_rolls: Vec::new(),
            effect: "# Mana".to_owned(),
            is_static: false,
        };
        let err = Catalog::from_records(vec![record]).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(CatalogValidationError::HalfOpenRange { .. })));
    }

    #[test]
    fn empty_option_set_fails_loading() {
        let record = TemplateRecord {
            ids: vec![12],
            positions: vec![0],
            min_rolls: vec![None],
            max_rolls: vec![None],
            text_rolls: vec![Some(String::new())],
            effect: "Cannot be #".to_owned(),
            is_static: false,
        };
        let err = Catalog::from_records(vec![record]).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(CatalogValidationError::EmptyOptionSet { .. })));
    }

    #[test]
    fn duplicate_positions_fail_loading() {
        let mut record = numeric_record(vec![20, 21], "Adds # to # Damage", &[(1.0, 5.0), (6.0, 12.0)]);
        record.positions = vec![0, 0];
        let err = Catalog::from_records(vec![record]).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(CatalogValidationError::BadPositions { .. })));
    }

    #[test]
    fn adjacent_placeholders_fail_loading() {
        let err = Catalog::from_records(vec![numeric_record(
            vec![30, 31],
            "Adds ## Damage",
            &[(1.0, 5.0), (6.0, 12.0)],
        )])
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(CatalogValidationError::EmptyInteriorFragment { position: 0, .. })
        ));
    }

    #[test]
    fn valueless_slot_on_non_static_fails_loading() {
        let record = TemplateRecord {
            ids: vec![40],
            positions: vec![0],
            min_rolls: vec![None],
            max_rolls: vec![None],
            text_rolls: vec![None],
            effect: "# to Dexterity".to_owned(),
            is_static: false,
        };
        let err = Catalog::from_records(vec![record]).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(CatalogValidationError::ValuelessSlot { .. })));
    }

    #[test]
    fn static_with_placeholder_fails_loading() {
        let err = Catalog::from_records(vec![static_record(318, "Gains # Charges")]).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(CatalogValidationError::StaticWithValues { .. })));
    }

    #[test]
    fn suspect_dash_split_is_flagged_not_altered() {
        let record = TemplateRecord {
            ids: vec![55],
            positions: vec![0],
            min_rolls: vec![None],
            max_rolls: vec![None],
            // "Al-Hezmin" is one proper name in the source material; the
            // naive split fractures it. Validation flags it and keeps the
            // split semantics.
            text_rolls: vec![Some("Al-Hezmin-Baran".to_owned())],
            effect: "Drops # items".to_owned(),
            is_static: false,
        };
        let catalog = Catalog::from_records(vec![record]).unwrap();
        assert_eq!(
            catalog.warnings(),
            &[CatalogWarning::SuspectOptionSplit { ids: vec![55], position: 0, token: "Al".to_owned() }]
        );
        let slot = &catalog.template_by_id(55).unwrap().slots[0];
        assert_eq!(
            slot.kind,
            SlotKind::Enumerated { options: vec!["Al".into(), "Hezmin".into(), "Baran".into()] }
        );
    }

    #[test]
    fn duplicate_ids_warn_but_load() {
        let catalog = Catalog::from_records(vec![
            numeric_record(vec![99], "#% more Damage", &[(5.0, 15.0)]),
            numeric_record(vec![99], "#% more Damage", &[(5.0, 15.0)]),
        ])
        .unwrap();
        assert_eq!(catalog.warnings(), &[CatalogWarning::DuplicateId { id: 99 }]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn from_json_str_reads_published_field_names() {
        let json = r##"[
            {
                "ids": [85, 86],
                "positions": [0, 1],
                "minRolls": [21, null],
                "maxRolls": [23, null],
                "textRolls": [null, "Ignite-Freeze-Shock"],
                "effect": "#% chance to #",
                "static": false
            },
            { "ids": [317], "effect": "All Damage can Ignite", "static": true }
        ]"##;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 2);

        let chance = catalog.template_by_id(85).unwrap();
        assert_eq!(chance.ids, vec![85, 86]);
        assert_eq!(chance.slots[0].kind, SlotKind::Numeric { min: 21.0, max: 23.0 });
        assert!(matches!(chance.slots[1].kind, SlotKind::Enumerated { .. }));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = Catalog::from_json_str("not json").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }
}
