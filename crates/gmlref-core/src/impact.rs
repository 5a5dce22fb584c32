//! Rename Impact Analysis: a read-only summary of what a rename would
//! touch, independent of actually planning it.

use std::collections::HashSet;

use crate::collaborators::{Collaborators, OccurrenceKind};
use crate::ids::parse_symbol_id;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub affected_files: Vec<String>,
    pub definition_count: usize,
    pub reference_count: usize,
    pub total_occurrences: usize,
    pub dependent_symbols: Vec<String>,
    pub hot_reload_required: bool,
    pub warnings: Vec<ImpactWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImpactWarning {
    LargeRename,
    ManyDependents,
}

const LARGE_RENAME_THRESHOLD: usize = 50;
const MANY_DEPENDENTS_THRESHOLD: usize = 10;

/// Analyze the impact of renaming `symbol_id`, without validating
/// `new_name` or planning any edits.
pub fn analyze_rename_impact(symbol_id: &str, collab: &Collaborators) -> crate::error::RenameResult<ImpactAnalysis> {
    let parsed = parse_symbol_id(symbol_id)?;
    let bare_name = parsed.bare_name();

    let occurrences = collab
        .occurrences
        .map(|tracker| tracker.symbol_occurrences(bare_name))
        .unwrap_or_default();

    let mut affected_files: HashSet<String> = HashSet::new();
    let mut definition_count = 0usize;
    let mut reference_count = 0usize;
    for occ in &occurrences {
        affected_files.insert(occ.path.clone());
        match occ.kind {
            OccurrenceKind::Definition => definition_count += 1,
            OccurrenceKind::Reference => reference_count += 1,
            OccurrenceKind::Unknown => {}
        }
    }

    let dependent_symbols: Vec<String> = collab
        .dependencies
        .map(|dep| {
            dep.dependents(&[symbol_id.to_string()])
                .into_iter()
                .map(|edge| edge.symbol_id)
                .collect()
        })
        .unwrap_or_default();

    let total_occurrences = occurrences.len();
    let mut warnings = Vec::new();
    if total_occurrences > LARGE_RENAME_THRESHOLD {
        warnings.push(ImpactWarning::LargeRename);
    }
    if dependent_symbols.len() > MANY_DEPENDENTS_THRESHOLD {
        warnings.push(ImpactWarning::ManyDependents);
    }

    let mut affected_files: Vec<String> = affected_files.into_iter().collect();
    affected_files.sort();

    Ok(ImpactAnalysis {
        affected_files,
        definition_count,
        reference_count,
        total_occurrences,
        dependent_symbols,
        hot_reload_required: total_occurrences > 0,
        warnings,
    })
}
