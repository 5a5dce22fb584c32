//! Batch rename planning (§ Batch Planner).

use std::collections::HashSet;

use crate::collaborators::Collaborators;
use crate::conflict::{detect_circular_renames, validate_workspace_edit, RenamePair};
use crate::error::{RenameError, RenameResult};
use crate::ids::assert_valid_identifier;
use crate::planner::{plan_rename, RenamePlan, RenameRequest};
use crate::workspace_edit::WorkspaceEdit;

use serde::Serialize;

/// The merged result of planning every rename in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPlan {
    pub edit: WorkspaceEdit,
    pub plans: Vec<RenamePlan>,
}

/// Plan a batch of renames:
/// 1. Reject an empty batch.
/// 2. Reject duplicate source symbol ids.
/// 3. Reject duplicate normalized target names.
/// 4. Reject circular rename chains.
/// 5. Plan each rename independently (fail-fast on the first error).
/// 6. Merge all Workspace Edits and revalidate for cross-member overlap.
pub fn plan_batch_rename(
    requests: &[RenameRequest],
    collab: &Collaborators,
) -> RenameResult<BatchPlan> {
    if requests.is_empty() {
        return Err(RenameError::invalid_argument("batch must not be empty"));
    }

    let mut seen_symbols: HashSet<&str> = HashSet::new();
    for req in requests {
        if !seen_symbols.insert(req.symbol_id.as_str()) {
            return Err(RenameError::DuplicateSymbol {
                symbol_id: req.symbol_id.clone(),
            });
        }
    }

    let mut seen_targets: HashSet<String> = HashSet::new();
    for req in requests {
        // Syntax errors on individual targets are surfaced by the
        // per-request plan below; skip normalization failures here.
        if assert_valid_identifier(&req.new_name).is_err() {
            continue;
        }
        let normalized = req.new_name.to_lowercase();
        if !seen_targets.insert(normalized) {
            return Err(RenameError::DuplicateTarget {
                name: req.new_name.clone(),
            });
        }
    }

    let pairs: Vec<RenamePair> = requests
        .iter()
        .map(|r| RenamePair {
            symbol_id: r.symbol_id.clone(),
            new_name: r.new_name.clone(),
        })
        .collect();
    if let Some(cycle) = detect_circular_renames(&pairs) {
        return Err(RenameError::CycleInBatch { chain: cycle });
    }

    let mut plans = Vec::with_capacity(requests.len());
    let mut merged = WorkspaceEdit::new();
    for req in requests {
        let plan = plan_rename(req, collab)?;
        merged.extend(plan.edit.clone());
        plans.push(plan);
    }

    let summary = validate_workspace_edit(&merged, collab);
    if !summary.valid {
        return Err(RenameError::Overlap {
            file: summary.errors.join("; "),
            first_start: 0,
            first_end: 0,
            second_start: 0,
            second_end: 0,
        });
    }

    Ok(BatchPlan {
        edit: merged,
        plans,
    })
}
