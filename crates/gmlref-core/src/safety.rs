//! Hot-Reload Safety: classifies a proposed rename as safe, requiring a
//! restart, or auto-fixable based on symbol kind, without ever throwing.

use crate::collaborators::Collaborators;
use crate::conflict::{detect_conflicts, ConflictKind};
use crate::ids::{self, parse_symbol_id};
use crate::planner::RenameRequest;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyResult {
    pub safe: bool,
    pub requires_restart: bool,
    pub can_auto_fix: bool,
    pub suggestions: Vec<String>,
}

impl SafetyResult {
    fn unsafe_restart(message: impl Into<String>) -> Self {
        SafetyResult {
            safe: false,
            requires_restart: true,
            can_auto_fix: false,
            suggestions: vec![message.into()],
        }
    }
}

/// Classify a rename request without performing it. Never throws: absent
/// semantics produce a guarded unsafe result with actionable suggestions.
pub fn classify_rename_safety(
    request: &RenameRequest,
    collab: &Collaborators,
) -> SafetyResult {
    if request.symbol_id.trim().is_empty() || request.new_name.trim().is_empty() {
        return SafetyResult::unsafe_restart("symbolId and newName are required");
    }

    if ids::assert_valid_identifier(&request.new_name).is_err() {
        return SafetyResult::unsafe_restart(format!(
            "'{}' is not a valid identifier",
            request.new_name
        ));
    }

    let Ok(parsed) = parse_symbol_id(&request.symbol_id) else {
        return SafetyResult::unsafe_restart(format!(
            "'{}' is not a well-formed symbol id",
            request.symbol_id
        ));
    };

    if collab.resolver.is_none() {
        return SafetyResult::unsafe_restart("no semantic analyzer injected");
    }
    let resolver = collab.resolver.unwrap();
    if !resolver.has_symbol(&request.symbol_id) {
        return SafetyResult::unsafe_restart(format!("symbol not found: {}", request.symbol_id));
    }

    let bare_name = parsed.bare_name();
    if bare_name == request.new_name {
        return SafetyResult {
            safe: false,
            requires_restart: false,
            can_auto_fix: false,
            suggestions: vec!["new name is the same as the current name".to_string()],
        };
    }

    let occurrences = collab
        .occurrences
        .map(|tracker| tracker.symbol_occurrences(bare_name))
        .unwrap_or_default();
    let conflicts = detect_conflicts(bare_name, &request.new_name, &occurrences, collab);

    if let Some(reserved) = conflicts.iter().find(|c| c.kind == ConflictKind::Reserved) {
        return SafetyResult {
            safe: false,
            requires_restart: true,
            can_auto_fix: false,
            suggestions: vec![reserved.message.clone()],
        };
    }
    if let Some(shadow) = conflicts.iter().find(|c| c.kind == ConflictKind::Shadow) {
        return SafetyResult {
            safe: false,
            requires_restart: false,
            can_auto_fix: true,
            suggestions: vec![shadow.message.clone()],
        };
    }
    if !conflicts.is_empty() {
        return SafetyResult {
            safe: false,
            requires_restart: false,
            can_auto_fix: false,
            suggestions: conflicts.iter().map(|c| c.message.clone()).collect(),
        };
    }

    match parsed.kind.as_str() {
        "script" => safe_auto_fixable(),
        "var" => safe_auto_fixable(),
        "event" => SafetyResult {
            safe: true,
            requires_restart: false,
            can_auto_fix: true,
            suggestions: vec!["event handler will be reinitialized on reload".to_string()],
        },
        "macro" | "enum" => SafetyResult {
            safe: false,
            requires_restart: false,
            can_auto_fix: true,
            suggestions: vec!["dependents must be recompiled before this takes effect".to_string()],
        },
        other => SafetyResult::unsafe_restart(format!("invalid symbol kind: {other}")),
    }
}

fn safe_auto_fixable() -> SafetyResult {
    SafetyResult {
        safe: true,
        requires_restart: false,
        can_auto_fix: true,
        suggestions: Vec::new(),
    }
}
