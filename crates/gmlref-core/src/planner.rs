//! Single-symbol rename planning (§ Rename Planner).

use crate::collaborators::Collaborators;
use crate::conflict::{detect_conflicts, Conflict};
use crate::error::{RenameError, RenameResult};
use crate::ids::{self, parse_symbol_id};
use crate::workspace_edit::WorkspaceEdit;

use serde::{Deserialize, Serialize};

/// `(symbolId, newName)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub symbol_id: String,
    pub new_name: String,
}

/// A successful plan: the edit to apply plus any non-fatal warnings
/// surfaced along the way (currently unused but kept for symmetry with
/// `ValidationSummary`-shaped callers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePlan {
    pub edit: WorkspaceEdit,
    pub conflicts: Vec<Conflict>,
}

/// Plan a single rename:
/// 1. Validate request shape and `newName` syntax.
/// 2. Confirm the symbol exists.
/// 3. Reject a no-op rename (`SameName`).
/// 4. Gather occurrences for the bare name.
/// 5. Detect conflicts; any conflict fails the plan.
/// 6. Emit a Workspace Edit with one text edit per occurrence.
pub fn plan_rename(request: &RenameRequest, collab: &Collaborators) -> RenameResult<RenamePlan> {
    if request.symbol_id.trim().is_empty() {
        return Err(RenameError::invalid_argument("symbolId must not be empty"));
    }
    ids::assert_valid_identifier(&request.new_name)?;

    let parsed = parse_symbol_id(&request.symbol_id)?;

    if let Some(resolver) = collab.resolver {
        if !resolver.has_symbol(&request.symbol_id) {
            return Err(RenameError::MissingSymbol {
                symbol_id: request.symbol_id.clone(),
            });
        }
    }

    let bare_name = parsed.bare_name();
    if bare_name == request.new_name {
        return Err(RenameError::SameName {
            name: request.new_name.clone(),
        });
    }

    let occurrences = collab
        .occurrences
        .map(|tracker| tracker.symbol_occurrences(bare_name))
        .unwrap_or_default();

    let conflicts = detect_conflicts(bare_name, &request.new_name, &occurrences, collab);
    if !conflicts.is_empty() {
        let messages = conflicts.iter().map(|c| c.message.clone()).collect();
        return Err(RenameError::Conflict { messages });
    }

    let mut edit = WorkspaceEdit::new();
    for occ in &occurrences {
        edit.add_edit(occ.path.clone(), occ.start, occ.end, request.new_name.clone());
    }

    Ok(RenamePlan { edit, conflicts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Occurrence, OccurrenceKind, OccurrenceTracker, SymbolResolver};

    struct FixtureResolver {
        known: Vec<String>,
    }
    impl SymbolResolver for FixtureResolver {
        fn has_symbol(&self, symbol_id: &str) -> bool {
            self.known.iter().any(|k| k == symbol_id)
        }
        fn lookup(&self, _name: &str, _scope_id: Option<&str>) -> Option<crate::collaborators::Binding> {
            None
        }
    }

    struct FixtureOccurrences {
        by_name: std::collections::HashMap<String, Vec<Occurrence>>,
    }
    impl OccurrenceTracker for FixtureOccurrences {
        fn symbol_occurrences(&self, bare_name: &str) -> Vec<Occurrence> {
            self.by_name.get(bare_name).cloned().unwrap_or_default()
        }
    }

    fn hp_occurrences() -> FixtureOccurrences {
        let mut by_name = std::collections::HashMap::new();
        by_name.insert(
            "hp".to_string(),
            vec![
                Occurrence {
                    path: "a.gml".to_string(),
                    start: 10,
                    end: 12,
                    scope_id: None,
                    kind: OccurrenceKind::Reference,
                },
                Occurrence {
                    path: "b.gml".to_string(),
                    start: 3,
                    end: 5,
                    scope_id: None,
                    kind: OccurrenceKind::Reference,
                },
                Occurrence {
                    path: "a.gml".to_string(),
                    start: 40,
                    end: 42,
                    scope_id: None,
                    kind: OccurrenceKind::Reference,
                },
            ],
        );
        FixtureOccurrences { by_name }
    }

    #[test]
    fn plans_simple_rename_s1() {
        let resolver = FixtureResolver {
            known: vec!["gml/var/hp".to_string()],
        };
        let occurrences = hp_occurrences();
        let collab = Collaborators {
            resolver: Some(&resolver),
            occurrences: Some(&occurrences),
            ..Collaborators::new()
        };
        let request = RenameRequest {
            symbol_id: "gml/var/hp".to_string(),
            new_name: "health".to_string(),
        };
        let plan = plan_rename(&request, &collab).unwrap();
        let grouped = plan.edit.group_by_file();
        let a = &grouped["a.gml"];
        assert_eq!((a[0].start, a[0].end), (40, 42));
        assert_eq!((a[1].start, a[1].end), (10, 12));
        assert_eq!(grouped["b.gml"][0].new_text, "health");
    }

    #[test]
    fn rejects_missing_symbol() {
        let resolver = FixtureResolver { known: vec![] };
        let collab = Collaborators {
            resolver: Some(&resolver),
            ..Collaborators::new()
        };
        let request = RenameRequest {
            symbol_id: "gml/var/hp".to_string(),
            new_name: "health".to_string(),
        };
        let err = plan_rename(&request, &collab).unwrap_err();
        assert!(matches!(err, RenameError::MissingSymbol { .. }));
    }

    #[test]
    fn rejects_same_name() {
        let collab = Collaborators::new();
        let request = RenameRequest {
            symbol_id: "gml/var/hp".to_string(),
            new_name: "hp".to_string(),
        };
        let err = plan_rename(&request, &collab).unwrap_err();
        assert!(matches!(err, RenameError::SameName { .. }));
    }

    #[test]
    fn rejects_reserved_target_s3() {
        let collab = Collaborators::new();
        let request = RenameRequest {
            symbol_id: "gml/script/foo".to_string(),
            new_name: "return".to_string(),
        };
        let err = plan_rename(&request, &collab).unwrap_err();
        match err {
            RenameError::Conflict { messages } => {
                assert_eq!(messages.len(), 1);
                assert!(messages[0].contains("reserved"));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_new_name() {
        let collab = Collaborators::new();
        let request = RenameRequest {
            symbol_id: "gml/var/hp".to_string(),
            new_name: "2bad".to_string(),
        };
        assert!(matches!(
            plan_rename(&request, &collab).unwrap_err(),
            RenameError::InvalidIdentifier { .. }
        ));
    }
}
