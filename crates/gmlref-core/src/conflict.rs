//! Conflict detection for a single rename, structural validation of a
//! Workspace Edit, and circular-rename detection across a batch.

use crate::collaborators::{keyword_set, Collaborators, Occurrence};
use crate::ids::{self, default_reserved_set, is_reserved};
use crate::workspace_edit::WorkspaceEdit;

use serde::{Deserialize, Serialize};

/// One entry in a conflict report. Conflict detection never throws on
/// semantic issues; it always returns the complete list of entries found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub kind: ConflictKind,
    pub message: String,
    pub severity: Severity,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictKind {
    InvalidIdentifier,
    Shadow,
    Reserved,
    MissingSymbol,
    LargeRename,
    ManyDependents,
    AnalysisError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Conflict {
    fn error(kind: ConflictKind, message: impl Into<String>, path: Option<String>) -> Self {
        Conflict {
            kind,
            message: message.into(),
            severity: Severity::Error,
            path,
        }
    }

    fn warning(kind: ConflictKind, message: impl Into<String>) -> Self {
        Conflict {
            kind,
            message: message.into(),
            severity: Severity::Warning,
            path: None,
        }
    }
}

/// Detect conflicts for renaming `old_name` to `new_name` given the
/// occurrence set. Never throws on semantic issues: a non-empty return with
/// only warnings is not itself a failure, callers decide based on severity.
pub fn detect_conflicts(
    old_name: &str,
    new_name: &str,
    occurrences: &[Occurrence],
    collab: &Collaborators,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    if let Err(err) = ids::assert_valid_identifier(new_name) {
        conflicts.push(Conflict::error(
            ConflictKind::InvalidIdentifier,
            err.to_string(),
            None,
        ));
        return conflicts;
    }

    if let Some(resolver) = collab.resolver {
        for occ in occurrences {
            let Some(scope_id) = occ.scope_id.as_deref() else {
                continue;
            };
            if let Some(binding) = resolver.lookup(new_name, Some(scope_id)) {
                if binding.name != old_name {
                    conflicts.push(Conflict::error(
                        ConflictKind::Shadow,
                        format!(
                            "'{new_name}' would shadow an existing binding '{}' in scope",
                            binding.name
                        ),
                        Some(occ.path.clone()),
                    ));
                }
            }
        }
    }

    let reserved = default_reserved_set(&collab.provider_keywords());
    if is_reserved(new_name, &reserved) {
        conflicts.push(Conflict::error(
            ConflictKind::Reserved,
            format!("'{new_name}' is a reserved keyword and cannot be used as an identifier"),
            None,
        ));
    }

    conflicts
}

/// Result of structural validation: never throws, surfaces errors and
/// warnings for the caller to act on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validate a Workspace Edit's structure: non-empty, no overlaps per file,
/// a warning above 50 edits in one file, merged with any external
/// validator's findings.
pub fn validate_workspace_edit(edit: &WorkspaceEdit, collab: &Collaborators) -> ValidationSummary {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if edit.is_empty() {
        errors.push("workspace edit is empty".to_string());
    }

    let grouped = edit.group_by_file();
    for (path, edits) in &grouped {
        for pair in edits.windows(2) {
            let (first, second) = (&pair[0], &pair[1]);
            if second.end > first.start {
                errors.push(format!(
                    "overlapping edits in {path}: {}-{} overlaps {}-{}",
                    first.start, first.end, second.start, second.end
                ));
            }
        }
        if edits.len() > 50 {
            warnings.push(format!(
                "{path} has {} edits in a single workspace edit",
                edits.len()
            ));
        }
    }

    if let Some(validator) = collab.edit_validator {
        let external = validator.validate_edits(edit);
        errors.extend(external.errors);
        warnings.extend(external.warnings);
    }

    ValidationSummary {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// One rename request in a batch: `symbol_id -> new_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePair {
    pub symbol_id: String,
    pub new_name: String,
}

/// Build a forwarding graph (each rename's symbol id to its synthesized
/// target id) and run DFS to find the first cycle. Returns the cycle's
/// symbol ids, closed (first id repeated at the end), or `None`.
pub fn detect_circular_renames(renames: &[RenamePair]) -> Option<Vec<String>> {
    use std::collections::HashMap;

    let mut forward: HashMap<String, String> = HashMap::new();
    for pair in renames {
        let Ok(parsed) = ids::parse_symbol_id(&pair.symbol_id) else {
            continue;
        };
        let target = parsed.with_name(&pair.new_name);
        forward.insert(pair.symbol_id.clone(), target.as_str().to_string());
    }

    #[derive(PartialEq)]
    enum State {
        Visiting,
        Done,
    }
    let mut state: HashMap<String, State> = HashMap::new();
    let mut path: Vec<String> = Vec::new();

    fn visit(
        node: &str,
        forward: &HashMap<String, String>,
        state: &mut HashMap<String, State>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        if let Some(s) = state.get(node) {
            if *s == State::Visiting {
                let start = path.iter().position(|n| n == node).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].to_vec();
                cycle.push(node.to_string());
                return Some(cycle);
            }
            return None;
        }
        state.insert(node.to_string(), State::Visiting);
        path.push(node.to_string());
        if let Some(next) = forward.get(node) {
            if forward.contains_key(next) || next == node {
                if let Some(cycle) = visit(next, forward, state, path) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        state.insert(node.to_string(), State::Done);
        None
    }

    let keys: Vec<String> = forward.keys().cloned().collect();
    for key in keys {
        if !state.contains_key(&key) {
            if let Some(cycle) = visit(&key, &forward, &mut state, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}

/// Lowercase reserved-set lookup helper shared with `detect_conflicts`.
pub fn reserved_keywords_with_extras(extra: &[String]) -> std::collections::HashSet<String> {
    keyword_set(&default_reserved_set(extra).into_iter().collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Binding, OccurrenceKind};

    struct FakeResolver;
    impl crate::collaborators::SymbolResolver for FakeResolver {
        fn has_symbol(&self, _symbol_id: &str) -> bool {
            true
        }
        fn lookup(&self, name: &str, _scope_id: Option<&str>) -> Option<Binding> {
            if name == "taken" {
                Some(Binding {
                    name: "other_var".to_string(),
                })
            } else {
                None
            }
        }
    }

    fn occ(path: &str, start: usize, end: usize, scope: Option<&str>) -> Occurrence {
        Occurrence {
            path: path.to_string(),
            start,
            end,
            scope_id: scope.map(str::to_string),
            kind: OccurrenceKind::Reference,
        }
    }

    mod conflict_tests {
        use super::*;

        #[test]
        fn reserved_keyword_conflict() {
            let collab = Collaborators::new();
            let conflicts = detect_conflicts("foo", "return", &[], &collab);
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].kind, ConflictKind::Reserved);
            assert!(conflicts[0].message.contains("reserved"));
        }

        #[test]
        fn invalid_identifier_short_circuits() {
            let collab = Collaborators::new();
            let conflicts = detect_conflicts("foo", "2bad", &[], &collab);
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].kind, ConflictKind::InvalidIdentifier);
        }

        #[test]
        fn shadow_conflict_from_resolver() {
            let resolver = FakeResolver;
            let collab = Collaborators {
                resolver: Some(&resolver),
                ..Collaborators::new()
            };
            let occurrences = vec![occ("a.gml", 0, 3, Some("scope1"))];
            let conflicts = detect_conflicts("hp", "taken", &occurrences, &collab);
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].kind, ConflictKind::Shadow);
        }

        #[test]
        fn no_conflicts_for_clean_rename() {
            let collab = Collaborators::new();
            let conflicts = detect_conflicts("hp", "health", &[], &collab);
            assert!(conflicts.is_empty());
        }
    }

    mod structural_validation_tests {
        use super::*;

        #[test]
        fn rejects_empty_edit() {
            let edit = WorkspaceEdit::new();
            let collab = Collaborators::new();
            let summary = validate_workspace_edit(&edit, &collab);
            assert!(!summary.valid);
            assert!(summary.errors[0].contains("empty"));
        }

        #[test]
        fn rejects_overlap() {
            let mut edit = WorkspaceEdit::new();
            edit.add_edit("a.gml", 5, 10, "x");
            edit.add_edit("a.gml", 8, 12, "y");
            let collab = Collaborators::new();
            let summary = validate_workspace_edit(&edit, &collab);
            assert!(!summary.valid);
            assert_eq!(summary.errors.len(), 1);
            assert!(summary.errors[0].contains("a.gml"));
        }

        #[test]
        fn warns_above_fifty_edits_in_one_file() {
            let mut edit = WorkspaceEdit::new();
            for i in 0..51 {
                let start = i * 10;
                edit.add_edit("a.gml", start, start + 1, "x");
            }
            let collab = Collaborators::new();
            let summary = validate_workspace_edit(&edit, &collab);
            assert!(summary.valid);
            assert_eq!(summary.warnings.len(), 1);
        }

        #[test]
        fn accepts_non_overlapping_edit() {
            let mut edit = WorkspaceEdit::new();
            edit.add_edit("a.gml", 40, 42, "health");
            edit.add_edit("a.gml", 10, 12, "health");
            let collab = Collaborators::new();
            let summary = validate_workspace_edit(&edit, &collab);
            assert!(summary.valid);
            assert!(summary.errors.is_empty());
        }
    }

    mod circular_rename_tests {
        use super::*;

        #[test]
        fn detects_two_cycle() {
            let renames = vec![
                RenamePair {
                    symbol_id: "gml/var/A".to_string(),
                    new_name: "B".to_string(),
                },
                RenamePair {
                    symbol_id: "gml/var/B".to_string(),
                    new_name: "A".to_string(),
                },
            ];
            let cycle = detect_circular_renames(&renames).expect("cycle expected");
            assert_eq!(cycle.first(), cycle.last());
            let unique: std::collections::HashSet<_> = cycle.iter().collect();
            assert_eq!(unique.len(), 2);
            assert!(unique.contains(&"gml/var/A".to_string()));
            assert!(unique.contains(&"gml/var/B".to_string()));
        }

        #[test]
        fn no_cycle_for_independent_renames() {
            let renames = vec![
                RenamePair {
                    symbol_id: "gml/var/A".to_string(),
                    new_name: "X".to_string(),
                },
                RenamePair {
                    symbol_id: "gml/var/B".to_string(),
                    new_name: "Y".to_string(),
                },
            ];
            assert!(detect_circular_renames(&renames).is_none());
        }

        #[test]
        fn no_cycle_for_chain_without_closure() {
            let renames = vec![
                RenamePair {
                    symbol_id: "gml/var/A".to_string(),
                    new_name: "B".to_string(),
                },
                RenamePair {
                    symbol_id: "gml/var/B".to_string(),
                    new_name: "C".to_string(),
                },
            ];
            assert!(detect_circular_renames(&renames).is_none());
        }
    }
}
