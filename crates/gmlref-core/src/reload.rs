//! Hot-Reload Updates (file-level): turns an applied Workspace Edit into a
//! dependency-ordered list of `recompile`/`notify` updates.

use crate::cascade::compute_cascade;
use crate::collaborators::Collaborators;
use crate::workspace_edit::{Span, WorkspaceEdit};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReloadAction {
    /// The symbol's own source changed.
    Recompile,
    /// A transitive dependent that must be informed but has no direct edits.
    Notify,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotReloadUpdate {
    pub symbol_id: String,
    pub action: ReloadAction,
    pub file_path: String,
    pub affected_ranges: Vec<Span>,
}

/// 1. Group edits by file.
/// 2. For each file, query `getFileSymbols`; emit one `recompile` per
///    symbol with the file's affected ranges, or a synthetic
///    `file://{path}` symbol when the file has none.
/// 3. Feed all emitted symbol ids into the cascade engine; for each
///    cascade entry not already covered, emit a `notify` (only when the
///    entry carries a file path).
pub fn plan_hot_reload_updates(edit: &WorkspaceEdit, collab: &Collaborators) -> Vec<HotReloadUpdate> {
    let mut updates = Vec::new();
    let mut emitted_symbols: Vec<String> = Vec::new();

    for (path, edits) in edit.group_by_file() {
        let ranges: Vec<Span> = edits.iter().map(|e| e.span()).collect();
        let symbols = collab
            .file_symbols
            .map(|provider| provider.file_symbols(&path))
            .unwrap_or_default();

        if symbols.is_empty() {
            let synthetic = format!("file://{path}");
            emitted_symbols.push(synthetic.clone());
            updates.push(HotReloadUpdate {
                symbol_id: synthetic,
                action: ReloadAction::Recompile,
                file_path: path.clone(),
                affected_ranges: ranges.clone(),
            });
        } else {
            for symbol_id in symbols {
                emitted_symbols.push(symbol_id.clone());
                updates.push(HotReloadUpdate {
                    symbol_id,
                    action: ReloadAction::Recompile,
                    file_path: path.clone(),
                    affected_ranges: ranges.clone(),
                });
            }
        }
    }

    let cascade = compute_cascade(&emitted_symbols, collab);
    let covered: std::collections::HashSet<&str> =
        emitted_symbols.iter().map(String::as_str).collect();
    for entry in &cascade.cascade {
        if covered.contains(entry.symbol_id.as_str()) {
            continue;
        }
        let Some(file_path) = entry.file_path.clone() else {
            continue;
        };
        updates.push(HotReloadUpdate {
            symbol_id: entry.symbol_id.clone(),
            action: ReloadAction::Notify,
            file_path,
            affected_ranges: Vec::new(),
        });
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{DependencyAnalyzer, DependentEdge, FileSymbolProvider};

    struct FixtureFileSymbols {
        by_path: std::collections::HashMap<String, Vec<String>>,
    }
    impl FileSymbolProvider for FixtureFileSymbols {
        fn file_symbols(&self, path: &str) -> Vec<String> {
            self.by_path.get(path).cloned().unwrap_or_default()
        }
    }

    struct FixtureDependents {
        edges: std::collections::HashMap<String, Vec<DependentEdge>>,
    }
    impl DependencyAnalyzer for FixtureDependents {
        fn dependents(&self, symbol_ids: &[String]) -> Vec<DependentEdge> {
            symbol_ids
                .iter()
                .flat_map(|id| self.edges.get(id).cloned().unwrap_or_default())
                .collect()
        }
    }

    #[test]
    fn s6_recompile_then_notify() {
        let mut by_path = std::collections::HashMap::new();
        by_path.insert(
            "scripts/a.gml".to_string(),
            vec!["gml/script/a".to_string()],
        );
        let file_symbols = FixtureFileSymbols { by_path };

        let mut edges = std::collections::HashMap::new();
        edges.insert(
            "gml/script/a".to_string(),
            vec![DependentEdge {
                symbol_id: "gml/script/b".to_string(),
                file_path: Some("scripts/b.gml".to_string()),
            }],
        );
        let dependents = FixtureDependents { edges };

        let collab = Collaborators {
            file_symbols: Some(&file_symbols),
            dependencies: Some(&dependents),
            ..Collaborators::new()
        };

        let mut edit = WorkspaceEdit::new();
        edit.add_edit("scripts/a.gml", 4, 6, "b");

        let updates = plan_hot_reload_updates(&edit, &collab);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].symbol_id, "gml/script/a");
        assert_eq!(updates[0].action, ReloadAction::Recompile);
        assert_eq!(updates[0].affected_ranges, vec![Span::new(4, 6)]);

        assert_eq!(updates[1].symbol_id, "gml/script/b");
        assert_eq!(updates[1].action, ReloadAction::Notify);
        assert!(updates[1].affected_ranges.is_empty());
        assert_eq!(updates[1].file_path, "scripts/b.gml");
    }

    #[test]
    fn synthetic_symbol_when_file_has_none() {
        let collab = Collaborators::new();
        let mut edit = WorkspaceEdit::new();
        edit.add_edit("scripts/untracked.gml", 0, 1, "x");
        let updates = plan_hot_reload_updates(&edit, &collab);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].symbol_id, "file://scripts/untracked.gml");
    }
}
