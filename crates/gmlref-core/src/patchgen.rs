//! Transpiler Patch Generation: turns `recompile` hot-reload updates into
//! transpiler patches, falling back to a raw-source patch when no
//! transpiler bridge is injected.

use chrono::Utc;
use serde_json::json;

use crate::collaborators::Collaborators;
use crate::reload::{HotReloadUpdate, ReloadAction};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranspilerPatch {
    pub symbol_id: String,
    pub payload: serde_json::Value,
}

/// For each `recompile` update: read the file, call the transpiler bridge
/// if present, otherwise fall back to `{kind: "script", id, sourceText,
/// version}`. `notify` updates produce no patches. A read or transpile
/// failure on one update is skipped; processing continues with the rest.
pub fn generate_transpiler_patches(
    updates: &[HotReloadUpdate],
    collab: &Collaborators,
) -> Vec<TranspilerPatch> {
    let mut patches = Vec::new();

    for update in updates {
        if update.action != ReloadAction::Recompile {
            continue;
        }

        let Some(filesystem) = collab.filesystem else {
            tracing::warn!(symbol_id = %update.symbol_id, "no filesystem injected, skipping patch");
            continue;
        };
        let source_text = match filesystem.read_file(&update.file_path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    symbol_id = %update.symbol_id,
                    file = %update.file_path,
                    error = %err,
                    "read failed, skipping patch"
                );
                continue;
            }
        };

        let payload = match collab.transpiler {
            Some(bridge) => match bridge.transpile_script(&source_text, &update.symbol_id) {
                Some(patch) => patch,
                None => {
                    tracing::warn!(symbol_id = %update.symbol_id, "transpile failed, skipping patch");
                    continue;
                }
            },
            None => json!({
                "kind": "script",
                "id": update.symbol_id,
                "sourceText": source_text,
                "version": Utc::now().timestamp_millis(),
            }),
        };

        patches.push(TranspilerPatch {
            symbol_id: update.symbol_id.clone(),
            payload,
        });
    }

    patches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Filesystem, TranspilerBridge};
    use crate::workspace_edit::Span;
    use std::collections::HashMap;

    struct FixtureFs {
        files: HashMap<String, String>,
    }
    impl Filesystem for FixtureFs {
        fn read_file(&self, path: &str) -> std::io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, path.to_string()))
        }
        fn write_file(&self, _path: &str, _content: &str) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FixtureTranspiler;
    impl TranspilerBridge for FixtureTranspiler {
        fn transpile_script(&self, source_text: &str, symbol_id: &str) -> Option<serde_json::Value> {
            Some(json!({"id": symbol_id, "bytecode": source_text.len()}))
        }
    }

    fn recompile_update(symbol_id: &str, file_path: &str) -> HotReloadUpdate {
        HotReloadUpdate {
            symbol_id: symbol_id.to_string(),
            action: ReloadAction::Recompile,
            file_path: file_path.to_string(),
            affected_ranges: vec![Span::new(0, 1)],
        }
    }

    #[test]
    fn notify_updates_produce_no_patches() {
        let collab = Collaborators::new();
        let update = HotReloadUpdate {
            symbol_id: "gml/script/b".to_string(),
            action: ReloadAction::Notify,
            file_path: "b.gml".to_string(),
            affected_ranges: vec![],
        };
        let patches = generate_transpiler_patches(&[update], &collab);
        assert!(patches.is_empty());
    }

    #[test]
    fn uses_transpiler_bridge_when_present() {
        let mut files = HashMap::new();
        files.insert("a.gml".to_string(), "return 1;".to_string());
        let fs = FixtureFs { files };
        let transpiler = FixtureTranspiler;
        let collab = Collaborators {
            filesystem: Some(&fs),
            transpiler: Some(&transpiler),
            ..Collaborators::new()
        };
        let update = recompile_update("gml/script/a", "a.gml");
        let patches = generate_transpiler_patches(&[update], &collab);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].payload["bytecode"], 9);
    }

    #[test]
    fn falls_back_without_transpiler() {
        let mut files = HashMap::new();
        files.insert("a.gml".to_string(), "return 1;".to_string());
        let fs = FixtureFs { files };
        let collab = Collaborators {
            filesystem: Some(&fs),
            ..Collaborators::new()
        };
        let update = recompile_update("gml/script/a", "a.gml");
        let patches = generate_transpiler_patches(&[update], &collab);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].payload["kind"], "script");
        assert_eq!(patches[0].payload["sourceText"], "return 1;");
    }

    #[test]
    fn read_failure_is_skipped_not_fatal() {
        let fs = FixtureFs {
            files: HashMap::new(),
        };
        let collab = Collaborators {
            filesystem: Some(&fs),
            ..Collaborators::new()
        };
        let updates = vec![
            recompile_update("gml/script/missing", "missing.gml"),
            recompile_update("gml/script/present", "present.gml"),
        ];
        // Neither file exists in the fixture filesystem; both reads fail,
        // but the call must not panic or short-circuit.
        let patches = generate_transpiler_patches(&updates, &collab);
        assert!(patches.is_empty());
    }
}
