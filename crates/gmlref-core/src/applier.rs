//! Edit Applier: loads file content via the injected reader, applies each
//! file's edits in descending offset order, optionally writes back.

use std::collections::BTreeMap;

use crate::collaborators::Collaborators;
use crate::conflict::validate_workspace_edit;
use crate::error::{RenameError, RenameResult};
use crate::workspace_edit::WorkspaceEdit;

/// Spans are half-open character offsets, not byte offsets: translate via
/// `char_indices` before slicing so multi-byte UTF-8 content doesn't panic
/// on a non-char-boundary byte index. An offset past the end of the string
/// clamps to `content.len()`.
fn char_offset_to_byte(content: &str, char_offset: usize) -> usize {
    match content.char_indices().nth(char_offset) {
        Some((byte_idx, _)) => byte_idx,
        None => content.len(),
    }
}

/// Apply a Workspace Edit.
///
/// Files are processed sequentially in `group_by_file` iteration order, and
/// within a file, edits are applied back-to-front so earlier offsets stay
/// valid. Returns a map of path to the new content. When `dry_run` is
/// false and a filesystem is injected, each file's new content is written
/// back; when no filesystem is injected, writing is silently skipped (the
/// caller asked for real writes but supplied nothing to write with).
pub fn apply_workspace_edit(
    edit: &WorkspaceEdit,
    collab: &Collaborators,
    dry_run: bool,
) -> RenameResult<BTreeMap<String, String>> {
    let summary = validate_workspace_edit(edit, collab);
    if !summary.valid {
        return Err(RenameError::invalid_argument(summary.errors.join("; ")));
    }

    let filesystem = collab.filesystem;
    let mut result = BTreeMap::new();

    for (path, edits) in edit.group_by_file() {
        let original = match filesystem {
            Some(fs) => fs
                .read_file(&path)
                .map_err(|e| RenameError::invalid_argument(format!("failed to read {path}: {e}")))?,
            None => String::new(),
        };

        let mut content = original;
        for text_edit in &edits {
            let start = char_offset_to_byte(&content, text_edit.start);
            let end = char_offset_to_byte(&content, text_edit.end);
            content = format!(
                "{}{}{}",
                &content[..start],
                text_edit.new_text,
                &content[end..]
            );
        }

        if !dry_run {
            if let Some(fs) = filesystem {
                fs.write_file(&path, &content)
                    .map_err(|e| RenameError::invalid_argument(format!("failed to write {path}: {e}")))?;
            }
        }

        result.insert(path, content);
    }

    if !dry_run {
        if let Some(fs) = filesystem {
            for rename in &edit.file_renames {
                fs.rename_file(&rename.old_path, &rename.new_path)
                    .map_err(|e| {
                        RenameError::invalid_argument(format!(
                            "failed to rename {} to {}: {e}",
                            rename.old_path, rename.new_path
                        ))
                    })?;
            }
        }
    }

    Ok(result)
}
