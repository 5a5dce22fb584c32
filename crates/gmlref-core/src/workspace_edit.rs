//! The Workspace Edit value type: an ordered collection of text edits plus
//! optional file renames.
//!
//! A Workspace Edit is a passive value. It does not validate itself; the
//! overlap and structural checks live in [`crate::conflict`]. Its one piece
//! of real logic is grouping edits by file and sorting each group in
//! descending start order so that applying edits back-to-front never
//! invalidates the offsets of edits earlier in the list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A half-open byte/char offset range `[start, end)` within one file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when this span and `other` share at least one offset.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One text replacement: `content[start..end]` becomes `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub path: String,
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(path: impl Into<String>, start: usize, end: usize, new_text: impl Into<String>) -> Self {
        TextEdit {
            path: path.into(),
            start,
            end,
            new_text: new_text.into(),
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// A file move: content is unchanged, only the path changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRename {
    pub old_path: String,
    pub new_path: String,
}

/// An ordered list of text edits plus an ordered list of file renames,
/// produced atomically by a planner and consumed by the validator and
/// applier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceEdit {
    pub text_edits: Vec<TextEdit>,
    pub file_renames: Vec<FileRename>,
}

impl WorkspaceEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edit(&mut self, path: impl Into<String>, start: usize, end: usize, new_text: impl Into<String>) {
        self.text_edits.push(TextEdit::new(path, start, end, new_text));
    }

    pub fn add_file_rename(&mut self, old_path: impl Into<String>, new_path: impl Into<String>) {
        self.file_renames.push(FileRename {
            old_path: old_path.into(),
            new_path: new_path.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.text_edits.is_empty() && self.file_renames.is_empty()
    }

    /// Group text edits by file, each group sorted descending by `start`
    /// (ties broken by `end` descending, though overlap rejection in
    /// `conflict::validate_workspace_edit` is what actually catches ties
    /// that would make order ambiguous).
    pub fn group_by_file(&self) -> BTreeMap<String, Vec<TextEdit>> {
        let mut groups: BTreeMap<String, Vec<TextEdit>> = BTreeMap::new();
        for edit in &self.text_edits {
            groups.entry(edit.path.clone()).or_default().push(edit.clone());
        }
        for edits in groups.values_mut() {
            edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));
        }
        groups
    }

    /// Merge another edit's contents into this one, preserving order:
    /// this edit's entries first, then the other's.
    pub fn extend(&mut self, other: WorkspaceEdit) {
        self.text_edits.extend(other.text_edits);
        self.file_renames.extend(other.file_renames);
    }
}
