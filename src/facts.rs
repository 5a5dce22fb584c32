//! JSON-fixture-backed collaborator implementations.
//!
//! `gmlref-core` never talks to a semantic analyzer directly; it only sees
//! the capability traits in `gmlref_core::collaborators`. This module is
//! the thin adapter a real integration (an LSP server, a build tool) would
//! replace: it loads a pre-computed facts snapshot from JSON and answers
//! the core's queries out of memory.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use gmlref_core::collaborators::{
    Binding, DependencyAnalyzer, DependentEdge, FileSymbolProvider, Filesystem, KeywordProvider,
    Occurrence, OccurrenceTracker, SymbolResolver,
};

#[derive(Debug, Deserialize)]
pub struct FactsFixture {
    #[serde(default)]
    symbols: Vec<String>,
    #[serde(default)]
    occurrences: HashMap<String, Vec<Occurrence>>,
    #[serde(default)]
    file_symbols: HashMap<String, Vec<String>>,
    #[serde(default)]
    dependents: HashMap<String, Vec<DependentEdge>>,
    #[serde(default)]
    bindings: HashMap<String, Binding>,
    #[serde(default)]
    reserved_keywords: Vec<String>,
}

impl FactsFixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading facts file {}: {e}", path.display()))?;
        let fixture: FactsFixture = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("parsing facts file {}: {e}", path.display()))?;
        Ok(fixture)
    }

    pub fn empty() -> Self {
        FactsFixture {
            symbols: Vec::new(),
            occurrences: HashMap::new(),
            file_symbols: HashMap::new(),
            dependents: HashMap::new(),
            bindings: HashMap::new(),
            reserved_keywords: Vec::new(),
        }
    }
}

impl SymbolResolver for FactsFixture {
    fn has_symbol(&self, symbol_id: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol_id)
    }

    fn lookup(&self, name: &str, scope_id: Option<&str>) -> Option<Binding> {
        let key = match scope_id {
            Some(scope) => format!("{scope}::{name}"),
            None => name.to_string(),
        };
        self.bindings.get(&key).cloned()
    }
}

impl OccurrenceTracker for FactsFixture {
    fn symbol_occurrences(&self, bare_name: &str) -> Vec<Occurrence> {
        self.occurrences.get(bare_name).cloned().unwrap_or_default()
    }
}

impl FileSymbolProvider for FactsFixture {
    fn file_symbols(&self, path: &str) -> Vec<String> {
        self.file_symbols.get(path).cloned().unwrap_or_default()
    }
}

impl DependencyAnalyzer for FactsFixture {
    fn dependents(&self, symbol_ids: &[String]) -> Vec<DependentEdge> {
        symbol_ids
            .iter()
            .flat_map(|id| self.dependents.get(id).cloned().unwrap_or_default())
            .collect()
    }
}

impl KeywordProvider for FactsFixture {
    fn reserved_keywords(&self) -> Vec<String> {
        self.reserved_keywords.clone()
    }
}

/// `Filesystem` backed by real disk I/O, rooted at a workspace directory.
pub struct DiskFilesystem {
    root: std::path::PathBuf,
}

impl DiskFilesystem {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        DiskFilesystem { root: root.into() }
    }

    fn resolve(&self, path: &str) -> std::path::PathBuf {
        self.root.join(path)
    }
}

impl Filesystem for DiskFilesystem {
    fn read_file(&self, path: &str) -> std::io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn write_file(&self, path: &str, content: &str) -> std::io::Result<()> {
        fs::write(self.resolve(path), content)
    }

    fn rename_file(&self, old_path: &str, new_path: &str) -> std::io::Result<()> {
        fs::rename(self.resolve(old_path), self.resolve(new_path))
    }

    fn delete_file(&self, path: &str) -> std::io::Result<()> {
        fs::remove_file(self.resolve(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fixture_resolves_nothing() {
        let fixture = FactsFixture::empty();
        assert!(!fixture.has_symbol("gml/script/a"));
        assert!(fixture.symbol_occurrences("a").is_empty());
        assert!(fixture.reserved_keywords().is_empty());
    }

    #[test]
    fn disk_filesystem_roundtrips() {
        let tmp = tempfile::tempdir().unwrap();
        let fs = DiskFilesystem::new(tmp.path());
        fs.write_file("a.gml", "set hp=0;").unwrap();
        assert_eq!(fs.read_file("a.gml").unwrap(), "set hp=0;");
    }
}
