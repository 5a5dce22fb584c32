//! Capability interfaces for the external semantic analyzer, parser,
//! transpiler, and filesystem.
//!
//! The engine never implements symbol resolution, parsing, or
//! transpilation itself. It consumes them only through these narrow
//! traits, each modeling one optional capability rather than one fat
//! collaborator. A caller assembles the capabilities it actually has into
//! a [`Collaborators`] struct; the engine feature-detects by checking
//! which fields are `Some`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A source location where a symbol is defined or referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub path: String,
    pub start: usize,
    pub end: usize,
    pub scope_id: Option<String>,
    pub kind: OccurrenceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceKind {
    Definition,
    Reference,
    Unknown,
}

/// A binding returned by a scope lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
}

/// A symbol resolved at a file position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSymbol {
    pub symbol_id: String,
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// An edge produced by `getDependents`: the dependent symbol and its file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentEdge {
    pub symbol_id: String,
    pub file_path: Option<String>,
}

/// A minimal AST node, used only as a fallback for position-to-symbol lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstNode {
    pub node_type: String,
    pub name: Option<String>,
    pub start: usize,
    pub end: usize,
    pub children: Vec<AstNode>,
}

/// Structured errors/warnings returned by an external edit validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Resolves whether a symbol exists and looks up bindings in scopes.
pub trait SymbolResolver {
    fn has_symbol(&self, symbol_id: &str) -> bool;
    fn lookup(&self, name: &str, scope_id: Option<&str>) -> Option<Binding>;
    fn symbol_at_position(&self, path: &str, offset: usize) -> Option<PositionSymbol> {
        let _ = (path, offset);
        None
    }
}

/// Enumerates the occurrences of a bare symbol name.
pub trait OccurrenceTracker {
    fn symbol_occurrences(&self, bare_name: &str) -> Vec<Occurrence>;
}

/// Lists the symbol ids defined in a file.
pub trait FileSymbolProvider {
    fn file_symbols(&self, path: &str) -> Vec<String>;
}

/// Lists symbols that transitively depend on a set of symbols.
pub trait DependencyAnalyzer {
    fn dependents(&self, symbol_ids: &[String]) -> Vec<DependentEdge>;
}

/// Supplies additional reserved keywords beyond the engine's default set.
pub trait KeywordProvider {
    fn reserved_keywords(&self) -> Vec<String>;
}

/// Validates a fully-built workspace edit against semantic rules the engine
/// cannot check on its own (e.g. type compatibility).
pub trait EditValidator {
    fn validate_edits(&self, edit: &crate::workspace_edit::WorkspaceEdit) -> ExternalValidation;
}

/// Parses a file into an AST, used only as a position-lookup fallback.
pub trait ParserBridge {
    fn parse(&self, path: &str) -> Option<AstNode>;
}

/// Turns source text + a symbol id into an opaque transpiled patch.
pub trait TranspilerBridge {
    fn transpile_script(&self, source_text: &str, symbol_id: &str) -> Option<serde_json::Value>;
}

/// Reads and writes file content. The engine never touches the OS directly.
pub trait Filesystem {
    fn read_file(&self, path: &str) -> std::io::Result<String>;
    fn write_file(&self, path: &str, content: &str) -> std::io::Result<()>;
    fn rename_file(&self, old_path: &str, new_path: &str) -> std::io::Result<()> {
        let _ = (old_path, new_path);
        Ok(())
    }
    fn delete_file(&self, path: &str) -> std::io::Result<()> {
        let _ = path;
        Ok(())
    }
}

/// The set of capabilities a caller injects for a single engine call.
///
/// Every field is optional; the engine checks presence rather than relying
/// on dynamic method probing. Fields are trait objects so callers can wire
/// up whatever mix of analyzer/parser/transpiler/filesystem implementations
/// they have for a given workspace.
#[derive(Default)]
pub struct Collaborators<'a> {
    pub resolver: Option<&'a dyn SymbolResolver>,
    pub occurrences: Option<&'a dyn OccurrenceTracker>,
    pub file_symbols: Option<&'a dyn FileSymbolProvider>,
    pub dependencies: Option<&'a dyn DependencyAnalyzer>,
    pub keywords: Option<&'a dyn KeywordProvider>,
    pub edit_validator: Option<&'a dyn EditValidator>,
    pub parser: Option<&'a dyn ParserBridge>,
    pub transpiler: Option<&'a dyn TranspilerBridge>,
    pub filesystem: Option<&'a dyn Filesystem>,
}

impl<'a> Collaborators<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserved keywords contributed by the keyword provider, if any.
    pub fn provider_keywords(&self) -> Vec<String> {
        self.keywords
            .map(|k| k.reserved_keywords())
            .unwrap_or_default()
    }

    /// Resolve a symbol at a position, preferring the resolver, falling
    /// back to a parser-derived AST walk when only a parser is injected.
    pub fn symbol_at_position(&self, path: &str, offset: usize) -> Option<PositionSymbol> {
        if let Some(resolver) = self.resolver {
            if let Some(found) = resolver.symbol_at_position(path, offset) {
                return Some(found);
            }
        }
        let parser = self.parser?;
        let ast = parser.parse(path)?;
        find_node_at_offset(&ast, offset)
    }
}

fn find_node_at_offset(node: &AstNode, offset: usize) -> Option<PositionSymbol> {
    if offset < node.start || offset >= node.end {
        return None;
    }
    for child in &node.children {
        if let Some(found) = find_node_at_offset(child, offset) {
            return Some(found);
        }
    }
    let name = node.name.clone()?;
    Some(PositionSymbol {
        symbol_id: name.clone(),
        name,
        start: node.start,
        end: node.end,
    })
}

/// Deduplicate and lowercase a list of keyword strings into a set.
pub fn keyword_set(keywords: &[String]) -> HashSet<String> {
    keywords.iter().map(|k| k.to_lowercase()).collect()
}
