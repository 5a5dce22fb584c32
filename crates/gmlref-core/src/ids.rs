//! Identifier validation, symbol-id parsing, and the default reserved-keyword set.
//!
//! Symbol identifiers are canonical strings `gml/{kind}/{name}`, where
//! `kind` is one of `script`, `var`, `event`, `macro`, `enum`. Instance
//! variables encode qualification as `gml/var/{object}::{field}`: the last
//! path segment is the bare symbol name, the second segment is the kind.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RenameError, RenameResult};

/// `^[A-Za-z_][A-Za-z0-9_]*$`
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Default reserved keywords, per the language's grammar.
pub const DEFAULT_RESERVED: &[&str] = &[
    "if", "else", "while", "for", "do", "switch", "case", "default", "break", "continue",
    "return", "function", "var", "globalvar", "enum", "with", "repeat", "until", "exit", "self",
    "other", "all", "noone", "global",
];

/// A parsed symbol id: `gml/{kind}/{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolId {
    pub kind: String,
    /// The bare name segment (last path component); for instance variables
    /// this is `{object}::{field}`.
    pub name: String,
    raw: String,
}

impl SymbolId {
    /// Bare name with any `object::` qualification stripped.
    pub fn bare_name(&self) -> &str {
        match self.name.rsplit_once("::") {
            Some((_, field)) => field,
            None => &self.name,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Synthesize a new symbol id with the same kind but a different bare name.
    pub fn with_name(&self, new_bare_name: &str) -> SymbolId {
        let name = match self.name.rsplit_once("::") {
            Some((object, _)) => format!("{object}::{new_bare_name}"),
            None => new_bare_name.to_string(),
        };
        let raw = format!("gml/{}/{}", self.kind, name);
        SymbolId {
            kind: self.kind.clone(),
            name,
            raw,
        }
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Split on `/`; require at least 3 segments; kind is segment 1, name is the
/// last segment (segments 2.. joined by `/`, though in practice this is a
/// single segment unless the name itself legitimately contains slashes).
pub fn parse_symbol_id(id: &str) -> RenameResult<SymbolId> {
    let segments: Vec<&str> = id.split('/').collect();
    if segments.len() < 3 {
        return Err(RenameError::MalformedSymbolId { id: id.to_string() });
    }
    let kind = segments[1].to_string();
    let name = segments[2..].join("/");
    Ok(SymbolId {
        kind,
        name,
        raw: id.to_string(),
    })
}

/// Non-empty, no leading/trailing whitespace, matches the identifier regex.
pub fn assert_valid_identifier(name: &str) -> RenameResult<()> {
    if name.is_empty() {
        return Err(RenameError::InvalidIdentifier {
            name: name.to_string(),
            reason: "identifier must not be empty".to_string(),
        });
    }
    if name.trim() != name {
        return Err(RenameError::InvalidIdentifier {
            name: name.to_string(),
            reason: "identifier must not have leading or trailing whitespace".to_string(),
        });
    }
    if !IDENTIFIER_RE.is_match(name) {
        return Err(RenameError::InvalidIdentifier {
            name: name.to_string(),
            reason: "identifier must match [A-Za-z_][A-Za-z0-9_]*".to_string(),
        });
    }
    Ok(())
}

/// Build the default reserved set, lowercased, merged with any
/// caller-supplied extension keywords.
pub fn default_reserved_set(extra: &[String]) -> HashSet<String> {
    let mut set: HashSet<String> = DEFAULT_RESERVED.iter().map(|s| s.to_lowercase()).collect();
    set.extend(extra.iter().map(|s| s.to_lowercase()));
    set
}

pub fn is_reserved(name: &str, reserved: &HashSet<String>) -> bool {
    reserved.contains(&name.to_lowercase())
}
