//! Core infrastructure for semantic-safe symbol renames and hot-reload
//! coordination in GML projects.
//!
//! This crate never parses GML itself: it consumes semantic facts
//! (occurrences, dependents, file symbols, keywords) through the narrow
//! capability traits in [`collaborators`], and produces a
//! [`workspace_edit::WorkspaceEdit`] plus a dependency-ordered hot-reload
//! plan. It does not maintain a symbol index, does not transpile, does not
//! speak an LSP wire protocol, and does not persist state between sessions.

pub mod applier;
pub mod batch;
pub mod cache;
pub mod cascade;
pub mod collaborators;
pub mod conflict;
pub mod error;
pub mod ids;
pub mod impact;
pub mod patchgen;
pub mod planner;
pub mod reload;
pub mod safety;
pub mod workspace_edit;
