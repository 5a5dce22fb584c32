//! Command implementations shared by the `gmlref` binary.
//!
//! Each `run_*` function loads a facts fixture, assembles a
//! [`gmlref_core::collaborators::Collaborators`] set, calls into the core
//! engine, and serializes the result to a JSON string. Engine errors are
//! turned into a `{"status":"error", ...}` envelope rather than printed
//! raw, mirroring how the core's structured `RenameError` carries a stable
//! `ErrorCode`.

use std::path::Path;

use serde::Serialize;
use serde_json::json;

use gmlref_core::batch::{plan_batch_rename, RenamePair};
use gmlref_core::cascade::{build_impact_graph, compute_cascade};
use gmlref_core::collaborators::Collaborators;
use gmlref_core::error::RenameError;
use gmlref_core::impact::analyze_rename_impact;
use gmlref_core::patchgen::generate_transpiler_patches;
use gmlref_core::planner::{plan_rename, RenameRequest};
use gmlref_core::reload::{plan_hot_reload_updates, HotReloadUpdate};
use gmlref_core::safety::classify_rename_safety;
use gmlref_core::workspace_edit::WorkspaceEdit;
use gmlref_core::{applier, ids};

use crate::facts::{DiskFilesystem, FactsFixture};

fn success(value: impl Serialize) -> String {
    json!({ "status": "ok", "result": value }).to_string()
}

fn error_json(err: &RenameError) -> String {
    let code: gmlref_core::error::ErrorCode = err.into();
    json!({
        "status": "error",
        "error": { "code": format!("{code:?}"), "message": err.to_string() }
    })
    .to_string()
}

fn collaborators_from<'a>(
    fixture: &'a FactsFixture,
    filesystem: &'a DiskFilesystem,
) -> Collaborators<'a> {
    Collaborators {
        resolver: Some(fixture),
        occurrences: Some(fixture),
        file_symbols: Some(fixture),
        dependencies: Some(fixture),
        keywords: Some(fixture),
        filesystem: Some(filesystem),
        ..Collaborators::new()
    }
}

pub fn run_plan_rename(
    workspace: &Path,
    facts: &Path,
    symbol_id: &str,
    new_name: &str,
) -> anyhow::Result<String> {
    let fixture = FactsFixture::load(facts)?;
    let fs = DiskFilesystem::new(workspace);
    let collab = collaborators_from(&fixture, &fs);
    let request = RenameRequest {
        symbol_id: symbol_id.to_string(),
        new_name: new_name.to_string(),
    };
    match plan_rename(&request, &collab) {
        Ok(plan) => Ok(success(plan)),
        Err(err) => Ok(error_json(&err)),
    }
}

pub fn run_plan_batch_rename(
    workspace: &Path,
    facts: &Path,
    renames: Vec<RenamePair>,
) -> anyhow::Result<String> {
    let fixture = FactsFixture::load(facts)?;
    let fs = DiskFilesystem::new(workspace);
    let collab = collaborators_from(&fixture, &fs);
    match plan_batch_rename(&renames, &collab) {
        Ok(plan) => Ok(success(plan)),
        Err(err) => Ok(error_json(&err)),
    }
}

pub fn run_apply(
    workspace: &Path,
    facts: &Path,
    edit: WorkspaceEdit,
    dry_run: bool,
) -> anyhow::Result<String> {
    let fixture = FactsFixture::load(facts)?;
    let fs = DiskFilesystem::new(workspace);
    let collab = collaborators_from(&fixture, &fs);
    match applier::apply_workspace_edit(&edit, &collab, dry_run) {
        Ok(contents) => Ok(success(json!({ "dryRun": dry_run, "files": contents }))),
        Err(err) => Ok(error_json(&err)),
    }
}

pub fn run_impact(workspace: &Path, facts: &Path, symbol_id: &str) -> anyhow::Result<String> {
    let fixture = FactsFixture::load(facts)?;
    let fs = DiskFilesystem::new(workspace);
    let collab = collaborators_from(&fixture, &fs);
    match analyze_rename_impact(symbol_id, &collab) {
        Ok(analysis) => Ok(success(analysis)),
        Err(err) => Ok(error_json(&err)),
    }
}

pub fn run_cascade(workspace: &Path, facts: &Path, changed: Vec<String>) -> anyhow::Result<String> {
    let fixture = FactsFixture::load(facts)?;
    let fs = DiskFilesystem::new(workspace);
    let collab = collaborators_from(&fixture, &fs);
    let result = compute_cascade(&changed, &collab);
    let impact_graph = build_impact_graph(&changed, &collab);
    Ok(success(
        json!({ "cascade": result, "impactGraph": impact_graph }),
    ))
}

pub fn run_hot_reload_updates(
    workspace: &Path,
    facts: &Path,
    edit: WorkspaceEdit,
) -> anyhow::Result<String> {
    let fixture = FactsFixture::load(facts)?;
    let fs = DiskFilesystem::new(workspace);
    let collab = collaborators_from(&fixture, &fs);
    let updates: Vec<HotReloadUpdate> = plan_hot_reload_updates(&edit, &collab);
    Ok(success(updates))
}

pub fn run_classify_safety(
    workspace: &Path,
    facts: &Path,
    symbol_id: &str,
    new_name: &str,
) -> anyhow::Result<String> {
    let fixture = FactsFixture::load(facts)?;
    let fs = DiskFilesystem::new(workspace);
    let collab = collaborators_from(&fixture, &fs);
    let request = RenameRequest {
        symbol_id: symbol_id.to_string(),
        new_name: new_name.to_string(),
    };
    let result = classify_rename_safety(&request, &collab);
    Ok(success(result))
}

pub fn run_generate_patches(
    workspace: &Path,
    facts: &Path,
    updates: Vec<HotReloadUpdate>,
) -> anyhow::Result<String> {
    let fixture = FactsFixture::load(facts)?;
    let fs = DiskFilesystem::new(workspace);
    let collab = collaborators_from(&fixture, &fs);
    let patches = generate_transpiler_patches(&updates, &collab);
    Ok(success(patches))
}

/// Validate a bare identifier string, used by the binary's `--new-name`
/// argument parsing before reaching the engine.
pub fn validate_identifier_arg(name: &str) -> Result<(), String> {
    ids::assert_valid_identifier(name).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_symbol_round_trips_as_error_envelope() {
        let tmp = tempfile::tempdir().unwrap();
        let facts_path = tmp.path().join("facts.json");
        std::fs::write(&facts_path, "{}").unwrap();
        let out = run_plan_rename(tmp.path(), &facts_path, "gml/var/hp", "health").unwrap();
        assert!(out.contains("\"status\":\"error\""));
        assert!(out.contains("MissingSymbol"));
    }

    #[test]
    fn validate_identifier_arg_rejects_leading_digit() {
        assert!(validate_identifier_arg("1abc").is_err());
        assert!(validate_identifier_arg("abc").is_ok());
    }
}
