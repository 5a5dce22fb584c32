//! gmlref: semantic-safe symbol rename and hot-reload coordination engine
//! for GML projects.
//!
//! The rename/cascade/safety logic lives in [`gmlref_core`]; this crate
//! adds the outer surface a caller actually runs: a JSON-fixture-backed
//! stand-in for the semantic analyzer ([`facts`]) and a CLI ([`cli`]).

pub mod cli;
pub mod facts;

pub use gmlref_core::*;
