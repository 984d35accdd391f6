//! Audits the transition guards of a GRAFCET model against known
//! mutual-exclusion facts about its inputs.
//!
//! A guard is translated to bracket notation, re-read as a formula, and
//! checked with BDDs together with one `!(a && b)` constraint per
//! exclusion row. Satisfiable guards are reported as possibly redundant,
//! unsatisfiable ones as dead.

mod term;
pub use term::*;

mod error;
pub use error::*;

mod brackets;
pub use brackets::{distribute_suffix, is_balanced, operator_and_inner, split_top_level};

mod translate;
pub use translate::*;

mod context;
pub use context::*;

mod notation;
pub use notation::*;

mod formula;
pub use formula::*;

mod exclusion;
pub use exclusion::*;

mod bdd_domain;
pub use bdd_domain::*;

mod bdd_context;
pub use bdd_context::*;

mod solver;
pub use solver::*;

mod config;
pub use config::*;

mod analysis;
pub use analysis::*;
