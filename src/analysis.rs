use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::AuditError;
use crate::exclusion::{ExclusionRow, ExclusionTable};
use crate::solver::{SatBackend, SatisfiabilityChecker, Verdict};
use crate::term::{Grafcet, Transition};
use crate::translate::translate;

// a conjunction of exactly two plain names
static TRIVIAL_AND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^AND\[\s*([A-Za-z0-9_]+)\s*,\s*([A-Za-z0-9_]+)\s*\]$").unwrap());

/// Classification of one candidate (transition, exclusion row) pair.
///
/// The report format also allows a plain `"true"`; nothing in the
/// classification ever produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Satisfiability {
    #[serde(rename = "Not Satisfied")]
    NotSatisfied,
    #[serde(rename = "false")]
    False,
    #[serde(rename = "true - redundantly designed?")]
    Redundant,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Satisfiability {
    pub fn as_str(self) -> &'static str {
        match self {
            Satisfiability::NotSatisfied => "Not Satisfied",
            Satisfiability::False => "false",
            Satisfiability::Redundant => "true - redundantly designed?",
            Satisfiability::Unknown => "unknown",
        }
    }

    fn from_verdict(verdict: &Verdict) -> Self {
        match verdict {
            Verdict::Satisfiable => Satisfiability::Redundant,
            Verdict::Unsatisfiable | Verdict::SolverFailed(_) => Satisfiability::False,
            Verdict::Unknown(_) => Satisfiability::Unknown,
        }
    }
}

impl fmt::Display for Satisfiability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRow {
    #[serde(rename = "PartialGrafcetName")]
    pub partial_grafcet_name: String,
    #[serde(rename = "TransitionID")]
    pub transition_id: String,
    #[serde(rename = "TransitionCondition")]
    pub transition_condition: String,
    #[serde(rename = "Satisfiability")]
    pub satisfiability: Satisfiability,
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// word boundary between `before` and `after`, either may be the text edge
fn boundary(before: Option<char>, after: Option<char>) -> bool {
    before.map_or(false, is_word) != after.map_or(false, is_word)
}

/// Whether `word` occurs in `text` with a word boundary on both sides,
/// the way `\bword\b` matches.
pub fn mentions_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let first = word.chars().next();
    let last = word.chars().next_back();

    text.match_indices(word).any(|(i, _)| {
        let before = text[..i].chars().next_back();
        let after = text[i + word.len()..].chars().next();
        boundary(before, first) && boundary(last, after)
    })
}

pub fn is_trivial_conjunction(notation: &str) -> bool {
    TRIVIAL_AND.is_match(notation.trim())
}

pub fn is_candidate(notation: &str, row: &ExclusionRow) -> bool {
    mentions_word(notation, &row.var1) && mentions_word(notation, &row.var2)
}

/// Runs every transition of a model against an exclusion table.
pub struct Analyzer<'a, B: SatBackend + ?Sized> {
    table: &'a ExclusionTable,
    checker: SatisfiabilityChecker<'a, B>,
}

impl<'a, B: SatBackend + ?Sized> Analyzer<'a, B> {
    pub fn new(backend: &'a B, table: &'a ExclusionTable) -> Self {
        Analyzer {
            table,
            checker: SatisfiabilityChecker::new(backend, &table.rows),
        }
    }

    pub fn analyze(&self, grafcet: &Grafcet) -> Result<Vec<AnalysisRow>, AuditError> {
        if self.table.is_empty() {
            tracing::warn!("no exclusion rows, nothing to check");
        }

        let mut rows = Vec::new();
        for pg in &grafcet.partial_grafcets {
            for t in &pg.transitions {
                rows.extend(self.analyze_transition(&pg.name, t)?);
            }
        }

        let mut counts: BTreeMap<Satisfiability, usize> = BTreeMap::new();
        for r in &rows {
            *counts.entry(r.satisfiability).or_insert(0) += 1;
        }
        tracing::info!(
            "{}: {} candidate rows ({})",
            grafcet.name,
            rows.len(),
            counts.iter().map(|(s, n)| format!("{}: {}", s, n)).join(", ")
        );
        Ok(rows)
    }

    /// Rows for one transition, one per exclusion row whose names both
    /// appear in the translated guard.
    pub fn analyze_transition(&self, partial_grafcet: &str, transition: &Transition) -> Result<Vec<AnalysisRow>, AuditError> {
        let translation = translate(&transition.term).map_err(|source| AuditError::Translate {
            grafcet: partial_grafcet.to_owned(),
            transition: transition.id.clone(),
            source,
        })?;
        let notation = translation.notation;

        // every row is a constraint of the same query, so one verdict
        // serves all candidates of this transition
        let mut verdict = None;
        let mut rows = Vec::new();
        for row in self.table.rows.iter().filter(|r| is_candidate(&notation, r)) {
            let satisfiability = if is_trivial_conjunction(&notation) {
                Satisfiability::NotSatisfied
            } else if let Some(s) = verdict {
                s
            } else {
                let v = self.checker.check(&notation).map_err(|source| AuditError::Notation {
                    grafcet: partial_grafcet.to_owned(),
                    transition: transition.id.clone(),
                    source,
                })?;
                let s = Satisfiability::from_verdict(&v);
                verdict = Some(s);
                s
            };

            tracing::debug!("{}/{} ({}, {}): {}", partial_grafcet, transition.id, row.var1, row.var2, satisfiability);
            rows.push(AnalysisRow {
                partial_grafcet_name: partial_grafcet.to_owned(),
                transition_id: transition.id.clone(),
                transition_condition: notation.clone(),
                satisfiability,
            });
        }
        Ok(rows)
    }
}

pub fn render_lines(rows: &[AnalysisRow]) -> String {
    rows.iter()
        .map(|r| {
            [
                r.partial_grafcet_name.as_str(),
                r.transition_id.as_str(),
                r.transition_condition.as_str(),
                r.satisfiability.as_str(),
            ]
            .join("; ")
        })
        .join("\n")
}
