use std::fmt;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Input,
    Output,
    Internal,
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Not,
    And,
    Or,
    RisingEdge,
    FallingEdge,
    Equals,
    LessThan,
    GreaterThan,
    Other,
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperatorKind::Not => "not",
            OperatorKind::And => "and",
            OperatorKind::Or => "or",
            OperatorKind::RisingEdge => "rising_edge",
            OperatorKind::FallingEdge => "falling_edge",
            OperatorKind::Equals => "equals",
            OperatorKind::LessThan => "less_than",
            OperatorKind::GreaterThan => "greater_than",
            OperatorKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// A guard expression as delivered by the model loader. Operators own
/// their children; the tree is never mutated after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Term {
    Variable { name: String, kind: VariableKind },
    Operator { kind: OperatorKind, children: Vec<Term> },
    Integer { value: i64 },
    Boolean { value: bool },
}

impl Term {
    pub fn var(name: &str, kind: VariableKind) -> Self {
        Term::Variable { name: name.to_owned(), kind }
    }

    pub fn input(name: &str) -> Self {
        Term::var(name, VariableKind::Input)
    }

    pub fn op(kind: OperatorKind, children: Vec<Term>) -> Self {
        Term::Operator { kind, children }
    }

    pub fn int(value: i64) -> Self {
        Term::Integer { value }
    }

    pub fn boolean(value: bool) -> Self {
        Term::Boolean { value }
    }

    pub fn not(t: Term) -> Self {
        Term::op(OperatorKind::Not, vec![t])
    }

    pub fn and(children: Vec<Term>) -> Self {
        Term::op(OperatorKind::And, children)
    }

    pub fn or(children: Vec<Term>) -> Self {
        Term::op(OperatorKind::Or, children)
    }

    pub fn rising(t: Term) -> Self {
        Term::op(OperatorKind::RisingEdge, vec![t])
    }

    pub fn falling(t: Term) -> Self {
        Term::op(OperatorKind::FallingEdge, vec![t])
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Term::Integer { .. })
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Term::Boolean { .. })
    }

    /// Declared name, for variables only.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Term::Variable { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Raw textual form: names and literals verbatim, operators as
/// `kind(child, ...)`. Used where an operand is emitted untranslated.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable { name, .. } => f.write_str(name),
            Term::Integer { value } => write!(f, "{}", value),
            Term::Boolean { value } => write!(f, "{}", value),
            Term::Operator { kind, children } => {
                write!(f, "{}({})", kind, children.iter().join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    pub term: Term,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialGrafcet {
    pub name: String,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grafcet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub partial_grafcets: Vec<PartialGrafcet>,
}

impl Grafcet {
    pub fn from_json_str(s: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let contents = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let grafcet = Self::from_json_str(&contents)?;
        tracing::debug!(
            "loaded model {} with {} partial grafcets",
            path.display(),
            grafcet.partial_grafcets.len()
        );
        Ok(grafcet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_text_of_operands() {
        assert_eq!(Term::input("A").to_string(), "A");
        assert_eq!(Term::int(-3).to_string(), "-3");
        assert_eq!(Term::boolean(true).to_string(), "true");
        let t = Term::and(vec![Term::input("A"), Term::input("B")]);
        assert_eq!(t.to_string(), "and(A, B)");
    }

    #[test]
    fn model_from_json() {
        let json = r#"{
            "name": "plant",
            "partial_grafcets": [
                { "name": "G1",
                  "transitions": [
                    { "id": "T1",
                      "term": { "type": "operator", "kind": "less_than", "children": [
                        { "type": "variable", "name": "level", "kind": "internal" },
                        { "type": "integer", "value": 5 } ] } } ] } ] }"#;

        let g = Grafcet::from_json_str(json).unwrap();
        assert_eq!(g.partial_grafcets.len(), 1);
        let t = &g.partial_grafcets[0].transitions[0];
        assert_eq!(t.id, "T1");
        assert_eq!(
            t.term,
            Term::op(
                OperatorKind::LessThan,
                vec![Term::var("level", VariableKind::Internal), Term::int(5)]
            )
        );
    }

    #[test]
    fn model_rejects_garbage() {
        assert!(Grafcet::from_json_str("{ not json").is_err());
    }
}
