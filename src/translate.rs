use itertools::Itertools;

use crate::brackets::distribute_suffix;
use crate::error::TranslateError;
use crate::term::{OperatorKind, Term, VariableKind};

pub const BEFORE_RISING: &str = "_beforeRE";
pub const BEFORE_FALLING: &str = "_beforeFE";

/// Bracket notation of a guard plus the variables it mentions, in order of
/// first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub notation: String,
    pub variables: Vec<String>,
}

pub fn translate(term: &Term) -> Result<Translation, TranslateError> {
    let mut variables = Vec::new();
    let notation = build(term, &mut variables)?;
    Ok(Translation { notation, variables })
}

fn build(term: &Term, variables: &mut Vec<String>) -> Result<String, TranslateError> {
    match term {
        Term::Variable { name, kind } => match kind {
            VariableKind::Input | VariableKind::Internal | VariableKind::Step => {
                if !variables.contains(name) {
                    variables.push(name.clone());
                }
                Ok(name.clone())
            }
            VariableKind::Output => {
                // outputs never take the literal path
                tracing::warn!("output variable `{}` dropped from guard", name);
                Ok(String::new())
            }
        },
        Term::Integer { .. } | Term::Boolean { .. } => Ok(String::new()),
        Term::Operator { kind, children } => match kind {
            OperatorKind::Not => {
                let inner = match children.first() {
                    Some(c) => build(c, variables)?,
                    None => String::new(),
                };
                Ok(format!("NOT[{}]", inner))
            }
            OperatorKind::And => Ok(format!("AND[{}]", join(children, ", ", variables)?)),
            OperatorKind::Or => Ok(format!("OR[{}]", join(children, ", ", variables)?)),
            OperatorKind::RisingEdge => {
                let s = join(children, "", variables)?;
                let before = if s.contains("AND") {
                    distribute_suffix(&s, BEFORE_RISING)
                } else {
                    format!("{}{}", s, BEFORE_RISING)
                };
                Ok(edge(&s, &before))
            }
            OperatorKind::FallingEdge => {
                let s = join(children, "", variables)?;
                let current = format!("{}{}", s, BEFORE_FALLING);
                // the negated branch is suffixed _beforeRE when S is an AND term
                let negated = if s.contains("AND") {
                    distribute_suffix(&s, BEFORE_RISING)
                } else {
                    s
                };
                Ok(edge(&current, &negated))
            }
            OperatorKind::Equals => equals(children),
            OperatorKind::LessThan => comparison("LESS", children),
            OperatorKind::GreaterThan => comparison("GREATER", children),
            OperatorKind::Other => join(children, ", ", variables),
        },
    }
}

fn join(children: &[Term], sep: &str, variables: &mut Vec<String>) -> Result<String, TranslateError> {
    let parts = children
        .iter()
        .map(|c| build(c, variables))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.iter().join(sep))
}

// AND[AND[a, NOT[b]], EQ[a, NOT[b]]]
fn edge(a: &str, b: &str) -> String {
    format!("AND[AND[{a}, NOT[{b}]], EQ[{a}, NOT[{b}]]]", a = a, b = b)
}

fn equals(children: &[Term]) -> Result<String, TranslateError> {
    if children.len() != 2 {
        return Err(TranslateError::EqualsArity { found: children.len() });
    }

    let other = children.iter().find(|c| !c.is_integer() && !c.is_boolean());
    if let Some(lit) = children.iter().find(|c| c.is_integer()) {
        let other = other.map(|o| o.to_string()).unwrap_or_default();
        return Ok(format!("EQUAL[{}, {}]", other, lit));
    }
    if let Some(lit) = children.iter().find(|c| c.is_boolean()) {
        let other = other.map(|o| o.to_string()).unwrap_or_default();
        return Ok(format!("EQ[{}, {}]", other, lit));
    }
    Ok(format!("EQ[{}, {}]", children[0], children[1]))
}

fn comparison(token: &str, children: &[Term]) -> Result<String, TranslateError> {
    let (literals, others): (Vec<&Term>, Vec<&Term>) = children.iter().partition(|c| c.is_integer());
    if literals.len() != 1 || others.len() != 1 {
        return Err(TranslateError::ComparisonLiteral {
            operator: token.to_owned(),
            found: literals.len(),
        });
    }

    let name = others[0].declared_name().ok_or_else(|| TranslateError::ComparisonOperand {
        operator: token.to_owned(),
        operand: others[0].to_string(),
    })?;
    Ok(format!("{}[{}, {}]", token, name, literals[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(term: &Term) -> String {
        translate(term).unwrap().notation
    }

    fn a() -> Term {
        Term::input("a")
    }

    fn b() -> Term {
        Term::input("b")
    }

    #[test]
    fn boolean_connectives() {
        let g = Term::and(vec![a(), Term::not(b()), Term::or(vec![a(), Term::var("s1", VariableKind::Step)])]);
        assert_eq!(t(&g), "AND[a, NOT[b], OR[a, s1]]");
    }

    #[test]
    fn collects_variables_once() {
        let g = Term::and(vec![a(), Term::not(b()), a()]);
        let tr = translate(&g).unwrap();
        assert_eq!(tr.variables, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn outputs_are_dropped() {
        let g = Term::and(vec![a(), Term::var("lamp", VariableKind::Output)]);
        let tr = translate(&g).unwrap();
        assert_eq!(tr.notation, "AND[a, ]");
        assert_eq!(tr.variables, vec!["a".to_string()]);
    }

    #[test]
    fn rising_edge_single_variable() {
        let out = t(&Term::rising(a()));
        assert_eq!(out, "AND[AND[a, NOT[a_beforeRE]], EQ[a, NOT[a_beforeRE]]]");
        assert_eq!(out.matches("_beforeRE").count(), 2);
        assert_eq!(out.matches("a_beforeRE").count(), 2);
    }

    #[test]
    fn rising_edge_distributes_over_and() {
        let out = t(&Term::rising(Term::and(vec![a(), b()])));
        assert_eq!(
            out,
            "AND[AND[AND[a, b], NOT[AND[a_beforeRE, b_beforeRE]]], \
             EQ[AND[a, b], NOT[AND[a_beforeRE, b_beforeRE]]]]"
        );
        assert!(!out.contains("]_beforeRE"));
    }

    #[test]
    fn rising_edge_over_or_suffixes_whole_term() {
        let out = t(&Term::rising(Term::or(vec![a(), b()])));
        assert_eq!(
            out,
            "AND[AND[OR[a, b], NOT[OR[a, b]_beforeRE]], EQ[OR[a, b], NOT[OR[a, b]_beforeRE]]]"
        );
    }

    #[test]
    fn falling_edge_keeps_mixed_suffixes() {
        assert_eq!(
            t(&Term::falling(a())),
            "AND[AND[a_beforeFE, NOT[a]], EQ[a_beforeFE, NOT[a]]]"
        );
        assert_eq!(
            t(&Term::falling(Term::and(vec![a(), b()]))),
            "AND[AND[AND[a, b]_beforeFE, NOT[AND[a_beforeRE, b_beforeRE]]], \
             EQ[AND[a, b]_beforeFE, NOT[AND[a_beforeRE, b_beforeRE]]]]"
        );
    }

    #[test]
    fn equality_forms() {
        let level = Term::var("level", VariableKind::Internal);
        let eq_int = Term::op(OperatorKind::Equals, vec![Term::int(3), level.clone()]);
        assert_eq!(t(&eq_int), "EQUAL[level, 3]");

        let eq_bool = Term::op(OperatorKind::Equals, vec![a(), Term::boolean(false)]);
        assert_eq!(t(&eq_bool), "EQ[a, false]");

        let eq_raw = Term::op(OperatorKind::Equals, vec![a(), b()]);
        assert_eq!(t(&eq_raw), "EQ[a, b]");
    }

    #[test]
    fn equality_composes_inside_connectives() {
        let level = Term::var("level", VariableKind::Internal);
        let g = Term::and(vec![a(), Term::op(OperatorKind::Equals, vec![level, Term::int(2)])]);
        assert_eq!(t(&g), "AND[a, EQUAL[level, 2]]");
    }

    #[test]
    fn ordering_comparisons() {
        let level = Term::var("level", VariableKind::Internal);
        let lt = Term::op(OperatorKind::LessThan, vec![level.clone(), Term::int(10)]);
        assert_eq!(t(&lt), "LESS[level, 10]");
        let gt = Term::op(OperatorKind::GreaterThan, vec![Term::int(-1), level]);
        assert_eq!(t(&gt), "GREATER[level, -1]");
    }

    #[test]
    fn ordering_comparison_needs_one_literal() {
        let lt = Term::op(OperatorKind::LessThan, vec![a(), b()]);
        assert_eq!(
            translate(&lt),
            Err(TranslateError::ComparisonLiteral { operator: "LESS".into(), found: 0 })
        );

        let gt = Term::op(OperatorKind::GreaterThan, vec![Term::and(vec![a()]), Term::int(1)]);
        assert!(matches!(translate(&gt), Err(TranslateError::ComparisonOperand { .. })));
    }

    #[test]
    fn unknown_operator_falls_back_to_children() {
        let g = Term::op(OperatorKind::Other, vec![a(), Term::not(b())]);
        assert_eq!(t(&g), "a, NOT[b]");
    }

    #[test]
    fn translation_is_idempotent() {
        let g = Term::rising(Term::and(vec![a(), Term::or(vec![b(), Term::not(a())])]));
        assert_eq!(translate(&g), translate(&g));
    }
}
