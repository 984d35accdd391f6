use crate::context::{Context, Ex};
use crate::error::{NotationError, SolverError};
use crate::exclusion::{encode_exclusions, ExclusionRow};
use crate::formula::build_formula;
use crate::notation::to_infix;

/// Result of a satisfiability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    Sat,
    Unsat,
    Unknown(String),
}

/// A formula plus side constraints, all over the atoms of `context`.
#[derive(Debug, Clone, Copy)]
pub struct SatQuery<'a> {
    pub context: &'a Context,
    pub formula: &'a Ex,
    pub constraints: &'a [Ex],
}

/// The satisfiability capability the checker hands its queries to.
pub trait SatBackend {
    fn check(&self, query: &SatQuery<'_>) -> Result<SatResult, SolverError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable,
    Unsatisfiable,
    Unknown(String),
    /// The backend errored; classified like `Unsatisfiable`.
    SolverFailed(String),
}

pub struct SatisfiabilityChecker<'a, B: SatBackend + ?Sized> {
    backend: &'a B,
    exclusions: &'a [ExclusionRow],
}

impl<'a, B: SatBackend + ?Sized> SatisfiabilityChecker<'a, B> {
    pub fn new(backend: &'a B, exclusions: &'a [ExclusionRow]) -> Self {
        SatisfiabilityChecker { backend, exclusions }
    }

    /// Check a guard in bracket notation against every exclusion row.
    /// Atoms are interned afresh for each call.
    pub fn check(&self, notation: &str) -> Result<Verdict, NotationError> {
        let infix = to_infix(notation)?;
        tracing::trace!("infix: {}", infix);

        let mut ctx = Context::new();
        let formula = build_formula(&infix, &mut ctx)?;
        let constraints = encode_exclusions(self.exclusions, &mut ctx);
        tracing::debug!(
            "checking {} with {} exclusions over {} atoms",
            ctx.pretty_print(&formula),
            constraints.len(),
            ctx.vars.len()
        );

        let query = SatQuery {
            context: &ctx,
            formula: &formula,
            constraints: &constraints,
        };
        let verdict = match self.backend.check(&query) {
            Ok(SatResult::Sat) => Verdict::Satisfiable,
            Ok(SatResult::Unsat) => Verdict::Unsatisfiable,
            Ok(SatResult::Unknown(reason)) => Verdict::Unknown(reason),
            Err(e) => {
                tracing::warn!("solver failed on `{}`: {}", notation, e);
                Verdict::SolverFailed(e.to_string())
            }
        };
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bdd_context::BddBackend;
    use std::cell::Cell;

    struct Failing;

    impl SatBackend for Failing {
        fn check(&self, _: &SatQuery<'_>) -> Result<SatResult, SolverError> {
            Err(SolverError::Backend("out of nodes".into()))
        }
    }

    // records how many atoms each query saw
    #[derive(Default)]
    struct Recording {
        atoms: Cell<usize>,
    }

    impl SatBackend for Recording {
        fn check(&self, query: &SatQuery<'_>) -> Result<SatResult, SolverError> {
            self.atoms.set(query.context.vars.len());
            Ok(SatResult::Sat)
        }
    }

    #[test]
    fn exclusions_share_the_formula_atoms() {
        let rows = vec![ExclusionRow::new("A", "B"), ExclusionRow::new("C", "NOT[A]")];
        let backend = Recording::default();
        let checker = SatisfiabilityChecker::new(&backend, &rows);

        checker.check("OR[A, B]").unwrap();
        assert_eq!(backend.atoms.get(), 3);
    }

    #[test]
    fn verdicts_from_bdds() {
        let rows = vec![ExclusionRow::new("A", "B")];
        let backend = BddBackend::default();
        let checker = SatisfiabilityChecker::new(&backend, &rows);

        assert_eq!(checker.check("OR[A, B]").unwrap(), Verdict::Satisfiable);
        assert_eq!(checker.check("AND[A, B, C]").unwrap(), Verdict::Unsatisfiable);
        assert_eq!(checker.check("AND[A, NOT[A]]").unwrap(), Verdict::Unsatisfiable);
    }

    #[test]
    fn solver_failure_is_not_unsat() {
        let rows = vec![ExclusionRow::new("A", "B")];
        let checker = SatisfiabilityChecker::new(&Failing, &rows);
        assert_eq!(
            checker.check("OR[A, B]").unwrap(),
            Verdict::SolverFailed("solver backend failed: out of nodes".into())
        );
    }

    #[test]
    fn parse_errors_fail_fast() {
        let checker = SatisfiabilityChecker::new(&Failing, &[]);
        assert!(matches!(
            checker.check("AND[A, B"),
            Err(NotationError::UnbalancedBrackets { .. })
        ));
    }
}
