use std::sync::Mutex;

use buddy_rs::{take_manager, BDDManager, BDD};

use crate::bdd_domain::BDDDomain;
use crate::config::SolverConfig;
use crate::context::{Context, Domain, Ex};
use crate::error::SolverError;
use crate::solver::{SatBackend, SatQuery, SatResult};

// BuDDy keeps one global node table; sessions must not overlap.
static SESSION: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone, PartialEq)]
pub enum BDDVarType {
    Bool,
    Int(BDDDomain),
}

#[derive(Debug, Clone)]
pub struct BDDVar {
    orig_var_id: usize,
    bdd_var_id: i32,
    var_type: BDDVarType,
}

// (base, size) of the integer range for an atom compared with lo..=hi.
// one value on each side of the literals keeps every class of < > =
// representable.
fn int_range(name: &str, range: Option<(i64, i64)>) -> Result<(i64, i64), SolverError> {
    let too_wide = || SolverError::Backend(format!("integer range of `{}` is too wide", name));
    let (lo, hi) = range.unwrap_or((0, 0));
    let base = lo.checked_sub(1).ok_or_else(too_wide)?;
    let top = hi.checked_add(1).ok_or_else(too_wide)?;
    let size = top
        .checked_sub(base)
        .and_then(|s| s.checked_add(1))
        .filter(|s| *s <= 1 << 40)
        .ok_or_else(too_wide)?;
    Ok((base, size))
}

pub struct BDDContext {
    pub vars: Vec<BDDVar>,
    pub num_vars: i32,
    // declared last: every BDD above is released before the manager
    pub b: BDDManager,
}

impl BDDContext {
    /// Number of BDD variables `c` needs.
    pub fn num_vars_for(c: &Context) -> Result<i32, SolverError> {
        let mut n = 0;
        for v in &c.vars {
            n += match v.domain {
                Domain::Bool => 1,
                Domain::Int(range) => {
                    let (_, size) = int_range(&v.name, range)?;
                    BDDDomain::binsize_for(size)
                }
            };
        }
        Ok(n)
    }

    pub fn from(c: &Context, config: &SolverConfig) -> Result<Self, SolverError> {
        let num_vars = Self::num_vars_for(c)?;
        let b = take_manager(
            config.node_table_size as _,
            config.cache_size as _,
            num_vars.max(1) as _,
        );

        let mut vars = Vec::new();
        let mut offset = 0; // keep track of last added variable
        for (i, v) in c.vars.iter().enumerate() {
            match v.domain {
                Domain::Bool => {
                    vars.push(BDDVar { orig_var_id: i, bdd_var_id: offset, var_type: BDDVarType::Bool });
                    offset += 1;
                }
                Domain::Int(range) => {
                    let (base, size) = int_range(&v.name, range)?;
                    let domain = BDDDomain::new(&b, base, size, offset);
                    let bs = domain.binsize;
                    vars.push(BDDVar { orig_var_id: i, bdd_var_id: offset, var_type: BDDVarType::Int(domain) });
                    offset += bs;
                }
            }
        }

        Ok(BDDContext { vars, num_vars, b })
    }

    fn var(&self, t: usize) -> Result<&BDDVar, SolverError> {
        self.vars
            .iter()
            .find(|v| v.orig_var_id == t)
            .ok_or(SolverError::UnknownAtom(t))
    }

    /// Conjunction of the valid-code restrictions of all integer atoms.
    pub fn domain_constraint(&self) -> BDD {
        let mut r = self.b.one();
        for v in &self.vars {
            if let BDDVarType::Int(d) = &v.var_type {
                let dom = d.domain_bdd();
                r = self.b.and(&r, &dom);
            }
        }
        r
    }

    pub fn from_expr(&self, c: &Context, e: &Ex) -> Result<BDD, SolverError> {
        Ok(match e {
            Ex::AND(v) => {
                let mut x = self.b.one();
                for a in v {
                    let a = self.from_expr(c, a)?;
                    x = self.b.and(&x, &a);
                }
                x
            }
            Ex::OR(v) => {
                let mut x = self.b.zero();
                for a in v {
                    let a = self.from_expr(c, a)?;
                    x = self.b.or(&x, &a);
                }
                x
            }
            Ex::NOT(x) => {
                let xval = self.from_expr(c, x)?;
                self.b.not(&xval)
            }
            Ex::IFF(l, r) => {
                let lv = self.from_expr(c, l)?;
                let rv = self.from_expr(c, r)?;
                let nlv = self.b.not(&lv);
                let nrv = self.b.not(&rv);
                let both = self.b.and(&lv, &rv);
                let neither = self.b.and(&nlv, &nrv);

                // lv <-> rv
                self.b.or(&both, &neither)
            }
            Ex::TRUE => self.b.one(),
            Ex::FALSE => self.b.zero(),
            Ex::VAR(t) => {
                let v = self.var(*t)?;
                if v.var_type != BDDVarType::Bool {
                    return Err(SolverError::NotBoolean { name: c.name(*t) });
                }
                self.b.ithvar(v.bdd_var_id)
            }
            Ex::CMP(t, cmp, k) => match &self.var(*t)?.var_type {
                BDDVarType::Int(dom) => dom.compare(&self.b, *cmp, *k),
                BDDVarType::Bool => return Err(SolverError::NotInteger { name: c.name(*t) }),
            },
        })
    }
}

/// The satisfiability capability on top of BuDDy. One manager per query.
#[derive(Debug, Clone, Default)]
pub struct BddBackend {
    pub config: SolverConfig,
}

impl BddBackend {
    pub fn new(config: SolverConfig) -> Self {
        BddBackend { config }
    }
}

impl SatBackend for BddBackend {
    fn check(&self, query: &SatQuery<'_>) -> Result<SatResult, SolverError> {
        let needed = BDDContext::num_vars_for(query.context)?;
        if let Some(max) = self.config.max_variables {
            if needed as usize > max {
                return Ok(SatResult::Unknown(format!(
                    "query needs {} BDD variables, limit is {}",
                    needed, max
                )));
            }
        }

        let _session = SESSION.lock().unwrap_or_else(|e| e.into_inner());
        let bc = BDDContext::from(query.context, &self.config)?;

        let mut f = bc.domain_constraint();
        let g = bc.from_expr(query.context, query.formula)?;
        f = bc.b.and(&f, &g);
        for c in query.constraints {
            let g = bc.from_expr(query.context, c)?;
            f = bc.b.and(&f, &g);
        }

        let zero = bc.b.zero();
        tracing::trace!("query over {} BDD variables", bc.num_vars);
        Ok(if f == zero { SatResult::Unsat } else { SatResult::Sat })
    }
}
