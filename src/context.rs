use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Lt,
    Gt,
    Eq,
}

impl Cmp {
    pub fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Cmp::Lt => lhs < rhs,
            Cmp::Gt => lhs > rhs,
            Cmp::Eq => lhs == rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Cmp::Lt => "<",
            Cmp::Gt => ">",
            Cmp::Eq => "=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ex {
    AND(Vec<Ex>),
    OR(Vec<Ex>),
    NOT(Box<Ex>),
    IFF(Box<Ex>, Box<Ex>),
    TRUE,
    FALSE,
    VAR(usize),           // boolean atom, index in context
    CMP(usize, Cmp, i64), // integer atom compared with a literal
}

impl Ex {
    pub fn and(a: Ex, b: Ex) -> Ex {
        Ex::AND(vec![a, b])
    }

    pub fn or(a: Ex, b: Ex) -> Ex {
        Ex::OR(vec![a, b])
    }

    pub fn not(e: Ex) -> Ex {
        Ex::NOT(Box::new(e))
    }

    pub fn iff(a: Ex, b: Ex) -> Ex {
        Ex::IFF(Box::new(a), Box::new(b))
    }

    /// Evaluate under an assignment; booleans are read as `value != 0`.
    pub fn eval<F: Fn(usize) -> i64>(&self, value: &F) -> bool {
        match self {
            Ex::AND(v) => v.iter().all(|e| e.eval(value)),
            Ex::OR(v) => v.iter().any(|e| e.eval(value)),
            Ex::NOT(e) => !e.eval(value),
            Ex::IFF(a, b) => a.eval(value) == b.eval(value),
            Ex::TRUE => true,
            Ex::FALSE => false,
            Ex::VAR(v) => value(*v) != 0,
            Ex::CMP(v, cmp, k) => cmp.holds(value(*v), *k),
        }
    }

    /// Atom indices mentioned, sorted and deduplicated.
    pub fn support(&self) -> Vec<usize> {
        let mut acc = Vec::new();
        self.collect_atoms(&mut acc);
        acc.sort_unstable();
        acc.dedup();
        acc
    }

    fn collect_atoms(&self, acc: &mut Vec<usize>) {
        match self {
            Ex::AND(v) | Ex::OR(v) => v.iter().for_each(|e| e.collect_atoms(acc)),
            Ex::NOT(e) => e.collect_atoms(acc),
            Ex::IFF(a, b) => {
                a.collect_atoms(acc);
                b.collect_atoms(acc);
            }
            Ex::TRUE | Ex::FALSE => {}
            Ex::VAR(v) | Ex::CMP(v, _, _) => acc.push(*v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    Bool,
    // smallest and largest literal the atom is compared with
    Int(Option<(i64, i64)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub name: String,
    pub domain: Domain,
}

/// Atom table for one query. Boolean and integer atoms live in separate
/// namespaces, so `x` and the `x` of `x<3` are different atoms.
#[derive(Debug, Default)]
pub struct Context {
    pub vars: Vec<Var>,
}

impl Context {
    pub fn new() -> Self {
        Context { vars: Vec::new() }
    }

    pub fn get_bool(&self, name: &str) -> Option<usize> {
        self.vars
            .iter()
            .position(|v| v.name == name && v.domain == Domain::Bool)
    }

    pub fn get_int(&self, name: &str) -> Option<usize> {
        self.vars
            .iter()
            .position(|v| v.name == name && matches!(v.domain, Domain::Int(_)))
    }

    /// Interned boolean atom, created on first use.
    pub fn bool_atom(&mut self, name: &str) -> usize {
        match self.get_bool(name) {
            Some(i) => i,
            None => {
                self.vars.push(Var { name: name.to_owned(), domain: Domain::Bool });
                self.vars.len() - 1
            }
        }
    }

    /// Interned integer atom; records `literal` in its domain.
    pub fn int_atom(&mut self, name: &str, literal: i64) -> usize {
        let i = match self.get_int(name) {
            Some(i) => i,
            None => {
                self.vars.push(Var { name: name.to_owned(), domain: Domain::Int(None) });
                self.vars.len() - 1
            }
        };

        if let Domain::Int(range) = &mut self.vars[i].domain {
            *range = Some(match *range {
                None => (literal, literal),
                Some((lo, hi)) => (lo.min(literal), hi.max(literal)),
            });
        }
        i
    }

    pub fn name(&self, var: usize) -> String {
        self.vars
            .get(var)
            .map(|v| v.name.clone())
            .unwrap_or(format!("{}", var))
    }

    pub fn bool_names(&self) -> Vec<&str> {
        self.vars
            .iter()
            .filter(|v| v.domain == Domain::Bool)
            .map(|v| v.name.as_str())
            .collect()
    }

    pub fn pretty_print(&self, expr: &Ex) -> String {
        match expr {
            Ex::AND(v) => {
                format!("( {} )", v.iter().map(|e| self.pretty_print(e)).join(" && "))
            }
            Ex::OR(v) => {
                format!("( {} )", v.iter().map(|e| self.pretty_print(e)).join(" || "))
            }
            Ex::NOT(e) => format!("!( {} )", self.pretty_print(e)),
            Ex::IFF(a, b) => format!("( {} <-> {} )", self.pretty_print(a), self.pretty_print(b)),
            Ex::FALSE => "F".to_string(),
            Ex::TRUE => "T".to_string(),
            Ex::VAR(var) => self.name(*var),
            Ex::CMP(var, cmp, k) => format!("{} {} {}", self.name(*var), cmp.symbol(), k),
        }
    }
}

#[test]
fn interning_reuses_atoms() {
    let mut c = Context::new();
    let a = c.bool_atom("a");
    let b = c.bool_atom("b");
    assert_eq!(c.bool_atom("a"), a);
    assert_ne!(a, b);

    // same name, other namespace
    let ia = c.int_atom("a", 4);
    assert_ne!(ia, a);
    c.int_atom("a", -2);
    assert_eq!(c.vars[ia].domain, Domain::Int(Some((-2, 4))));
    assert_eq!(c.bool_names(), vec!["a", "b"]);
}

#[test]
fn pretty_and_eval() {
    let mut c = Context::new();
    let a = c.bool_atom("a");
    let l = c.int_atom("level", 3);
    let e = Ex::and(Ex::not(Ex::VAR(a)), Ex::CMP(l, Cmp::Lt, 3));

    assert_eq!(c.pretty_print(&e), "( !( a ) && level < 3 )");
    assert!(e.eval(&|v| if v == a { 0 } else { 2 }));
    assert!(!e.eval(&|v| if v == a { 0 } else { 3 }));
    assert_eq!(e.support(), vec![a, l]);
}
