use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::context::{Context, Ex};
use crate::error::TableError;

/// One mutual-exclusion fact: `var1` and `var2` never hold together.
/// Either name may be written `NOT[name]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusionRow {
    pub var1: String,
    pub var2: String,
    pub component: Option<String>,
    pub reason: Option<String>,
}

impl ExclusionRow {
    pub fn new(var1: &str, var2: &str) -> Self {
        ExclusionRow {
            var1: var1.to_owned(),
            var2: var2.to_owned(),
            component: None,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionTable {
    pub rows: Vec<ExclusionRow>,
}

impl ExclusionTable {
    pub fn from_rows(rows: Vec<ExclusionRow>) -> Self {
        ExclusionTable { rows }
    }

    /// Delimiter-separated text with a header row. Lines with the wrong
    /// number of fields, or without `Var1`/`Var2`, are skipped.
    pub fn parse(text: &str, delimiter: char) -> Self {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let header: Vec<&str> = match lines.next() {
            Some(h) => h.split(delimiter).map(|f| f.trim().trim_start_matches('\u{feff}')).collect(),
            None => {
                tracing::warn!("exclusion table is empty");
                return ExclusionTable::default();
            }
        };
        let column = |name: &str| header.iter().position(|h| *h == name);
        let (var1, var2) = (column("Var1"), column("Var2"));
        let (component, reason) = (column("Component"), column("Reason"));

        let mut rows = Vec::new();
        for (n, line) in lines.enumerate() {
            let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
            if fields.len() != header.len() {
                tracing::debug!("skipping exclusion line {}: {} fields, expected {}", n + 2, fields.len(), header.len());
                continue;
            }

            let field = |i: Option<usize>| i.map(|i| fields[i]).filter(|f| !f.is_empty());
            match (field(var1), field(var2)) {
                (Some(v1), Some(v2)) => rows.push(ExclusionRow {
                    var1: v1.to_owned(),
                    var2: v2.to_owned(),
                    component: field(component).map(str::to_owned),
                    reason: field(reason).map(str::to_owned),
                }),
                _ => tracing::debug!("skipping exclusion line {}: missing Var1/Var2", n + 2),
            }
        }

        ExclusionTable { rows }
    }

    pub fn from_path(path: &Path, delimiter: char) -> Result<Self, TableError> {
        let text = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text, delimiter);
        tracing::debug!("loaded {} exclusion rows from {}", table.rows.len(), path.display());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// `NOT[x]` resolves to the negation of atom `x`
fn resolve(name: &str, ctx: &mut Context) -> Ex {
    match name.strip_prefix("NOT[") {
        Some(rest) => {
            let inner = rest.strip_suffix(']').unwrap_or(rest).trim();
            Ex::not(Ex::VAR(ctx.bool_atom(inner)))
        }
        None => Ex::VAR(ctx.bool_atom(name.trim())),
    }
}

/// One `!(var1 && var2)` constraint per row, over the atoms of `ctx`.
pub fn encode_exclusions(rows: &[ExclusionRow], ctx: &mut Context) -> Vec<Ex> {
    rows.iter()
        .map(|row| {
            let a = resolve(&row.var1, ctx);
            let b = resolve(&row.var2, ctx);
            Ex::not(Ex::and(a, b))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_skips_malformed_lines() {
        let text = indoc! {"
            Component;Var1;Var2;Reason
            Cylinder;B1;B2;end positions

            Cylinder;B3;B4
            Valve;;Y1;no var1
            Press;S1;NOT[S2];interlock
        "};
        let table = ExclusionTable::parse(text, ';');

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[0],
            ExclusionRow {
                var1: "B1".into(),
                var2: "B2".into(),
                component: Some("Cylinder".into()),
                reason: Some("end positions".into()),
            }
        );
        assert_eq!(table.rows[1].var2, "NOT[S2]");
    }

    #[test]
    fn parse_without_var_columns_is_empty() {
        let table = ExclusionTable::parse("A,B\nx,y\n", ',');
        assert!(table.is_empty());
        assert!(ExclusionTable::parse("", ';').is_empty());
    }

    #[test]
    fn plain_row_excludes_both() {
        let mut ctx = Context::new();
        let c = encode_exclusions(&[ExclusionRow::new("x", "y")], &mut ctx);
        assert_eq!(c, vec![Ex::not(Ex::and(Ex::VAR(0), Ex::VAR(1)))]);
    }

    #[test]
    fn negated_row_is_implication() {
        let mut ctx = Context::new();
        let c = encode_exclusions(&[ExclusionRow::new("x", "NOT[y]")], &mut ctx);
        let (x, y) = (ctx.get_bool("x").unwrap(), ctx.get_bool("y").unwrap());

        // equivalent to x -> y
        for xv in 0..2 {
            for yv in 0..2 {
                let got = c[0].eval(&|v| if v == x { xv } else if v == y { yv } else { 0 });
                assert_eq!(got, xv == 0 || yv == 1);
            }
        }
    }

    #[test]
    fn encoding_reuses_formula_atoms() {
        let mut ctx = Context::new();
        let a = ctx.bool_atom("a");
        encode_exclusions(&[ExclusionRow::new("NOT[a]", "b")], &mut ctx);
        assert_eq!(ctx.get_bool("a"), Some(a));
        assert_eq!(ctx.bool_names(), vec!["a", "b"]);
    }
}
