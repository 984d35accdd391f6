// Helpers over the `OP[child, child, ...]` notation, shared by the
// translator and the notation parser.

/// Split on commas at bracket depth zero. Parts are returned untrimmed; a
/// trailing empty part is dropped.
pub fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if start < input.len() {
        parts.push(&input[start..]);
    }
    parts
}

/// True if every `]` closes an earlier `[` and nothing is left open.
pub fn is_balanced(input: &str) -> bool {
    let mut depth: i32 = 0;
    for c in input.chars() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Operator name and inner text of `OP[inner]`, or `None` for a leaf.
/// Does not validate; the parser checks balance and the closing bracket.
pub fn operator_and_inner(expr: &str) -> Option<(&str, &str)> {
    if !expr.contains('[') || !expr.contains(']') {
        return None;
    }
    let open = expr.find('[')?;
    let operator = expr[..open].trim();
    let inner = if expr.ends_with(']') {
        &expr[open + 1..expr.len() - 1]
    } else {
        &expr[open + 1..]
    };
    Some((operator, inner))
}

/// Append `suffix` to every leaf of a bracket expression, keeping operator
/// names and nesting as they are. A leaf-only expression gets the suffix
/// once.
pub fn distribute_suffix(expr: &str, suffix: &str) -> String {
    let expr = expr.trim();
    match operator_and_inner(expr) {
        None => format!("{}{}", expr, suffix),
        Some((operator, inner)) => {
            let parts: Vec<String> = split_top_level(inner)
                .into_iter()
                .map(|p| distribute_suffix(p, suffix))
                .collect();
            format!("{}[{}]", operator, parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_respects_depth() {
        assert_eq!(split_top_level("a, AND[b, c], d"), vec!["a", " AND[b, c]", " d"]);
        assert_eq!(split_top_level("NOT[OR[x, y]]"), vec!["NOT[OR[x, y]]"]);
        assert!(split_top_level("").is_empty());
    }

    #[test]
    fn balance() {
        assert!(is_balanced("AND[a, NOT[b]]"));
        assert!(!is_balanced("AND[a, NOT[b]"));
        assert!(!is_balanced("a]["));
    }

    #[test]
    fn suffix_reaches_every_leaf() {
        assert_eq!(distribute_suffix("a", "_x"), "a_x");
        assert_eq!(
            distribute_suffix("AND[a, NOT[b], OR[c, d]]", "_beforeRE"),
            "AND[a_beforeRE, NOT[b_beforeRE], OR[c_beforeRE, d_beforeRE]]"
        );
    }

    #[test]
    fn suffix_leaves_operator_names_alone() {
        let out = distribute_suffix("  AND[ AND[a,b] , c ]  ", "_s");
        assert_eq!(out, "AND[AND[a_s, b_s], c_s]");
    }
}
