//! Bracket notation to infix text to tokens.
//!
//! `AND[a, NOT[b], EQ[c, true]]` becomes `(a&~(b)&(c#true))`: every
//! operator application gets its own parentheses, which is what lets the
//! formula builder reduce without precedence rules.

use crate::brackets::{is_balanced, operator_and_inner, split_top_level};
use crate::error::NotationError;

const DELIMITERS: &[char] = &['#', '(', ')', '&', '|', '~', '<', '>', '!', '=', ' '];

fn operator_symbol(operator: &str) -> Option<&'static str> {
    match operator {
        "AND" => Some("&"),
        "OR" => Some("|"),
        "NOT" => Some("~"),
        "EQ" => Some("#"),
        "LESS" => Some("<"),
        "GREATER" => Some(">"),
        "EQUAL" => Some("="),
        _ => None,
    }
}

/// Rewrite bracket notation into fully parenthesized infix.
pub fn to_infix(input: &str) -> Result<String, NotationError> {
    let input = input.trim();

    let (operator, inner) = match operator_and_inner(input) {
        None => {
            if input.contains('[') || input.contains(']') {
                return Err(NotationError::UnbalancedBrackets { fragment: input.to_owned() });
            }
            return Ok(input.to_owned());
        }
        Some(split) => split,
    };

    if !input.ends_with(']') || !is_balanced(input) {
        return Err(NotationError::UnbalancedBrackets { fragment: input.to_owned() });
    }
    let symbol = operator_symbol(operator).ok_or_else(|| NotationError::UnknownOperator {
        operator: operator.to_owned(),
        fragment: input.to_owned(),
    })?;

    let parts = split_top_level(inner);
    if operator == "NOT" && parts.len() != 1 {
        return Err(NotationError::NotArity { found: parts.len(), fragment: input.to_owned() });
    }

    let mut out = String::from("(");
    for (i, part) in parts.iter().enumerate() {
        let part = part.trim();
        if part.is_empty() {
            return Err(NotationError::EmptyOperand { fragment: input.to_owned() });
        }
        if i > 0 {
            out.push_str(symbol);
        }
        out.push_str(&to_infix(part)?);
    }
    out.push(')');

    if operator == "NOT" {
        return Ok(format!("~{}", out));
    }
    Ok(out)
}

/// Drop one pair of parentheses if it wraps the whole expression.
pub fn strip_outer_parens(expr: &str) -> &str {
    if !(expr.starts_with('(') && expr.ends_with(')')) {
        return expr;
    }

    let mut balance = 0;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => balance += 1,
            ')' => balance -= 1,
            _ => {}
        }
        if balance == 0 && i < expr.len() - 1 {
            return expr;
        }
    }
    &expr[1..expr.len() - 1]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open,
    Close,
    And,
    Or,
    Not,
    Iff,
    Less,
    Greater,
    Equal,
    Bang,
    Word(String),
}

impl Token {
    pub fn is_comparison(&self) -> bool {
        matches!(self, Token::Less | Token::Greater | Token::Equal)
    }

    pub fn text(&self) -> &str {
        match self {
            Token::Open => "(",
            Token::Close => ")",
            Token::And => "&",
            Token::Or => "|",
            Token::Not => "~",
            Token::Iff => "#",
            Token::Less => "<",
            Token::Greater => ">",
            Token::Equal => "=",
            Token::Bang => "!",
            Token::Word(w) => w,
        }
    }

    fn delimiter(c: char) -> Option<Token> {
        let t = match c {
            '(' => Token::Open,
            ')' => Token::Close,
            '&' => Token::And,
            '|' => Token::Or,
            '~' => Token::Not,
            '#' => Token::Iff,
            '<' => Token::Less,
            '>' => Token::Greater,
            '=' => Token::Equal,
            '!' => Token::Bang,
            _ => return None,
        };
        Some(t)
    }
}

/// Split infix text on the delimiter set, keeping delimiters as tokens and
/// dropping spaces.
pub fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for c in expr.chars() {
        if DELIMITERS.contains(&c) {
            let w = word.trim();
            if !w.is_empty() {
                tokens.push(Token::Word(w.to_owned()));
            }
            word.clear();
            if let Some(t) = Token::delimiter(c) {
                tokens.push(t);
            }
        } else {
            word.push(c);
        }
    }

    let w = word.trim();
    if !w.is_empty() {
        tokens.push(Token::Word(w.to_owned()));
    }
    tokens
}
