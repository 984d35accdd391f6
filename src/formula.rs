use crate::context::{Cmp, Context, Ex};
use crate::error::NotationError;
use crate::notation::{strip_outer_parens, tokenize, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    And,
    Or,
    Iff,
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Open,
    Not,
    Op(BinOp),
    Formula(Ex),
    Int(i64),
}

/// Reduce fully parenthesized infix text to a formula over atoms interned
/// in `ctx`. Single pass; every `)` folds its run left to right.
pub fn build_formula(infix: &str, ctx: &mut Context) -> Result<Ex, NotationError> {
    let expr = strip_outer_parens(infix.trim());
    let tokens = tokenize(expr);
    tracing::trace!("tokens: {:?}", tokens.iter().map(|t| t.text()).collect::<Vec<_>>());

    let mut stack: Vec<Item> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Open => stack.push(Item::Open),
            Token::Close => {
                let run = pop_run(&mut stack).ok_or_else(|| NotationError::UnexpectedToken {
                    token: ")".to_owned(),
                })?;
                let f = fold(run, expr)?;
                push_operand(&mut stack, Item::Formula(f), expr)?;
            }
            Token::And => stack.push(Item::Op(BinOp::And)),
            Token::Or => stack.push(Item::Op(BinOp::Or)),
            Token::Iff => stack.push(Item::Op(BinOp::Iff)),
            Token::Not => stack.push(Item::Not),
            Token::Word(w) => {
                if tokens.get(i + 1).map_or(false, Token::is_comparison) {
                    // re-merge `name < literal` up to the closing parenthesis
                    let mut text = w.clone();
                    let mut j = i + 1;
                    while j < tokens.len() && tokens[j] != Token::Close {
                        text.push_str(tokens[j].text());
                        j += 1;
                    }
                    let atom = comparison(&text, ctx)?;
                    push_operand(&mut stack, Item::Formula(atom), expr)?;
                    i = j;
                    continue;
                }
                let item = word(w, ctx);
                push_operand(&mut stack, item, expr)?;
            }
            other => {
                return Err(NotationError::UnexpectedToken { token: other.text().to_owned() });
            }
        }
        i += 1;
    }

    if stack.contains(&Item::Open) {
        return Err(NotationError::Incomplete { fragment: expr.to_owned() });
    }
    fold(stack, expr)
}

fn word(w: &str, ctx: &mut Context) -> Item {
    if w.eq_ignore_ascii_case("true") {
        Item::Formula(Ex::TRUE)
    } else if w.eq_ignore_ascii_case("false") {
        Item::Formula(Ex::FALSE)
    } else if let Ok(k) = w.parse::<i64>() {
        Item::Int(k)
    } else {
        Item::Formula(Ex::VAR(ctx.bool_atom(w)))
    }
}

fn comparison(text: &str, ctx: &mut Context) -> Result<Ex, NotationError> {
    let bad = || NotationError::Comparison { fragment: text.to_owned() };

    let at = text.find(|c: char| c == '<' || c == '>' || c == '=').ok_or_else(bad)?;
    let name = text[..at].trim();
    let cmp = match &text[at..at + 1] {
        "<" => Cmp::Lt,
        ">" => Cmp::Gt,
        _ => Cmp::Eq,
    };
    let literal: i64 = text[at + 1..].trim().parse().map_err(|_| bad())?;
    if name.is_empty() {
        return Err(bad());
    }

    let var = ctx.int_atom(name, literal);
    Ok(Ex::CMP(var, cmp, literal))
}

// pending `~` markers apply to the operand pushed right after them
fn push_operand(stack: &mut Vec<Item>, item: Item, expr: &str) -> Result<(), NotationError> {
    let mut item = item;
    while stack.last() == Some(&Item::Not) {
        stack.pop();
        item = match item {
            Item::Formula(f) => Item::Formula(Ex::not(f)),
            _ => return Err(NotationError::Incomplete { fragment: expr.to_owned() }),
        };
    }
    stack.push(item);
    Ok(())
}

// everything above the last `(`, in push order; the `(` is consumed
fn pop_run(stack: &mut Vec<Item>) -> Option<Vec<Item>> {
    let open = stack.iter().rposition(|i| *i == Item::Open)?;
    let run = stack.split_off(open + 1);
    stack.pop();
    Some(run)
}

fn fold(run: Vec<Item>, expr: &str) -> Result<Ex, NotationError> {
    let incomplete = || NotationError::Incomplete { fragment: expr.to_owned() };

    let mut acc: Option<Ex> = None;
    let mut pending: Option<BinOp> = None;
    for item in run {
        match item {
            Item::Formula(f) => {
                acc = Some(match (acc.take(), pending.take()) {
                    (None, None) => f,
                    (Some(prev), Some(op)) => combine(op, prev, f),
                    _ => return Err(incomplete()),
                });
            }
            Item::Op(op) => {
                if acc.is_none() || pending.is_some() {
                    return Err(incomplete());
                }
                pending = Some(op);
            }
            Item::Int(k) => return Err(NotationError::UnexpectedToken { token: k.to_string() }),
            Item::Not | Item::Open => return Err(incomplete()),
        }
    }

    if pending.is_some() {
        return Err(incomplete());
    }
    acc.ok_or_else(incomplete)
}

fn combine(op: BinOp, prev: Ex, next: Ex) -> Ex {
    match op {
        BinOp::And => match prev {
            Ex::AND(mut v) => {
                v.push(next);
                Ex::AND(v)
            }
            prev => Ex::and(prev, next),
        },
        BinOp::Or => match prev {
            Ex::OR(mut v) => {
                v.push(next);
                Ex::OR(v)
            }
            prev => Ex::or(prev, next),
        },
        // against a constant this is plain equality, not a biconditional
        BinOp::Iff => match (prev, next) {
            (Ex::TRUE, e) | (e, Ex::TRUE) => e,
            (Ex::FALSE, e) | (e, Ex::FALSE) => Ex::not(e),
            (a, b) => Ex::iff(a, b),
        },
    }
}
