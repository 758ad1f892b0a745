//! The boolean expression language used by selector fragments.
//!
//! A deliberately small interpreted DSL: tokenize, parse to an AST of
//! comparisons and boolean combinators, evaluate against one track at a
//! time. Identifiers resolve through [`Env`](super::env::Env); `track` is
//! only valid with a field access (`track.channels > 2`).
//!
//! Operators, loosest to tightest: `or`/`||`, `and`/`&&`, `not`/`!`, then
//! the comparisons `== != < <= > >=` and `in` (case-insensitive substring
//! on strings).

use std::fmt;

use super::env::Env;

/// A runtime value produced during expression evaluation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => write!(f, "'{s}'"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Str(String),
    LParen,
    RParen,
    Dot,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Eq);
                    i += 2;
                } else {
                    return Err("single '=' is not an operator; use '=='".to_string());
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else {
                    tokens.push(Token::Bang);
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::AndAnd);
                    i += 2;
                } else {
                    return Err("single '&' is not an operator; use '&&' or 'and'".to_string());
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::OrOr);
                    i += 2;
                } else {
                    return Err("single '|' is not an operator; use '||' or 'or'".to_string());
                }
            }
            '\'' | '"' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            s.push(ch);
                            i += 1;
                        }
                        None => return Err("unterminated string literal".to_string()),
                    }
                }
                tokens.push(Token::Str(s));
            }
            '-' if chars.get(i + 1).is_some_and(|ch| ch.is_ascii_digit()) => {
                let (value, consumed) = lex_int(&chars[i..])?;
                tokens.push(Token::Int(value));
                i += consumed;
            }
            c if c.is_ascii_digit() => {
                let (value, consumed) = lex_int(&chars[i..])?;
                tokens.push(Token::Int(value));
                i += consumed;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    ident.push(chars[i]);
                    i += 1;
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    Ok(tokens)
}

fn lex_int(chars: &[char]) -> Result<(i64, usize), String> {
    let mut text = String::new();
    let mut i = 0;
    if chars[0] == '-' {
        text.push('-');
        i = 1;
    }
    while i < chars.len() && chars[i].is_ascii_digit() {
        text.push(chars[i]);
        i += 1;
    }
    text.parse::<i64>()
        .map(|value| (value, i))
        .map_err(|_| format!("invalid integer literal '{text}'"))
}

// ---------------------------------------------------------------------------
// AST + parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{symbol}")
    }
}

/// Parsed expression tree.
#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Bool(bool),
    Int(i64),
    Str(String),
    /// A selector variable, e.g. `isEnglish` or `lang`.
    Var(String),
    /// A field access on `track`, e.g. `track.channels`.
    Field(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    /// Case-insensitive substring containment: `'commentary' in name`.
    In(Box<Expr>, Box<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: &Token) -> Result<(), String> {
        match self.advance() {
            Some(ref t) if t == token => Ok(()),
            Some(t) => Err(format!("expected {token:?}, found {t:?}")),
            None => Err(format!("expected {token:?}, found end of expression")),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and()?;
        loop {
            let is_or = matches!(self.peek(), Some(Token::OrOr))
                || matches!(self.peek(), Some(Token::Ident(id)) if id == "or");
            if !is_or {
                break;
            }
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_not()?;
        loop {
            let is_and = matches!(self.peek(), Some(Token::AndAnd))
                || matches!(self.peek(), Some(Token::Ident(id)) if id == "and");
            if !is_and {
                break;
            }
            self.advance();
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, String> {
        let is_not = matches!(self.peek(), Some(Token::Bang))
            || matches!(self.peek(), Some(Token::Ident(id)) if id == "not");
        if is_not {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, String> {
        let left = self.parse_operand()?;

        let op = match self.peek() {
            Some(Token::Eq) => Some(CmpOp::Eq),
            Some(Token::Ne) => Some(CmpOp::Ne),
            Some(Token::Lt) => Some(CmpOp::Lt),
            Some(Token::Le) => Some(CmpOp::Le),
            Some(Token::Gt) => Some(CmpOp::Gt),
            Some(Token::Ge) => Some(CmpOp::Ge),
            Some(Token::Ident(id)) if id == "in" => {
                self.advance();
                let right = self.parse_operand()?;
                return Ok(Expr::In(Box::new(left), Box::new(right)));
            }
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let right = self.parse_operand()?;
            return Ok(Expr::Cmp(op, Box::new(left), Box::new(right)));
        }

        Ok(left)
    }

    fn parse_operand(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::Int(value)) => Ok(Expr::Int(value)),
            Some(Token::Str(value)) => Ok(Expr::Str(value)),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(ident)) => match ident.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "track" => {
                    if matches!(self.peek(), Some(Token::Dot)) {
                        self.advance();
                        match self.advance() {
                            Some(Token::Ident(field)) => Ok(Expr::Field(field)),
                            other => Err(format!("expected field name after 'track.', found {other:?}")),
                        }
                    } else {
                        Ok(Expr::Var(ident))
                    }
                }
                _ => Ok(Expr::Var(ident)),
            },
            Some(other) => Err(format!("unexpected token {other:?}")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

/// Parse an expression string into an AST.
pub(crate) fn parse(input: &str) -> Result<Expr, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!(
            "trailing tokens after expression: {:?}",
            &parser.tokens[parser.pos..]
        ));
    }
    Ok(expr)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

fn eval(expr: &Expr, env: &Env<'_>) -> Result<Value, String> {
    match expr {
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Int(i) => Ok(Value::Int(*i)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Var(name) => env.lookup(name),
        Expr::Field(name) => env.field(name),
        Expr::Not(inner) => match eval(inner, env)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(format!("'not' requires a boolean, found {}", other.type_name())),
        },
        Expr::And(left, right) => {
            // Short-circuiting, like the boolean operators it mirrors.
            match eval(left, env)? {
                Value::Bool(false) => Ok(Value::Bool(false)),
                Value::Bool(true) => match eval(right, env)? {
                    Value::Bool(b) => Ok(Value::Bool(b)),
                    other => Err(format!("'and' requires booleans, found {}", other.type_name())),
                },
                other => Err(format!("'and' requires booleans, found {}", other.type_name())),
            }
        }
        Expr::Or(left, right) => match eval(left, env)? {
            Value::Bool(true) => Ok(Value::Bool(true)),
            Value::Bool(false) => match eval(right, env)? {
                Value::Bool(b) => Ok(Value::Bool(b)),
                other => Err(format!("'or' requires booleans, found {}", other.type_name())),
            },
            other => Err(format!("'or' requires booleans, found {}", other.type_name())),
        },
        Expr::Cmp(op, left, right) => {
            let left = eval(left, env)?;
            let right = eval(right, env)?;
            compare(*op, &left, &right)
        }
        Expr::In(needle, haystack) => {
            let needle = eval(needle, env)?;
            let haystack = eval(haystack, env)?;
            match (&needle, &haystack) {
                (Value::Str(n), Value::Str(h)) => {
                    Ok(Value::Bool(h.to_lowercase().contains(&n.to_lowercase())))
                }
                _ => Err(format!(
                    "'in' requires strings, found {} in {}",
                    needle.type_name(),
                    haystack.type_name()
                )),
            }
        }
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<Value, String> {
    let result = match (left, right) {
        (Value::Int(a), Value::Int(b)) => match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        },
        (Value::Str(a), Value::Str(b)) => match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            _ => {
                return Err(format!("operator {op} is not defined for strings"));
            }
        },
        (Value::Bool(a), Value::Bool(b)) => match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            _ => {
                return Err(format!("operator {op} is not defined for booleans"));
            }
        },
        _ => {
            return Err(format!(
                "cannot compare {} with {}",
                left.type_name(),
                right.type_name()
            ));
        }
    };
    Ok(Value::Bool(result))
}

/// Evaluate a parsed expression against one track, requiring a boolean
/// result.
pub(crate) fn eval_bool(expr: &Expr, env: &Env<'_>) -> Result<bool, String> {
    match eval(expr, env)? {
        Value::Bool(b) => Ok(b),
        other => Err(format!(
            "expression result was {} ({other}), not boolean",
            other.type_name()
        )),
    }
}
