//! Safe arithmetic evaluator.
//!
//! Accepts a closed grammar: numeric literals, `+ - * / // % **`, unary
//! sign, parentheses. Anything else (names, calls, attribute access) is
//! rejected without being evaluated. Numeric semantics: `/` always yields a
//! float, `//` floors, `%` takes the sign of the divisor, `**` is
//! right-associative and binds tighter than unary minus on its left.

#![allow(clippy::cast_precision_loss)]

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("unsupported expression")]
    Unsupported,

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token")]
    UnexpectedToken,

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluate an expression, returning the result — or the failure — as a
/// plain string. This is the tool-facing contract: it never panics and
/// never evaluates anything outside the closed grammar.
#[must_use]
pub fn evaluate(expr: &str) -> String {
    match eval(expr) {
        Ok(value) => value.to_string(),
        Err(e) => format!("Error: {e}"),
    }
}

/// Evaluate an expression to a numeric value.
pub fn eval(expr: &str) -> Result<Value, EvalError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expression()?;
    if parser.pos != parser.tokens.len() {
        return Err(EvalError::UnexpectedToken);
    }
    Ok(value)
}

/// A numeric value. Integer arithmetic stays integral where it can;
/// overflow and true division promote to float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            // Debug formatting keeps the trailing ".0" on whole floats.
            Self::Float(v) => write!(f, "{v:?}"),
        }
    }
}

impl Value {
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Self::Int(v) => v == 0,
            Self::Float(v) => v == 0.0,
        }
    }

    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_add(b)
                .map_or_else(|| Self::Float(a as f64 + b as f64), Self::Int),
            _ => Self::Float(self.as_f64() + rhs.as_f64()),
        }
    }

    fn sub(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_sub(b)
                .map_or_else(|| Self::Float(a as f64 - b as f64), Self::Int),
            _ => Self::Float(self.as_f64() - rhs.as_f64()),
        }
    }

    fn mul(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_mul(b)
                .map_or_else(|| Self::Float(a as f64 * b as f64), Self::Int),
            _ => Self::Float(self.as_f64() * rhs.as_f64()),
        }
    }

    /// True division always yields a float.
    fn div(self, rhs: Self) -> Result<Self, EvalError> {
        if rhs.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Self::Float(self.as_f64() / rhs.as_f64()))
    }

    /// Floor division: integral when both operands are, floored toward
    /// negative infinity either way.
    fn floordiv(self, rhs: Self) -> Result<Self, EvalError> {
        if rhs.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => match (a.checked_div(b), a.checked_rem(b)) {
                (Some(q), Some(r)) => {
                    let floored = if r != 0 && (r < 0) != (b < 0) { q - 1 } else { q };
                    Ok(Self::Int(floored))
                }
                _ => Ok(Self::Float((a as f64 / b as f64).floor())),
            },
            _ => Ok(Self::Float((self.as_f64() / rhs.as_f64()).floor())),
        }
    }

    /// Remainder with the sign of the divisor.
    fn rem(self, rhs: Self) -> Result<Self, EvalError> {
        if rhs.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) => match a.checked_rem(b) {
                Some(r) => {
                    let adjusted = if r != 0 && (r < 0) != (b < 0) { r + b } else { r };
                    Ok(Self::Int(adjusted))
                }
                None => Ok(Self::Float(0.0)),
            },
            _ => {
                let (a, b) = (self.as_f64(), rhs.as_f64());
                Ok(Self::Float(a - (a / b).floor() * b))
            }
        }
    }

    fn pow(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Int(a), Self::Int(b)) if b >= 0 => u32::try_from(b)
                .ok()
                .and_then(|exp| a.checked_pow(exp))
                .map_or_else(|| Self::Float((a as f64).powf(b as f64)), Self::Int),
            _ => Self::Float(self.as_f64().powf(rhs.as_f64())),
        }
    }

    fn neg(self) -> Self {
        match self {
            Self::Int(v) => v.checked_neg().map_or(Self::Float(-(v as f64)), Self::Int),
            Self::Float(v) => Self::Float(-v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(Value),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            c if c.is_ascii_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::StarStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::SlashSlash);
                    i += 2;
                } else {
                    tokens.push(Token::Slash);
                    i += 1;
                }
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                let mut is_float = false;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    if chars[i] == '.' {
                        is_float = true;
                    }
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = if is_float {
                    Value::Float(
                        literal
                            .parse()
                            .map_err(|_| EvalError::InvalidNumber(literal.clone()))?,
                    )
                } else {
                    literal.parse::<i64>().map_or_else(
                        |_| {
                            literal
                                .parse::<f64>()
                                .map(Value::Float)
                                .map_err(|_| EvalError::InvalidNumber(literal.clone()))
                        },
                        |v| Ok(Value::Int(v)),
                    )?
                };
                tokens.push(Token::Num(value));
            }
            _ => return Err(EvalError::Unsupported),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<Value, EvalError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = match op {
                Token::Plus => value.add(rhs),
                _ => value.sub(rhs),
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Value, EvalError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::SlashSlash | Token::Percent)) =
            self.peek()
        {
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value.mul(rhs),
                Token::Slash => value.div(rhs)?,
                Token::SlashSlash => value.floordiv(rhs)?,
                _ => value.rem(rhs)?,
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<Value, EvalError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(self.unary()?.neg())
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Value, EvalError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::StarStar) {
            self.pos += 1;
            // Right-associative; the exponent may carry its own sign.
            let exponent = self.unary()?;
            return Ok(base.pow(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Value, EvalError> {
        match self.bump() {
            Some(Token::Num(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.expression()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(value),
                    Some(_) => Err(EvalError::UnexpectedToken),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some(_) => Err(EvalError::UnexpectedToken),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_arithmetic() {
        assert_eq!(evaluate("2 + 2"), "4");
        assert_eq!(evaluate("10 - 3"), "7");
        assert_eq!(evaluate("6 * 7"), "42");
        assert_eq!(evaluate("(2 + 3) * 4"), "20");
    }

    #[test]
    fn true_division_always_floats() {
        assert_eq!(evaluate("10 / 2"), "5.0");
        assert_eq!(evaluate("7 / 2"), "3.5");
    }

    #[test]
    fn floor_division_and_remainder() {
        assert_eq!(evaluate("7 // 2"), "3");
        assert_eq!(evaluate("-7 // 2"), "-4");
        assert_eq!(evaluate("7 % 3"), "1");
        assert_eq!(evaluate("-7 % 3"), "2");
        assert_eq!(evaluate("7.5 // 2"), "3.0");
    }

    #[test]
    fn exponentiation() {
        assert_eq!(evaluate("2 ** 3"), "8");
        assert_eq!(evaluate("2 ** 3 ** 2"), "512");
        assert_eq!(evaluate("2 ** -1"), "0.5");
        assert_eq!(evaluate("-2 ** 2"), "-4");
    }

    #[test]
    fn unary_signs() {
        assert_eq!(evaluate("-5 + 3"), "-2");
        assert_eq!(evaluate("+5"), "5");
        assert_eq!(evaluate("--5"), "5");
    }

    #[test]
    fn float_literals() {
        assert_eq!(evaluate("3.5 + 1"), "4.5");
        assert_eq!(evaluate(".5 * 2"), "1.0");
    }

    #[test]
    fn names_and_calls_are_rejected() {
        assert_eq!(evaluate("import os"), "Error: unsupported expression");
        assert_eq!(evaluate("os.system"), "Error: unsupported expression");
        assert_eq!(evaluate("__import__(1)"), "Error: unsupported expression");
        assert_eq!(evaluate("1 + x"), "Error: unsupported expression");
    }

    #[test]
    fn division_by_zero_is_an_error_string() {
        assert_eq!(evaluate("1 / 0"), "Error: division by zero");
        assert_eq!(evaluate("1 // 0"), "Error: division by zero");
        assert_eq!(evaluate("1 % 0"), "Error: division by zero");
    }

    #[test]
    fn malformed_expressions_are_errors() {
        assert!(evaluate("").starts_with("Error"));
        assert!(evaluate("2 +").starts_with("Error"));
        assert!(evaluate("(1 + 2").starts_with("Error"));
        assert!(evaluate("1 2").starts_with("Error"));
        assert!(evaluate("1..2").starts_with("Error"));
    }

    #[test]
    fn integer_overflow_promotes_to_float() {
        let result = evaluate("9223372036854775807 + 1");
        assert!(result.parse::<f64>().is_ok());
        assert!(!result.starts_with("Error"));
    }
}
