//! Expression evaluation
//!
//! Expressions arrive as raw text extracted by the line classifier. They are
//! tokenized with the shared [`Lexer`], parsed into a small [`Expr`] tree by
//! recursive descent (one method per precedence level) and evaluated against
//! the current [`Memory`]. Identifiers resolve straight from memory; nothing
//! here ever executes host code.
//!
//! # Precedence (lowest to highest)
//!
//! | Level | Operators              |
//! |-------|------------------------|
//! | 1     | `\|\|` `or`            |
//! | 2     | `&&` `and`             |
//! | 3     | `==` `!=`              |
//! | 4     | `<` `<=` `>` `>=`      |
//! | 5     | `+` `-`                |
//! | 6     | `*` `/` `%`            |
//! | 7     | unary `-` `+` `!` `not`, casts |
//!
//! Integer arithmetic is checked. Any float operand promotes the operation to
//! float; chars and bools promote to integers. `+` with a string operand
//! concatenates.

use super::errors::RuntimeError;
use crate::memory::value::Value;
use crate::memory::variables::Memory;
use crate::parser::ast::{SourceLocation, TypeHint};
use crate::parser::lexer::{Lexeme, Lexer, Token};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

/// Built-in conversion functions (`int(x)`, `Number(x)`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    ToInt,
    ToFloat,
    ToText,
    ToNumber,
    Abs,
}

impl Conversion {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" | "parseInt" => Some(Conversion::ToInt),
            "float" | "parseFloat" => Some(Conversion::ToFloat),
            "str" | "String" => Some(Conversion::ToText),
            "Number" => Some(Conversion::ToNumber),
            "abs" => Some(Conversion::Abs),
            _ => None,
        }
    }
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Variable(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Cast {
        target: TypeHint,
        operand: Box<Expr>,
    },
    Convert {
        conversion: Conversion,
        operand: Box<Expr>,
    },
}

/// Parse and evaluate `source` against `memory`
pub fn evaluate(
    source: &str,
    memory: &Memory,
    location: SourceLocation,
) -> Result<Value, RuntimeError> {
    let expr = parse_expression(source, location)?;
    expr.eval(memory, location)
}

/// Parse expression text into an [`Expr`]
pub fn parse_expression(source: &str, location: SourceLocation) -> Result<Expr, RuntimeError> {
    let tokens = Lexer::new(source)
        .tokenize()
        .map_err(|e| RuntimeError::Evaluation {
            message: format!("{} in '{}'", e, source.trim()),
            location,
        })?;

    let mut parser = ExprParser {
        tokens,
        position: 0,
        source,
        location,
    };
    let expr = parser.parse_or()?;
    match parser.peek() {
        Token::Eof => Ok(expr),
        other => Err(parser.error(format!("unexpected '{}'", other))),
    }
}

struct ExprParser<'a> {
    tokens: Vec<Lexeme>,
    position: usize,
    source: &'a str,
    location: SourceLocation,
}

impl ExprParser<'_> {
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.position)
            .map_or(&Token::Eof, |l| &l.token)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.position + offset)
            .map_or(&Token::Eof, |l| &l.token)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token != Token::Eof {
            self.position += 1;
        }
        token
    }

    fn error(&self, message: String) -> RuntimeError {
        RuntimeError::Evaluation {
            message: format!("{} in '{}'", message, self.source.trim()),
            location: self.location,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), RuntimeError> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}', found '{}'", expected, self.peek())))
        }
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self.peek(), Token::Ident(name) if name == word)
    }

    /// Parse logical OR (`||`, `or`)
    fn parse_or(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_and()?;
        while *self.peek() == Token::OrOr || self.is_word("or") {
            self.advance();
            let right = self.parse_and()?;
            left = binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    /// Parse logical AND (`&&`, `and`)
    fn parse_and(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_equality()?;
        while *self.peek() == Token::AndAnd || self.is_word("and") {
            self.advance();
            let right = self.parse_equality()?;
            left = binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek() {
                Token::EqEq => BinOp::Eq,
                Token::NotEq => BinOp::Ne,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::Lt => BinOp::Lt,
                Token::Le => BinOp::Le,
                Token::Gt => BinOp::Gt,
                Token::Ge => BinOp::Ge,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, RuntimeError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, RuntimeError> {
        let op = match self.peek() {
            Token::Minus => Some(UnaryOp::Neg),
            Token::Plus => Some(UnaryOp::Plus),
            Token::Bang => Some(UnaryOp::Not),
            Token::Ident(word) if word == "not" => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = Box::new(self.parse_unary()?);
            return Ok(Expr::Unary { op, operand });
        }

        // `(int) x`
        if *self.peek() == Token::LParen && *self.peek_at(2) == Token::RParen {
            if let Token::Ident(word) = self.peek_at(1) {
                if let Some(target) = TypeHint::from_keyword(word) {
                    self.position += 3;
                    let operand = Box::new(self.parse_unary()?);
                    return Ok(Expr::Cast { target, operand });
                }
            }
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, RuntimeError> {
        match self.advance() {
            Token::IntLiteral(n) => Ok(Expr::Literal(Value::Int(n))),
            Token::FloatLiteral(x) => Ok(Expr::Literal(Value::Float(x))),
            Token::CharLiteral(c) => Ok(Expr::Literal(Value::Char(c))),
            Token::StringLiteral(s) => Ok(Expr::Literal(Value::Str(s))),
            Token::LParen => {
                let expr = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Token::Ident(name) => self.parse_name(name),
            Token::Eof => Err(self.error("expression ended unexpectedly".to_string())),
            other => Err(self.error(format!("unexpected '{}'", other))),
        }
    }

    fn parse_name(&mut self, name: String) -> Result<Expr, RuntimeError> {
        match name.as_str() {
            "true" | "True" => return Ok(Expr::Literal(Value::Bool(true))),
            "false" | "False" => return Ok(Expr::Literal(Value::Bool(false))),
            "NULL" => return Ok(Expr::Literal(Value::Int(0))),
            _ => {}
        }

        if *self.peek() != Token::LParen {
            return Ok(Expr::Variable(name));
        }

        let conversion = Conversion::from_name(&name)
            .ok_or_else(|| self.error(format!("unknown function '{}'", name)))?;
        self.advance();
        let operand = Box::new(self.parse_or()?);
        self.expect(Token::RParen)?;
        Ok(Expr::Convert {
            conversion,
            operand,
        })
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

impl Expr {
    /// Evaluate against the current memory
    pub fn eval(&self, memory: &Memory, location: SourceLocation) -> Result<Value, RuntimeError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Variable(name) => {
                memory
                    .read(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UnboundVariable {
                        name: name.clone(),
                        location,
                    })
            }
            Expr::Unary { op, operand } => {
                let value = operand.eval(memory, location)?;
                eval_unary(*op, value, location)
            }
            Expr::Binary { op, left, right } => {
                let lhs = left.eval(memory, location)?;
                // Short-circuit
                match op {
                    BinOp::And if !lhs.is_truthy() => return Ok(Value::Bool(false)),
                    BinOp::Or if lhs.is_truthy() => return Ok(Value::Bool(true)),
                    _ => {}
                }
                let rhs = right.eval(memory, location)?;
                eval_binary(*op, lhs, rhs, location)
            }
            Expr::Cast { target, operand } => {
                let value = operand.eval(memory, location)?;
                if let Value::Str(_) = value {
                    return Err(type_error("a numeric value", &value, location));
                }
                Ok(value.coerce_to(*target))
            }
            Expr::Convert {
                conversion,
                operand,
            } => {
                let value = operand.eval(memory, location)?;
                eval_conversion(*conversion, value, location)
            }
        }
    }
}

fn type_error(expected: &str, got: &Value, location: SourceLocation) -> RuntimeError {
    RuntimeError::TypeError {
        expected: expected.to_string(),
        got: got.type_name().to_string(),
        location,
    }
}

fn eval_unary(op: UnaryOp, value: Value, location: SourceLocation) -> Result<Value, RuntimeError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Neg => match value {
            Value::Float(x) => Ok(Value::Float(-x)),
            Value::Str(_) => Err(type_error("a numeric operand", &value, location)),
            other => {
                let n = other.to_int().unwrap_or_default();
                n.checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| RuntimeError::IntegerOverflow {
                        operation: format!("-{}", n),
                        location,
                    })
            }
        },
        UnaryOp::Plus => match value {
            Value::Float(_) | Value::Int(_) => Ok(value),
            Value::Str(_) => Err(type_error("a numeric operand", &value, location)),
            other => Ok(Value::Int(other.to_int().unwrap_or_default())),
        },
    }
}

fn eval_binary(
    op: BinOp,
    lhs: Value,
    rhs: Value,
    location: SourceLocation,
) -> Result<Value, RuntimeError> {
    match op {
        BinOp::And | BinOp::Or => Ok(Value::Bool(rhs.is_truthy())),
        BinOp::Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(&lhs, &rhs))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ordering = compare_values(&lhs, &rhs).ok_or_else(|| RuntimeError::TypeError {
                expected: format!("comparable operands for '{}'", op.symbol()),
                got: format!("{} and {}", lhs.type_name(), rhs.type_name()),
                location,
            })?;
            let result = match op {
                BinOp::Lt => ordering == Ordering::Less,
                BinOp::Le => ordering != Ordering::Greater,
                BinOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinOp::Add if matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_)) => {
            Ok(Value::Str(format!("{}{}", lhs, rhs)))
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
            arithmetic(op, &lhs, &rhs, location)
        }
    }
}

fn arithmetic(
    op: BinOp,
    lhs: &Value,
    rhs: &Value,
    location: SourceLocation,
) -> Result<Value, RuntimeError> {
    for value in [lhs, rhs] {
        if let Value::Str(_) = value {
            return Err(RuntimeError::TypeError {
                expected: format!("numeric operands for '{}'", op.symbol()),
                got: value.type_name().to_string(),
                location,
            });
        }
    }

    if matches!(lhs, Value::Float(_)) || matches!(rhs, Value::Float(_)) {
        let (a, b) = (
            lhs.to_float().unwrap_or_default(),
            rhs.to_float().unwrap_or_default(),
        );
        return match op {
            BinOp::Add => Ok(Value::Float(a + b)),
            BinOp::Sub => Ok(Value::Float(a - b)),
            BinOp::Mul => Ok(Value::Float(a * b)),
            BinOp::Div | BinOp::Mod if b == 0.0 => Err(division_error(op, location)),
            BinOp::Div => Ok(Value::Float(a / b)),
            _ => Ok(Value::Float(a % b)),
        };
    }

    let (a, b) = (
        lhs.to_int().unwrap_or_default(),
        rhs.to_int().unwrap_or_default(),
    );
    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div | BinOp::Mod if b == 0 => return Err(division_error(op, location)),
        BinOp::Div => a.checked_div(b),
        _ => a.checked_rem(b),
    };

    result
        .map(Value::Int)
        .ok_or_else(|| RuntimeError::IntegerOverflow {
            operation: format!("{} {} {}", a, op.symbol(), b),
            location,
        })
}

fn division_error(op: BinOp, location: SourceLocation) -> RuntimeError {
    RuntimeError::DivisionByZero {
        operation: (if op == BinOp::Mod { "Modulo" } else { "Division" }).to_string(),
        location,
    }
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Str(_), _) | (_, Value::Str(_)) => false,
        _ => compare_values(lhs, rhs) == Some(Ordering::Equal),
    }
}

/// Numeric ordering with promotion, or lexical ordering of two strings
fn compare_values(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Str(_), _) | (_, Value::Str(_)) => None,
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            lhs.to_float()?.partial_cmp(&rhs.to_float()?)
        }
        _ => Some(lhs.to_int()?.cmp(&rhs.to_int()?)),
    }
}

fn eval_conversion(
    conversion: Conversion,
    value: Value,
    location: SourceLocation,
) -> Result<Value, RuntimeError> {
    let invalid = |value: &Value| RuntimeError::Evaluation {
        message: format!("cannot convert '{}' to a number", value),
        location,
    };

    match conversion {
        Conversion::ToText => Ok(Value::Str(value.to_string())),
        Conversion::ToInt => match &value {
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| invalid(&value)),
            other => other.to_int().map(Value::Int).ok_or_else(|| invalid(other)),
        },
        Conversion::ToFloat => match &value {
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid(&value)),
            other => other.to_float().map(Value::Float).ok_or_else(|| invalid(other)),
        },
        Conversion::ToNumber => match &value {
            Value::Str(s) => match Value::parse_scalar(s.trim()) {
                Value::Str(_) => Err(invalid(&value)),
                number => Ok(number),
            },
            Value::Float(_) | Value::Int(_) => Ok(value),
            other => Ok(Value::Int(other.to_int().unwrap_or_default())),
        },
        Conversion::Abs => match value {
            Value::Float(x) => Ok(Value::Float(x.abs())),
            Value::Str(_) => Err(type_error("a numeric argument", &value, location)),
            other => {
                let n = other.to_int().unwrap_or_default();
                n.checked_abs()
                    .map(Value::Int)
                    .ok_or_else(|| RuntimeError::IntegerOverflow {
                        operation: format!("abs({})", n),
                        location,
                    })
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_in(source: &str, memory: &Memory) -> Result<Value, RuntimeError> {
        evaluate(source, memory, SourceLocation::line(1))
    }

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        eval_in(source, &Memory::with_seed(0))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 4"), Ok(Value::Int(14)));
        assert_eq!(eval("(2 + 3) * 4"), Ok(Value::Int(20)));
        assert_eq!(eval("10 - 4 - 3"), Ok(Value::Int(3)));
        assert_eq!(eval("-2 * -3"), Ok(Value::Int(6)));
        assert_eq!(eval("1 + 2 < 4 && 3 != 3"), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_integer_and_float_division() {
        assert_eq!(eval("7 / 2"), Ok(Value::Int(3)));
        assert_eq!(eval("-7 % 3"), Ok(Value::Int(-1)));
        assert_eq!(eval("7 / 2.0"), Ok(Value::Float(3.5)));
        assert_eq!(eval("(float) 7 / 2"), Ok(Value::Float(3.5)));
        assert_eq!(eval("(int) 3.9"), Ok(Value::Int(3)));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            eval("1 / 0"),
            Err(RuntimeError::DivisionByZero { ref operation, .. }) if operation == "Division"
        ));
        assert!(matches!(eval("5 % 0"), Err(RuntimeError::DivisionByZero { .. })));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            eval("9223372036854775807 + 1"),
            Err(RuntimeError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn test_variables_resolve_from_memory() {
        let mut memory = Memory::with_seed(0);
        memory.declare("x", Value::Int(5));
        memory.declare("grade", Value::Char('A'));
        assert_eq!(eval_in("x * 2 + 1", &memory), Ok(Value::Int(11)));
        assert_eq!(eval_in("grade + 1", &memory), Ok(Value::Int(66)));
        assert_eq!(eval_in("x > 0", &memory), Ok(Value::Bool(true)));

        match eval_in("x + y", &memory) {
            Err(RuntimeError::UnboundVariable { name, .. }) => assert_eq!(name, "y"),
            other => panic!("Expected unbound variable, got {:?}", other),
        }
    }

    #[test]
    fn test_python_words() {
        let mut memory = Memory::with_seed(0);
        memory.declare("n", Value::Int(4));
        assert_eq!(
            eval_in("n > 2 and not n == 3", &memory),
            Ok(Value::Bool(true))
        );
        assert_eq!(eval_in("False or n < 0", &memory), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_short_circuit_skips_errors() {
        assert_eq!(eval("0 && 1 / 0"), Ok(Value::Bool(false)));
        assert_eq!(eval("1 || missing"), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_string_concatenation_and_comparison() {
        assert_eq!(
            eval(r#""Age: " + 21"#),
            Ok(Value::Str("Age: 21".to_string()))
        );
        assert_eq!(eval(r#""abc" == "abc""#), Ok(Value::Bool(true)));
        assert_eq!(eval(r#""1" == 1"#), Ok(Value::Bool(false)));
        assert!(matches!(
            eval(r#""a" - 1"#),
            Err(RuntimeError::TypeError { .. })
        ));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(eval(r#"int("42")"#), Ok(Value::Int(42)));
        assert_eq!(eval(r#"Number("2.5")"#), Ok(Value::Float(2.5)));
        assert_eq!(eval("str(7) + \"!\""), Ok(Value::Str("7!".to_string())));
        assert_eq!(eval("abs(-3)"), Ok(Value::Int(3)));
        assert!(matches!(
            eval("launch(1)"),
            Err(RuntimeError::Evaluation { .. })
        ));
    }

    #[test]
    fn test_malformed_expressions() {
        for source in ["", "1 +", "(1 + 2", "1 2", "x = 3", "@"] {
            assert!(
                matches!(eval(source), Err(RuntimeError::Evaluation { .. })),
                "source {:?}",
                source
            );
        }
    }
}
