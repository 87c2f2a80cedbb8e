//! Arithmetic question generation.
//!
//! Each question is two operands in `[1, 99]` joined by `+`, `-` or `*`. The
//! expected answer is always rendered with two decimal places, even though
//! every supported operator yields an integral result; clients compare the
//! string verbatim.

use rand::Rng;
use std::fmt;

/// Smallest operand that can be drawn.
pub const MIN_OPERAND: i64 = 1;
/// Largest operand that can be drawn.
pub const MAX_OPERAND: i64 = 99;

/// The arithmetic operators a question can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    /// Every operator, in draw order.
    pub const ALL: [Operator; 3] = [Operator::Add, Operator::Subtract, Operator::Multiply];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
        }
    }

    pub fn apply(self, a: i64, b: i64) -> i64 {
        match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A generated question and its expected answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub correct_answer: String,
}

/// Builds the question for a fixed pair of operands and an operator.
pub fn compose(a: i64, op: Operator, b: i64) -> Question {
    let result = op.apply(a, b) as f64;
    Question {
        prompt: format!("{a} {op} {b}"),
        correct_answer: format!("{result:.2}"),
    }
}

/// Draws two operands and an operator uniformly from their ranges.
pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> (i64, Operator, i64) {
    let a = rng.random_range(MIN_OPERAND..=MAX_OPERAND);
    let b = rng.random_range(MIN_OPERAND..=MAX_OPERAND);
    let op = Operator::ALL[rng.random_range(0..Operator::ALL.len())];
    (a, op, b)
}

/// Generates a question from the supplied random source.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Question {
    let (a, op, b) = draw(rng);
    compose(a, op, b)
}

/// Generates a question from the thread-local generator.
///
/// `rand::rng()` is seeded from the operating system once per thread and is
/// never re-seeded here, so concurrent sessions draw independent sequences.
pub fn generate() -> Question {
    generate_with(&mut rand::rng())
}
