//! Error Types for the solver tools

use mathsolver_core::ToolError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExpressionError>;

/// Why an expression could not be evaluated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error("{name}() takes {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

impl From<ExpressionError> for ToolError {
    fn from(err: ExpressionError) -> Self {
        Self::Evaluation(err.to_string())
    }
}
