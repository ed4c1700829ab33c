//! Errors raised by the pipeline. A failed `transpile` never returns
//! partial output.

use thiserror::Error;
use zs_ast::Position;
use zs_lexer::LexError;

/// A recognized construct that is malformed (dangling `|>`, unterminated
/// `match`, bad arm pattern, …).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage}: {message} at {position}")]
pub struct SyntaxError {
    /// Name of the stage that rejected the input.
    pub stage: &'static str,
    pub message: String,
    /// Location in the source handed to `transpile`.
    pub position: Position,
}

impl SyntaxError {
    pub(crate) fn new(
        stage: &'static str,
        source: &str,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            message: message.into(),
            position: Position::locate(source, offset),
        }
    }

    /// Re-point the error at `offset` in `source`.
    pub(crate) fn relocate(self, source: &str, offset: usize) -> Self {
        Self {
            position: Position::locate(source, offset),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranspileError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

impl TranspileError {
    pub fn position(&self) -> Position {
        match self {
            TranspileError::Lex(e) => e.position,
            TranspileError::Syntax(e) => e.position,
        }
    }
}

pub type Result<T> = std::result::Result<T, TranspileError>;
