use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unbalanced parenthesis at offset {offset}")]
    UnbalancedParen { offset: usize },

    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    /// `offset` indexes the text handed to the failing stage: the infix
    /// pattern for `to_postfix`, the postfix pattern for the tree builder.
    #[error("operator {op:?} at offset {offset} is missing an operand")]
    MissingOperand { op: char, offset: usize },

    #[error("missing operator before offset {offset}")]
    MissingOperator { offset: usize },

    #[error("{count} operands left without an operator")]
    DanglingOperands { count: usize },

    #[error("pattern is empty")]
    EmptyPattern,

    #[error("pattern does not end with the end marker '#'")]
    MissingEndMarker,

    #[error("failed to write graph: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True for every error caused by a bad pattern, as opposed to I/O.
    pub fn is_malformed_pattern(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
