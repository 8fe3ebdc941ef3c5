use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected end of input at {pos}: scope still open")]
    UnexpectedEof { pos: usize },

    #[error("Unmatched delimiter {found:?} at {pos}")]
    UnmatchedDelimiter { pos: usize, found: String },

    #[error("Malformed options at {pos}: {message}")]
    MalformedOptions { pos: usize, message: String },

    #[error("Invalid syntax at {pos}: {message}")]
    InvalidSyntax { pos: usize, message: String },

    #[error("Unrecognized character at {pos}")]
    LexerError { pos: usize },
}

impl ParseError {
    pub fn unexpected_eof(pos: usize) -> Self {
        Self::UnexpectedEof { pos }
    }

    pub fn unmatched_delimiter(pos: usize, found: impl Into<String>) -> Self {
        Self::UnmatchedDelimiter {
            pos,
            found: found.into(),
        }
    }

    pub fn malformed_options(pos: usize, message: impl Into<String>) -> Self {
        Self::MalformedOptions {
            pos,
            message: message.into(),
        }
    }

    pub fn invalid_syntax(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }

    pub fn lexer_error(pos: usize) -> Self {
        Self::LexerError { pos }
    }
}
