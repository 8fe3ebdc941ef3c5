use manuscript_aom::AomError;
use manuscript_parser::ParseError;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Unknown document class, unknown top-level tag, or a non-tag node
    /// where the preamble expects tags. Fatal: no partial article.
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// Wrong arity or non-literal text where literal text is required
    #[error("Malformed argument to \\{tag}: {message}")]
    MalformedArgument { tag: String, message: String },

    /// An environment whose name is not `document`
    #[error("Invalid environment: expected document, found {0}")]
    InvalidEnvironment(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Tree(#[from] AomError),
}

impl CompileError {
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::UnsupportedConstruct(construct.into())
    }

    pub fn malformed(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedArgument {
            tag: tag.into(),
            message: message.into(),
        }
    }
}
