use thiserror::Error;

pub type AomResult<T> = Result<T, AomError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AomError {
    #[error("Id collision: {id} is already registered")]
    IdCollision { id: String },

    #[error("Readonly violation: article {article} is readonly")]
    ReadonlyViolation { article: String },

    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    #[error("Node {id} is already attached to a parent")]
    AlreadyAttached { id: String },

    #[error("Attaching {id} would create a cycle")]
    CycleDetected { id: String },

    #[error("Not an article: {id}")]
    NotAnArticle { id: String },

    #[error("Invalid serialised form: {message}")]
    InvalidSerialisedForm { message: String },
}

impl AomError {
    pub fn id_collision(id: impl Into<String>) -> Self {
        Self::IdCollision { id: id.into() }
    }

    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    pub fn invalid_form(message: impl Into<String>) -> Self {
        Self::InvalidSerialisedForm {
            message: message.into(),
        }
    }
}
