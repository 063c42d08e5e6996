use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeholdError {
    #[error("only one non-name subject is allowed per inspection")]
    MultipleSubjects,

    #[error("the subject exposes no attribute mapping")]
    NoAttributes,

    #[error("a tag is required for stashing")]
    MissingTag,

    #[error("stash '{name}' not found; known tags: {known:?}")]
    UnknownStash { name: String, known: Vec<String> },

    #[error("strict mode: '{0}' does not exist in the reference source")]
    StrictMiss(String),

    #[error("could not determine which attributes to show")]
    NothingToShow,

    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BeholdError>;
