use std::path::PathBuf;

/// Raised when resume or posting input cannot be turned into a model.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("resume text is empty")]
    EmptyResume,
    #[error("unable to read resume {path}: {reason}")]
    UnreadableResume { path: PathBuf, reason: String },
    #[error("posting is missing an identifier")]
    MissingPostingId,
    #[error("posting {id} has neither a title nor a description")]
    EmptyPosting { id: String },
    #[error("invalid posting record: {source}")]
    InvalidPosting {
        #[from]
        source: serde_json::Error,
    },
}
