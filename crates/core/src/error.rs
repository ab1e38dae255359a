use std::path::PathBuf;

/// Errors surfaced by the conversion pipeline.
///
/// Timestamp parse failures are not represented here: the parser absorbs
/// them by treating the offending line as a continuation.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("error reading {}: {cause}", .path.display())]
    SourceRead { path: PathBuf, cause: String },
    #[error("no .txt transcript found in archive {}", .path.display())]
    NoTranscriptFound { path: PathBuf },
    #[error("export failed: {0}")]
    Export(String),
    #[error("transcript produced no messages")]
    EmptyResult,
    #[error("conversion worker stopped before finishing")]
    WorkerStopped,
}

impl ChatError {
    pub fn source_read(path: impl Into<PathBuf>, cause: impl std::fmt::Display) -> Self {
        ChatError::SourceRead {
            path: path.into(),
            cause: cause.to_string(),
        }
    }

    /// True for every failure that happened while reading the input.
    pub fn is_source_read(&self) -> bool {
        matches!(
            self,
            ChatError::SourceRead { .. } | ChatError::NoTranscriptFound { .. }
        )
    }
}
