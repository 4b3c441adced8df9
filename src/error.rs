//! Error types and result handling for pipeline operations.
//!
//! Every fatal condition of a run is a variant of [`Error`]. A failed batch
//! conversion is not an error: it is reported through
//! [`ConversionOutcome`](crate::types::ConversionOutcome) so the pipeline can
//! keep going.
use std::path::PathBuf;

/// Type alias for Results with pipeline errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort a pipeline run.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    PipelineBuilder(#[from] crate::pipeline::PipelineConfigBuilderError),
    /// A configuration value violates an invariant (zero batch size, empty URL, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// A required executable could not be found
    #[error("Missing dependency: {0}")]
    MissingDependency(String),
    /// The downloader ran but exited unsuccessfully
    #[error(
        "Download command `{command}` failed with {}{}",
        describe_exit(.exit_code),
        describe_stderr(.stderr)
    )]
    DownloadFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    /// The downloader's output tree does not look the way it should
    #[error("Unexpected download layout at '{0:?}': {1}")]
    UnexpectedLayout(PathBuf, String),
    /// A chapter directory name carries no chapter number
    #[error("Cannot extract a chapter number from '{0}'")]
    UnparsableChapterName(String),
    /// The output root exists and nobody can be asked whether to delete it
    #[error("'{0:?}' already exists and its deletion cannot be confirmed")]
    ConfirmationUnavailable(PathBuf),
    /// Two batches would share one folder name
    #[error("Batch folder name '{0}' would be used by more than one batch")]
    DuplicateBatchName(String),
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\nStderr: {stderr}")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
