use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("GitHub rejected the access token (HTTP {status})")]
    Authentication { status: u16 },

    #[error("GitHub request failed: {context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: octocrab::Error,
    },

    #[error("GitHub returned HTTP {status} for {context}")]
    UpstreamStatus { context: String, status: u16 },

    #[error("Only {collected} of {total} {context} could be fetched")]
    Incomplete {
        context: String,
        collected: u64,
        total: u64,
    },

    #[error("No external pull requests matched the query")]
    EmptyResult,

    #[error("CSV serialization failed: {0}")]
    Serialize(#[from] csv::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ExportError {
    pub(crate) fn upstream(context: impl Into<String>, source: octocrab::Error) -> Self {
        Self::Upstream {
            context: context.into(),
            source,
        }
    }

    /// True for failures that happened while talking to GitHub, as opposed
    /// to local serialization or file output.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::Upstream { .. }
                | Self::UpstreamStatus { .. }
                | Self::Incomplete { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
