use riskcalc_core::{AnalysisError, HttpError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("failed to initialise http transport: {0}")]
    Transport(#[from] HttpError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("failed to format output")]
    Format(#[from] std::fmt::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Analysis(error) => analysis_exit_code(error),
            Self::Transport(_) => 6,
            Self::Serialization(_) | Self::Format(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

pub const fn analysis_exit_code(error: &AnalysisError) -> u8 {
    match error {
        AnalysisError::Validation(_) => 2,
        AnalysisError::Risk(_) => 3,
        AnalysisError::Source { .. } => 6,
    }
}
