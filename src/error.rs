use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {field} threshold {value}: expected -1 or a non-negative number of seconds")]
    InvalidThreshold { field: &'static str, value: i32 },

    #[error("warning time {warning} sec. exceeds critical time {critical} sec.")]
    ThresholdOrder { warning: u32, critical: u32 },

    #[error("primary key already assigned ({current})")]
    PrimaryKeyAssigned { current: i32 },

    #[error("a result named \"{0}\" was already recorded in this run")]
    DuplicateName(String),

    #[error("cannot record a result without a name")]
    Unnamed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A failure raised while a check drives the UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("{message}")]
    Action { message: String },

    /// A failure for which the automation layer captured a screenshot.
    #[error("{message}")]
    Screenshot { message: String, path: PathBuf },
}

impl CheckError {
    pub fn action(message: impl Into<String>) -> Self {
        CheckError::Action {
            message: message.into(),
        }
    }

    pub fn with_screenshot(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        CheckError::Screenshot {
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn screenshot(&self) -> Option<&std::path::Path> {
        match self {
            CheckError::Action { .. } => None,
            CheckError::Screenshot { path, .. } => Some(path),
        }
    }
}
