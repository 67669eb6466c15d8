use serde::{Deserialize, Serialize};
use std::fmt;

/// A monitoring status that can be reported with a numeric code.
pub trait State: fmt::Display {
    /// The status code printed verbatim in the result string.
    fn error_code(&self) -> i32;
}

/// Derives a state from the measured duration, the configured thresholds and
/// whether a failure was recorded.
///
/// Implementations must be total and deterministic. `duration` is `None` when
/// either timestamp of the run is missing; a `None` threshold is not configured.
pub trait StateClassifier<S>: Send + Sync {
    fn status_for(
        &self,
        duration: Option<f32>,
        warning: Option<u32>,
        critical: Option<u32>,
        has_exception: bool,
    ) -> S;
}

/// Represents the default status of a check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Ok,
    Warning,
    Critical,
    Errors,
}

impl State for CheckState {
    fn error_code(&self) -> i32 {
        match self {
            CheckState::Ok => 0,
            CheckState::Warning => 1,
            CheckState::Critical => 2,
            CheckState::Errors => 4,
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckState::Ok => "OK",
            CheckState::Warning => "WARNING",
            CheckState::Critical => "CRITICAL",
            CheckState::Errors => "ERRORS",
        };
        f.write_str(name)
    }
}

/// Classifies a run by comparing its duration against the thresholds.
///
/// Any recorded failure yields [`CheckState::Errors`]. Otherwise the critical
/// threshold is checked before the warning threshold; a duration equal to a
/// threshold does not exceed it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdClassifier;

impl StateClassifier<CheckState> for ThresholdClassifier {
    fn status_for(
        &self,
        duration: Option<f32>,
        warning: Option<u32>,
        critical: Option<u32>,
        has_exception: bool,
    ) -> CheckState {
        if has_exception {
            return CheckState::Errors;
        }
        let Some(duration) = duration else {
            return CheckState::Ok;
        };
        let exceeds = |threshold: Option<u32>| threshold.is_some_and(|t| duration > t as f32);

        if exceeds(critical) {
            CheckState::Critical
        } else if exceeds(warning) {
            CheckState::Warning
        } else {
            CheckState::Ok
        }
    }
}
