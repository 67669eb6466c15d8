//! Result records for UI and website monitoring checks.
//!
//! A [`TestRunRecord`] captures when a check started and stopped, the
//! failures it hit, and the monitoring state derived from its duration and
//! thresholds. Records render to a canonical text summary and can be sorted
//! and written out as JSON result files by [`ResultWriter`].

pub mod adapter;
pub mod error;
pub mod models;
pub mod presenter;
pub mod settings;
pub mod state;
pub mod step;


use std::sync::Arc;

pub use adapter::{ResultSnapshot, ResultWriter};
pub use error::{CheckError, Error, Result};
pub use models::{format_timestamp, sort_for_display, Failure, TestRunRecord};
pub use presenter::{CheckErrorPresenter, DisplayPresenter, ExceptionPresenter};
pub use settings::ThresholdSettings;
pub use state::{CheckState, State, StateClassifier, ThresholdClassifier};
pub use step::StepTimer;

/// A record using the default failure type and classification policy.
pub type CheckRecord = TestRunRecord<CheckError, CheckState>;

impl CheckRecord {
    pub fn check(name: impl Into<String>) -> Self {
        TestRunRecord::new(
            name,
            Arc::new(ThresholdClassifier),
            Arc::new(CheckErrorPresenter),
        )
    }
}

impl StepTimer<CheckError, CheckState> {
    pub fn for_check(start_millis: i64) -> Self {
        StepTimer::new(
            start_millis,
            Arc::new(ThresholdClassifier),
            Arc::new(CheckErrorPresenter),
        )
    }
}
