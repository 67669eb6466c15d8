use std::sync::Arc;

use crate::models::{now_millis, TestRunRecord};
use crate::presenter::ExceptionPresenter;
use crate::state::{State, StateClassifier};

/// Splits a check into named steps, each timed from the end of the previous one.
///
/// Every finished step becomes its own [`TestRunRecord`] carrying only a
/// warning threshold.
pub struct StepTimer<E, S> {
    step_start: i64,
    steps: Vec<TestRunRecord<E, S>>,
    classifier: Arc<dyn StateClassifier<S>>,
    presenter: Arc<dyn ExceptionPresenter<E>>,
}

impl<E, S: State> StepTimer<E, S> {
    /// Starts timing the first step at `start_millis`, usually the start of the check.
    pub fn new(
        start_millis: i64,
        classifier: Arc<dyn StateClassifier<S>>,
        presenter: Arc<dyn ExceptionPresenter<E>>,
    ) -> Self {
        StepTimer {
            step_start: start_millis,
            steps: Vec::new(),
            classifier,
            presenter,
        }
    }

    /// Closes the current step at `now_millis` and starts the next one there.
    pub fn end_of_step(
        &mut self,
        name: impl Into<String>,
        warning: Option<u32>,
        now_millis: i64,
    ) -> &TestRunRecord<E, S> {
        let mut step = TestRunRecord::new(
            name,
            Arc::clone(&self.classifier),
            Arc::clone(&self.presenter),
        );
        step.set_start(Some(self.step_start));
        step.set_stop(Some(now_millis));
        step.set_warning_time(warning);
        step.refresh_state();

        tracing::debug!(
            step = step.name().unwrap_or_default(),
            duration = step.duration(),
            "finished step"
        );

        self.step_start = now_millis;
        self.steps.push(step);
        &self.steps[self.steps.len() - 1]
    }

    pub fn end_of_step_now(
        &mut self,
        name: impl Into<String>,
        warning: Option<u32>,
    ) -> &TestRunRecord<E, S> {
        self.end_of_step(name, warning, now_millis())
    }

    /// Start of the step currently being timed.
    pub fn step_start(&self) -> i64 {
        self.step_start
    }

    pub fn steps(&self) -> &[TestRunRecord<E, S>] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<TestRunRecord<E, S>> {
        self.steps
    }
}
