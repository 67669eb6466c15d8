use std::fmt;
use std::path::PathBuf;

use crate::error::CheckError;
use crate::models::Failure;

/// Turns a recorded failure chain into report text.
///
/// Implementations must not panic: anything that goes wrong while rendering
/// is reported as placeholder text, so that building a summary never fails.
pub trait ExceptionPresenter<E>: Send + Sync {
    /// Flattens the root failure and its suppressed chain into one string.
    fn render(&self, failure: &Failure<E>) -> String;

    /// The screenshot associated with the root failure, if any.
    fn screenshot_path(&self, _failure: &Failure<E>) -> Option<PathBuf> {
        None
    }
}

const SUPPRESSED_PREFIX: &str = "\n\t\t-- Suppressed Exception: ";

fn render_chain<E: fmt::Display>(failure: &Failure<E>) -> String {
    let mut out = clean_message(failure.root());
    for suppressed in failure.suppressed() {
        out.push_str(SUPPRESSED_PREFIX);
        out.push_str(&clean_message(suppressed));
    }
    out
}

// Messages from the automation layer can carry terminal colors.
fn clean_message(e: &impl fmt::Display) -> String {
    strip_ansi_escapes::strip_str(e.to_string())
}

/// Renders any [`Display`](fmt::Display) failure. Never reports a screenshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayPresenter;

impl<E: fmt::Display> ExceptionPresenter<E> for DisplayPresenter {
    fn render(&self, failure: &Failure<E>) -> String {
        render_chain(failure)
    }
}

/// Presenter for [`CheckError`] that also exposes screenshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckErrorPresenter;

impl ExceptionPresenter<CheckError> for CheckErrorPresenter {
    fn render(&self, failure: &Failure<CheckError>) -> String {
        render_chain(failure)
    }

    fn screenshot_path(&self, failure: &Failure<CheckError>) -> Option<PathBuf> {
        failure.root().screenshot().map(|path| path.to_path_buf())
    }
}
