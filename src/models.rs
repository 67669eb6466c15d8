use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::presenter::ExceptionPresenter;
use crate::state::{State, StateClassifier};

/// Layout of the start and end time lines in the result string.
pub const PRINT_DATE_FORMAT: &str = "%d-%m-%Y %I:%M:%S";

/// Sentinel printed for anything that was never set.
pub const UNSET: &str = "-1";

/// The first failure of a run together with every failure recorded after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure<E> {
    root: E,
    suppressed: Vec<E>,
}

impl<E> Failure<E> {
    pub fn new(root: E) -> Self {
        Failure {
            root,
            suppressed: Vec::new(),
        }
    }

    pub fn root(&self) -> &E {
        &self.root
    }

    /// Secondary failures, in the order they occurred.
    pub fn suppressed(&self) -> &[E] {
        &self.suppressed
    }

    /// Number of failures in the chain, root included.
    pub fn count(&self) -> usize {
        1 + self.suppressed.len()
    }

    /// Iterates the root first, then the suppressed chain.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        std::iter::once(&self.root).chain(self.suppressed.iter())
    }

    fn suppress(&mut self, e: E) {
        self.suppressed.push(e);
    }
}

/// Current wall clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Formats epoch milliseconds as `<seconds>.<millis>`, e.g. `1500000000.123`.
///
/// A missing timestamp is formatted as `-1`.
pub fn format_timestamp(millis: Option<i64>) -> String {
    let Some(millis) = millis else {
        return UNSET.to_string();
    };
    let sign = if millis < 0 { "-" } else { "" };
    let digits = format!("{:04}", millis.unsigned_abs());
    let (secs, frac) = digits.split_at(digits.len() - 3);
    format!("{sign}{secs}.{frac}")
}

/// Formats epoch milliseconds for humans, in UTC.
pub fn format_print_time(millis: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(millis) {
        Some(time) => time.format(PRINT_DATE_FORMAT).to_string(),
        None => format_timestamp(Some(millis)),
    }
}

// Seconds always carry a decimal point: 2.5, 2.0, -1.0.
fn format_seconds(seconds: f32) -> String {
    let text = seconds.to_string();
    if text.contains('.') || !seconds.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// The outcome of one monitored check.
///
/// A record is filled in by the thread executing the check (timestamps,
/// failures, state) and read by the reporting side afterwards. It has no
/// internal synchronization: mutating it from several threads requires a lock
/// owned by the caller.
pub struct TestRunRecord<E, S> {
    name: Option<String>,
    start: Option<i64>,
    stop: Option<i64>,
    primary_key: Option<i32>,
    warning_time: Option<u32>,
    critical_time: Option<u32>,
    exception: Option<Failure<E>>,
    state: Option<S>,
    classifier: Arc<dyn StateClassifier<S>>,
    presenter: Arc<dyn ExceptionPresenter<E>>,
}

impl<E: Clone, S: Clone> Clone for TestRunRecord<E, S> {
    fn clone(&self) -> Self {
        TestRunRecord {
            name: self.name.clone(),
            start: self.start,
            stop: self.stop,
            primary_key: self.primary_key,
            warning_time: self.warning_time,
            critical_time: self.critical_time,
            exception: self.exception.clone(),
            state: self.state.clone(),
            classifier: Arc::clone(&self.classifier),
            presenter: Arc::clone(&self.presenter),
        }
    }
}

impl<E: fmt::Debug, S: fmt::Debug> fmt::Debug for TestRunRecord<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRunRecord")
            .field("name", &self.name)
            .field("start", &self.start)
            .field("stop", &self.stop)
            .field("primary_key", &self.primary_key)
            .field("warning_time", &self.warning_time)
            .field("critical_time", &self.critical_time)
            .field("exception", &self.exception)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<E, S: State> TestRunRecord<E, S> {
    /// Creates a named record with no timestamps, thresholds or failures.
    pub fn new(
        name: impl Into<String>,
        classifier: Arc<dyn StateClassifier<S>>,
        presenter: Arc<dyn ExceptionPresenter<E>>,
    ) -> Self {
        let mut record = Self::unnamed(classifier, presenter);
        record.name = Some(name.into());
        record
    }

    pub fn unnamed(
        classifier: Arc<dyn StateClassifier<S>>,
        presenter: Arc<dyn ExceptionPresenter<E>>,
    ) -> Self {
        TestRunRecord {
            name: None,
            start: None,
            stop: None,
            primary_key: None,
            warning_time: None,
            critical_time: None,
            exception: None,
            state: None,
            classifier,
            presenter,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    // Timing

    /// Start time in epoch milliseconds.
    pub fn start(&self) -> Option<i64> {
        self.start
    }

    pub fn set_start(&mut self, millis: Option<i64>) {
        self.start = millis;
    }

    /// Stop time in epoch milliseconds.
    pub fn stop(&self) -> Option<i64> {
        self.stop
    }

    /// Sets the stop time. It is not checked against the start time.
    pub fn set_stop(&mut self, millis: Option<i64>) {
        self.stop = millis;
    }

    /// Sets the start time to the current time.
    pub fn start_now(&mut self) {
        self.start = Some(now_millis());
    }

    /// Sets the stop time to the current time.
    pub fn stop_now(&mut self) {
        self.stop = Some(now_millis());
    }

    pub fn start_timestamp(&self) -> String {
        format_timestamp(self.start)
    }

    pub fn stop_timestamp(&self) -> String {
        format_timestamp(self.stop)
    }

    /// Elapsed seconds between start and stop, if both are known.
    ///
    /// The millisecond difference wraps on overflow instead of panicking.
    pub fn elapsed(&self) -> Option<f32> {
        let (start, stop) = (self.start?, self.stop?);
        Some((stop.wrapping_sub(start) as f64 / 1000.0) as f32)
    }

    /// Elapsed seconds between start and stop, or `-1.0` when either is missing.
    pub fn duration(&self) -> f32 {
        self.elapsed().unwrap_or(-1.0)
    }

    // Identity and thresholds

    pub fn primary_key(&self) -> Option<i32> {
        self.primary_key
    }

    /// Stores the identifier handed out by the persistence layer. A key can be
    /// assigned only once.
    pub fn assign_primary_key(&mut self, key: i32) -> Result<()> {
        if let Some(current) = self.primary_key {
            return Err(Error::PrimaryKeyAssigned { current });
        }
        self.primary_key = Some(key);
        Ok(())
    }

    pub fn warning_time(&self) -> Option<u32> {
        self.warning_time
    }

    pub fn set_warning_time(&mut self, seconds: Option<u32>) {
        self.warning_time = seconds;
    }

    pub fn critical_time(&self) -> Option<u32> {
        self.critical_time
    }

    pub fn set_critical_time(&mut self, seconds: Option<u32>) {
        self.critical_time = seconds;
    }

    // Failures

    /// Records a failure. The first one becomes the root; every later one is
    /// appended to the root's suppressed chain.
    pub fn add_exception(&mut self, e: E) {
        match &mut self.exception {
            None => self.exception = Some(Failure::new(e)),
            Some(failure) => failure.suppress(e),
        }
        tracing::debug!(
            name = ?self.name,
            failures = self.exception.as_ref().map_or(0, Failure::count),
            "recorded failure"
        );
    }

    pub fn exception(&self) -> Option<&Failure<E>> {
        self.exception.as_ref()
    }

    /// All failure messages of this run, or an empty string if there are none.
    pub fn exception_messages(&self) -> String {
        self.exception
            .as_ref()
            .map(|failure| self.presenter.render(failure))
            .unwrap_or_default()
    }

    pub fn screenshot_path(&self) -> Option<PathBuf> {
        self.exception
            .as_ref()
            .and_then(|failure| self.presenter.screenshot_path(failure))
    }

    // State

    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn set_state(&mut self, state: S) {
        self.state = Some(state);
    }

    /// Recomputes the state from the duration, the thresholds and the
    /// presence of a failure.
    pub fn refresh_state(&mut self) -> &S {
        let state = self.classifier.status_for(
            self.elapsed(),
            self.warning_time,
            self.critical_time,
            self.exception.is_some(),
        );
        tracing::debug!(name = ?self.name, state = %state, "refreshed state");
        self.state.insert(state)
    }

    // Reporting

    /// Multi-line summary of the run. Thresholds and timestamps that were
    /// never set are left out.
    pub fn result_string(&self) -> String {
        let mut out = format!(
            "\nname: {}\nRESULT STATE: {}",
            self.name.as_deref().unwrap_or("null"),
            self.state
                .as_ref()
                .map_or_else(|| "null".to_string(), ToString::to_string),
        );
        if let Some(state) = &self.state {
            out.push_str(&format!("\nresult code: {}", state.error_code()));
        }
        if self.exception.is_some() {
            out.push_str(&format!("\nERRORS:{}", self.exception_messages()));
            if let Some(path) = self.screenshot_path() {
                let path = std::path::absolute(&path).unwrap_or(path);
                out.push_str(&format!("\nERROR - SCREENSHOT: {}", path.display()));
            }
        }
        out.push_str(&format!(
            "\ndb primary key: {}\nduration: {} sec.",
            self.primary_key.unwrap_or_default(),
            format_seconds(self.duration()),
        ));
        if let Some(warning) = self.warning_time {
            out.push_str(&format!("\nwarning time: {warning} sec."));
        }
        if let Some(critical) = self.critical_time {
            out.push_str(&format!("\ncritical time: {critical} sec."));
        }
        if let Some(start) = self.start {
            out.push_str(&format!("\nstart time: {}", format_print_time(start)));
        }
        if let Some(stop) = self.stop {
            out.push_str(&format!("\nend time: {}", format_print_time(stop)));
        }
        out
    }

    /// Display ordering of records.
    ///
    /// Records with a start time sort chronologically. Without a start time
    /// the name is compared against the other record's full result string,
    /// which makes the ordering asymmetric. A missing record sorts first.
    ///
    /// Names are compared by UTF-8 bytes, which differs from UTF-16 code unit
    /// order only for characters above U+FFFF.
    pub fn compare_to(&self, other: Option<&Self>) -> Ordering {
        let Some(other) = other else {
            return Ordering::Greater;
        };
        match (self.start, &self.name) {
            (None, None) => match other.name {
                Some(_) => Ordering::Greater,
                None => Ordering::Equal,
            },
            (None, Some(name)) => name.as_str().cmp(other.result_string().as_str()),
            (Some(start), _) => Some(start).cmp(&other.start),
        }
    }
}

/// Sorts records for display using [`TestRunRecord::compare_to`].
///
/// The ordering is not guaranteed to be total, so this is a stable insertion
/// sort rather than `slice::sort_by`, which may panic on inconsistent orders.
pub fn sort_for_display<E, S: State>(records: &mut [TestRunRecord<E, S>]) {
    for i in 1..records.len() {
        let mut j = i;
        while j > 0 && records[j - 1].compare_to(Some(&records[j])) == Ordering::Greater {
            records.swap(j - 1, j);
            j -= 1;
        }
    }
}
