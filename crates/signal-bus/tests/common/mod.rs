#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use signal_bus::{BindingStyle, SignalBus, SignalError, SignalKind, SignalObserver};

/// A condition reported to the observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    DuplicateDeclare(String),
    NoSubscribers(String),
    StyleMismatch(String, BindingStyle, BindingStyle),
    DispatchFailure(String),
}

/// Observer that keeps every report for later assertions
#[derive(Debug, Default)]
pub struct RecordingObserver {
    reports: Mutex<Vec<Report>>,
}

impl RecordingObserver {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }

    pub fn count(&self, matcher: impl Fn(&Report) -> bool) -> usize {
        self.reports.lock().iter().filter(|report| matcher(report)).count()
    }
}

impl SignalObserver for RecordingObserver {
    fn on_duplicate_declare(&self, kind: &SignalKind) {
        self.reports.lock().push(Report::DuplicateDeclare(kind.to_string()));
    }

    fn on_no_subscribers(&self, kind: &SignalKind) {
        self.reports.lock().push(Report::NoSubscribers(kind.to_string()));
    }

    fn on_style_mismatch(&self, kind: &SignalKind, expected: BindingStyle, actual: BindingStyle) {
        self.reports
            .lock()
            .push(Report::StyleMismatch(kind.to_string(), expected, actual));
    }

    fn on_dispatch_failure(&self, error: &SignalError) {
        self.reports.lock().push(Report::DispatchFailure(error.to_string()));
    }
}

/// Bus wired to a fresh recording observer
pub fn recording_bus() -> (SignalBus, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let bus = SignalBus::builder().observer(observer.clone()).build();
    (bus, observer)
}

/// Shared call log
pub type CallLog<T> = Arc<Mutex<Vec<T>>>;

pub fn call_log<T>() -> CallLog<T> {
    Arc::new(Mutex::new(Vec::new()))
}
