use parking_lot::Mutex;

use crate::logic::consistency::{Severity, Violation};

/// Receives data violations found while reconciling rows.
///
/// Reporting never fails and never influences the decision made for a row.
pub trait DiagnosticSink {
    fn report(&self, violation: &Violation);
}

/// Default sink writing through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, violation: &Violation) {
        let key = violation.row_key.as_deref().unwrap_or("<unknown>");
        match violation.severity {
            Severity::Error => log::warn!(
                "row {}: {:?}: {}",
                key,
                violation.violation_type,
                violation.message
            ),
            Severity::Info => log::info!(
                "row {}: {:?}: {}",
                key,
                violation.violation_type,
                violation.message
            ),
        }
    }
}

/// Sink that keeps every violation in memory, for tests and batch inspection
#[derive(Debug, Default)]
pub struct MemorySink {
    violations: Mutex<Vec<Violation>>,
}

impl MemorySink {
    pub fn len(&self) -> usize {
        self.violations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.lock().is_empty()
    }

    /// Drain collected violations
    pub fn take(&self) -> Vec<Violation> {
        std::mem::take(&mut *self.violations.lock())
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, violation: &Violation) {
        self.violations.lock().push(violation.clone());
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn report(&self, violation: &Violation) {
        (**self).report(violation)
    }
}
