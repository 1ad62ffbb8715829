//! Completion reporting to the submitting side.

/// Notified once per job on successful completion. Fire and forget.
pub trait StatusReporter {
    fn report_finish(&self, file_id: &str);
}
