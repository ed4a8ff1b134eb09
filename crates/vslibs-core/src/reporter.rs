//! Reporter trait for dependency injection
//!
//! This trait allows core logic to report progress and status without
//! being coupled to a specific terminal implementation.

/// Receives progress and status updates from the install flow.
pub trait Reporter: Send + Sync {
    /// Indicates a new phase has started (e.g. "Downloading", "Creating library").
    fn section(&self, title: &str);

    /// Updates the progress of a download.
    fn downloading(&self, name: &str, current: u64, total: Option<u64>);

    /// Updates the progress of an extraction.
    fn extracting(&self, name: &str, current: u64, total: Option<u64>);

    /// Marks an artifact as successfully produced or fetched.
    fn done(&self, name: &str, detail: &str, size: Option<u64>);

    /// Marks an artifact operation as failed with a specific reason.
    fn failed(&self, name: &str, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn downloading(&self, name: &str, current: u64, total: Option<u64>) {
        (**self).downloading(name, current, total);
    }
    fn extracting(&self, name: &str, current: u64, total: Option<u64>) {
        (**self).extracting(name, current, total);
    }
    fn done(&self, name: &str, detail: &str, size: Option<u64>) {
        (**self).done(name, detail, size);
    }
    fn failed(&self, name: &str, reason: &str) {
        (**self).failed(name, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: &str, _: u64, _: Option<u64>) {}
    fn extracting(&self, _: &str, _: u64, _: Option<u64>) {}
    fn done(&self, _: &str, _: &str, _: Option<u64>) {}
    fn failed(&self, _: &str, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
}
