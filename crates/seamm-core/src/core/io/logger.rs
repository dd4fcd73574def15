use tracing::{debug, info, trace, warn};

/// Diagnostics sink for a reader session.
///
/// The reader never reaches for a global logger; it reports through whatever
/// implementation it was built with. [`TracingLogger`] is the default.
pub trait ReaderLogger {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);

    /// Per-line chatter. Ignored unless an implementation opts in.
    fn trace(&self, _message: &str) {}
}

/// Forwards messages to the `tracing` macros under the `seamm_util::include` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ReaderLogger for TracingLogger {
    fn debug(&self, message: &str) {
        debug!(target: "seamm_util::include", "{}", message);
    }

    fn info(&self, message: &str) {
        info!(target: "seamm_util::include", "{}", message);
    }

    fn warn(&self, message: &str) {
        warn!(target: "seamm_util::include", "{}", message);
    }

    fn trace(&self, message: &str) {
        trace!(target: "seamm_util::include", "{}", message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl ReaderLogger for NullLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}
