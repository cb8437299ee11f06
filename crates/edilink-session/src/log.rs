//! Diagnostic sink injected into sessions.
//!
//! Sessions never touch global logger state. They write human-readable
//! lines to whatever [`SessionLog`] they were built with; [`NoopLog`]
//! discards everything and [`TracingLog`] forwards to `tracing`, where the
//! process-wide subscriber decides the sink for each level.

use std::fmt::Arguments;
use std::sync::Arc;

/// Four-level line sink used by the session layer.
pub trait SessionLog: Send + Sync {
    fn trace(&self, line: Arguments<'_>);
    fn info(&self, line: Arguments<'_>);
    fn warn(&self, line: Arguments<'_>);
    fn error(&self, line: Arguments<'_>);
}

/// Shared handle to a log sink.
pub type LogHandle = Arc<dyn SessionLog>;

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLog;

impl NoopLog {
    pub fn handle() -> LogHandle {
        Arc::new(NoopLog)
    }
}

impl SessionLog for NoopLog {
    fn trace(&self, _line: Arguments<'_>) {}
    fn info(&self, _line: Arguments<'_>) {}
    fn warn(&self, _line: Arguments<'_>) {}
    fn error(&self, _line: Arguments<'_>) {}
}

/// Forwards lines to `tracing` events under the `edilink` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl TracingLog {
    pub fn handle() -> LogHandle {
        Arc::new(TracingLog)
    }
}

impl SessionLog for TracingLog {
    fn trace(&self, line: Arguments<'_>) {
        tracing::trace!(target: "edilink", "{line}");
    }

    fn info(&self, line: Arguments<'_>) {
        tracing::info!(target: "edilink", "{line}");
    }

    fn warn(&self, line: Arguments<'_>) {
        tracing::warn!(target: "edilink", "{line}");
    }

    fn error(&self, line: Arguments<'_>) {
        tracing::error!(target: "edilink", "{line}");
    }
}
