//! Process-wide tracing setup shared by binaries, tests and benches.

/// Initialize structured logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filters, JSON formatting).
pub mod tracing;
