//! Process-wide logging setup shared by the API binary and tests.

pub mod tracing;

/// Initialize observability for the current process.
///
/// Idempotent; later calls are no-ops.
pub fn init() {
    tracing::init();
}
