//! Tracing initialisation for tests.
//!
//! Tests that emit tracing events call [`init_test_tracing`] first so the
//! output lands in the harness's capture buffer instead of raw stderr.

use tracing_subscriber::EnvFilter;

/// Initialise a tracing subscriber that writes to the test-harness writer
/// and respects the `RUST_LOG` environment variable.
///
/// Idempotent: the first call per process wins and later calls are ignored,
/// so every test can call it unconditionally.
///
/// # Example
///
/// ```ignore
/// #[test]
/// fn my_test() {
///     keel_test_utils::tracing_setup::init_test_tracing();
///     tracing::info!("visible when RUST_LOG=info");
/// }
/// ```
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
