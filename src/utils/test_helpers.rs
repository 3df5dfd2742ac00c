use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Routes the scanner, ignore-rule and session logs of unit tests to the test
/// writer, so `RUST_LOG=file_exporter=debug cargo test` shows pruning decisions
/// and skipped directories next to the failing test.
///
/// The global subscriber is installed once per test binary. Log assertions live
/// in `tests/logging.rs`, which owns its own subscriber.
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Returns true when the tests run as root (UID 0).
///
/// The scanner's unreadable-subdirectory test clears a folder's permissions
/// and expects it to be counted in `ScanStats::directories_unreadable`; root
/// still reads such a folder, so that test returns early here.
#[cfg(test)]
#[inline]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no side effects and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
