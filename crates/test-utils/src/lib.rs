pub mod configs;
pub mod fixtures;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Upper bound on any single awaited step in a test.
const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Set up tracing once for the whole test binary.
///
/// Output goes through `with_test_writer()`, so the harness captures it
/// per test and only shows it for failures (or with `-- --nocapture`).
/// Set `RUST_LOG` to raise the level, e.g. `RUST_LOG=debug cargo test`;
/// the default is `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, panicking after [`STEP_TIMEOUT`] so a stuck watcher or child
/// process fails the test instead of hanging the suite.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(STEP_TIMEOUT, f)
        .await
        .expect("test step timed out")
}
