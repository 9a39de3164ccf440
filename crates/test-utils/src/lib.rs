pub mod files;

use std::sync::{Arc, Once};

use tracing_subscriber::{EnvFilter, fmt};
use zedamigo_exec::clock::{Clock, FixedClock};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
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

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// A clock pinned to midnight (local time) of the given date.
pub fn fixed_clock(year: i32, month: u32, day: u32) -> Arc<dyn Clock> {
    use chrono::{Local, NaiveDate, TimeZone};

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date");
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .expect("representable local time");
    Arc::new(FixedClock(local))
}
