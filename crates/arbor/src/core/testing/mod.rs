//! Helpers for testing widget trees.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::fmt;

/// Harness for driving a Root.
pub mod harness;
/// Recording widgets and drivers.
pub mod probe;

pub use harness::Harness;
pub use probe::{DriverCall, EventLog, Probe, RecordingDriver};

/// Guards subscriber installation.
static TRACING: Once = Once::new();

/// Install a `tracing` subscriber that writes through the test harness's
/// captured output. Safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let format = fmt::format()
            .with_level(true)
            .with_ansi(false)
            .without_time()
            .compact();
        if fmt()
            .with_test_writer()
            .with_max_level(Level::DEBUG)
            .event_format(format)
            .try_init()
            .is_err()
        {
            tracing::debug!("tracing subscriber already installed");
        }
    });
}
