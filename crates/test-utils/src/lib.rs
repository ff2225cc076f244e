//! Test support for `montage-workflow`: a fake Montage tool runner that
//! writes canned IPAC tables, and builders for configs and band fixtures.

pub mod builders;
pub mod fake_runner;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Route generator logs (tool invocations, band summaries) through the test
/// writer so they only show up for failing tests. `RUST_LOG` picks the level.
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
