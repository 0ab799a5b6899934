//! Shared test support for the s3mirror crates.
//!
//! Mock HTTP servers for the external function, info endpoint and audit
//! sink, recording doubles for the capability traits, and audit entry
//! fixtures.

pub mod fixtures;
pub mod mocks;

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

/// Initialize test logging once per process.
pub fn init() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,s3mirror=debug"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .try_init()
            .ok();
    });

    Lazy::force(&INIT);
}
