//! Observability init (SPEC_FULL.md §2.1): a `tracing` subscriber installed
//! once, idempotently, so both CLI binaries and library doctests can call
//! it freely. No log line is part of program semantics — removing logging
//! must never change `meta_digest`.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the global `tracing` subscriber. Safe to call more than once;
/// only the first call takes effect.
pub fn init() {
    init_with(false);
}

/// Like [`init`], but selects the JSON formatter when `json` is true
/// (mirrors `RuntimeConfig::logging.json`).
pub fn init_with(json: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
        if json {
            subscriber.json().init();
        } else {
            subscriber.init();
        }
    });
}
