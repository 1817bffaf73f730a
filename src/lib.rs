// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod document;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod metrics;
pub mod monitor;
pub mod notify;
pub mod present;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::document::{Agency, ContentType, Document, QueryWindow};
pub use crate::error::{FilterError, SourceUnavailable};
pub use crate::filter::FilterCriteria;
pub use crate::ingest::{Aggregation, Aggregator};
pub use crate::monitor::{DocumentFeed, FeedStatus, Monitor};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "osha_monitor=info,warn";

/// Install the fmt subscriber with `RUST_LOG` or the default filter.
/// Safe to call when a subscriber is already installed (e.g. by the runtime).
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
