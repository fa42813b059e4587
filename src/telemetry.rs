//! Tracing initialisation for binaries and test harnesses embedding the
//! engine.
//!
//! The library itself only emits events (`warn!` at skip/degrade points,
//! `debug!` on drops and retries); installing a subscriber is the
//! embedder's choice. Call [`init_tracing`] once at program start.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// Respects the `RUST_LOG` environment variable for fine-grained
/// filtering; falls back to the supplied `level` when it is not set.
///
/// Safe to call more than once: the global subscriber can only be set
/// once per process, and subsequent calls are silently ignored.
pub fn init_tracing(level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .ok();
}
