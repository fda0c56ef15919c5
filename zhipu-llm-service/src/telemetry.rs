//! Tracing helpers for host binaries embedding this library.
//!
//! The library itself only emits `tracing` events; subscriber setup belongs
//! to the binary. This module offers a preconfigured, library-scoped
//! formatting layer so hosts can surface GLM-service logs without touching
//! their global subscriber configuration.

use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Crate target prefix used to filter only library-originated logs.
pub const TARGET_PREFIX: &str = "zhipu_llm_service";

/// RFC3339 UTC timer via `chrono`, without fractional seconds.
/// Example output: `2026-08-30T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        w.write_str(&now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

/// Builds a formatting layer that renders only events emitted by this crate.
///
/// Compact single-line output with RFC3339 UTC timestamps, level, and target;
/// ANSI colors only when stdout is a terminal. A per-event filter keeps logs
/// from other crates untouched, so the layer composes with whatever global
/// subscriber the host already runs.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let only_this_crate = filter::filter_fn(|meta| meta.target().starts_with(TARGET_PREFIX));

    fmt::layer()
        .compact()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_ansi(io::stdout().is_terminal())
        .with_filter(only_this_crate)
}

/// Builds an `EnvFilter` from `RUST_LOG` (or `default` when unset) and raises
/// this library to `level`.
///
/// Example: `env_filter_with_level("info", Level::DEBUG)` keeps the world at
/// INFO while showing DEBUG for the GLM service only.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let directive = format!("{TARGET_PREFIX}={}", level.as_str().to_lowercase())
        .parse()
        .expect("valid level directive");
    base.add_directive(directive)
}
