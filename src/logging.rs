//! Tracing setup for the binary.
//!
//! `RUST_LOG` wins when set; otherwise the level comes from the `-v` count.
//! Logs go to stderr so stdout stays clean for diffs and summaries.

use tracing::{Level, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn subscriber(level: Level) -> impl Subscriber + Send + Sync + 'static {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_tracing(level: Level) {
    subscriber(level).try_init().ok();
}
