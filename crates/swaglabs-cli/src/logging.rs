//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

/// Install the global subscriber. `RUST_LOG` wins over the `-v`/`-q` level.
/// Log lines go to stderr so `--json` reports on stdout stay parseable.
pub fn init(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A second init (tests, embedding) keeps the first subscriber
    let _ = if config.log_json {
        builder.json().try_init()
    } else {
        builder.with_ansi(config.color.should_color()).try_init()
    };
}
