use crate::config::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level; `verbose` bumps the level to debug or trace.
pub fn init_logging(
    config: &LoggingConfig,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = match verbose {
        0 => config.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("payroll={level},warn")))?;

    let registry = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        _ => registry
            .with(fmt::layer().with_target(verbose > 0).with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}
