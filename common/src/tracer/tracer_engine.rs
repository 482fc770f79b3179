use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

pub struct TracerOptions {
    /// The level applied when `RUST_LOG` is not set.
    pub default_level: LevelFilter,
}

impl TracerOptions {
    pub fn new(verbose: bool) -> Self {
        Self {
            default_level: if verbose {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            },
        }
    }
}

/// This object initialises the stderr tracer, given a TracerOptions struct.
/// Diagnostics are written to stderr so that reports sent to stdout stay clean.
pub struct TracerEngine;

impl TracerEngine {
    /// Initialises the stderr tracer for the crate
    /// #Arguments
    /// * `options` - The caller-specified instance of TracerOptions.
    /// * `service_name` - The name of the binary installing the tracer.
    /// #Returns
    /// An instance of TracerEngine
    pub fn new(options: TracerOptions, service_name: &str) -> Self {
        let stderr_tracer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);

        let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
        let log_filter = log_filter(options.default_level, &directives);

        let subscriber =
            tracing_subscriber::Registry::default().with(stderr_tracer.with_filter(log_filter));

        //  This is only called once, so will never panic
        tracing::subscriber::set_global_default(subscriber)
            .expect("tracing::subscriber::set_global_default should only be called once");

        tracing::debug!(
            service_name,
            default_level = %options.default_level,
            "Tracer initialised"
        );

        Self
    }
}

/// `directives`, in `RUST_LOG` syntax, take precedence over the verbosity flag.
fn log_filter(default_level: LevelFilter, directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(directives)
}
