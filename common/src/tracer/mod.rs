mod tracer_engine;

pub use tracer_engine::{TracerEngine, TracerOptions};

/// Should be called once at the start of each binary.
/// The service name recorded by the engine is the name of the calling binary.
#[macro_export]
macro_rules! init_tracer {
    ($options:expr) => {{ $crate::tracer::TracerEngine::new($options, env!("CARGO_BIN_NAME")) }};
}
