pub mod tracer;

pub use tracer::{TracerEngine, TracerOptions};

/// The scalar used for every sample and every quantity derived from one.
pub type Real = f64;

/// Sample time, in milliseconds.
pub type Time = Real;

/// Detector signal, in volts.
pub type Voltage = Real;

/// Position of a sample within a trace.
pub type SampleIndex = usize;
