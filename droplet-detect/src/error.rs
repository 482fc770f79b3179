use crate::droplet_detection::Time;
use std::path::PathBuf;
use thiserror::Error;

pub(crate) type DetectionResult<T> = Result<T, DetectionError>;

#[derive(Debug, Clone, Copy, PartialEq, strum::Display)]
pub(crate) enum Stage {
    #[strum(to_string = "event extraction")]
    Extraction,
    #[strum(to_string = "peak location")]
    PeakLocation,
}

#[derive(Debug, Error)]
pub(crate) enum DetectionError {
    #[error("Malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },
    #[error("Trace contains no samples")]
    EmptyTrace,
    #[error("No samples selected between {left} ms and {right} ms")]
    EmptySelection { left: Time, right: Time },
    #[error(
        "Baseline unreachable: no run of {run_length} in-band samples found (longest run was {longest_run})"
    )]
    BaselineUnreachable {
        run_length: usize,
        longest_run: usize,
    },
    #[error("No events remain after {0}")]
    EmptyEventSet(Stage),
    #[error("Invalid gate window: left ({left} ms) must be less than right ({right} ms)")]
    InvalidGate { left: Time, right: Time },
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Refusing to overwrite {}", path.display())]
    OverwriteDeclined { path: PathBuf },
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
}
