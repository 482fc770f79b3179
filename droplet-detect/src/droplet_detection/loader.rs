use super::{Real, Time, Trace, Voltage};
use crate::error::{DetectionError, DetectionResult};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

pub(crate) fn load_trace_file(path: &Path) -> DetectionResult<Trace> {
    let file = File::open(path)?;
    read_trace(BufReader::new(file))
}

/// Reads whitespace separated `<time> <signal>` lines.
/// Blank lines and `#` comments are skipped, time must be strictly increasing.
pub(crate) fn read_trace<R: BufRead>(reader: R) -> DetectionResult<Trace> {
    let mut samples = Vec::<(Time, Voltage)>::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let malformed = |reason| DetectionError::MalformedInput {
            line: index + 1,
            reason,
        };
        let (time, signal) = parse_sample(content).map_err(malformed)?;
        if let Some(&(previous, _)) = samples.last() {
            if time <= previous {
                return Err(malformed(format!(
                    "time {time} does not follow previous time {previous}"
                )));
            }
        }
        samples.push((time, signal));
    }
    if samples.is_empty() {
        Err(DetectionError::EmptyTrace)
    } else {
        Ok(samples.into_iter().collect())
    }
}

fn parse_sample(content: &str) -> Result<(Time, Voltage), String> {
    let columns: Vec<_> = content.split_whitespace().collect();
    match columns.as_slice() {
        [time, signal] => Ok((parse_column(time)?, parse_column(signal)?)),
        _ => Err(format!("expected 2 columns, got {}", columns.len())),
    }
}

fn parse_column(column: &str) -> Result<Real, String> {
    match Real::from_str(column) {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(value) => Err(format!("'{column}' is not finite ({value})")),
        Err(e) => Err(format!("'{column}' is not a number: {e}")),
    }
}
