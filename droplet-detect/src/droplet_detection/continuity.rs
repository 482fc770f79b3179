use super::{BaselineBand, Voltage};
use crate::error::{DetectionError, DetectionResult};

/// Inclusive sample range which both starts and ends with a run of baseline samples.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub(crate) struct ContinuousRange {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// Finds the first run of `run_length` consecutive in-band samples from the front
/// and from the back, so that the trimmed trace cannot begin or end mid-droplet.
#[tracing::instrument(skip_all, fields(run_length = run_length, start, end))]
pub(crate) fn find_continuous_range(
    signal: &[Voltage],
    band: &BaselineBand,
    run_length: usize,
) -> DetectionResult<ContinuousRange> {
    let unreachable = |longest_run| DetectionError::BaselineUnreachable {
        run_length,
        longest_run,
    };
    let start = first_run(signal.iter(), band, run_length).map_err(unreachable)?;
    let from_back = first_run(signal.iter().rev(), band, run_length).map_err(unreachable)?;
    let range = ContinuousRange {
        start,
        end: signal.len() - 1 - from_back,
    };

    let span = tracing::Span::current();
    span.record("start", range.start);
    span.record("end", range.end);
    Ok(range)
}

/// Returns the position of the first sample of the first qualifying run,
/// or the longest run seen if none qualified.
fn first_run<'a>(
    samples: impl Iterator<Item = &'a Voltage>,
    band: &BaselineBand,
    run_length: usize,
) -> Result<usize, usize> {
    let mut count = 0;
    let mut longest = 0;
    for (index, &value) in samples.enumerate() {
        if band.contains(value) {
            count += 1;
            longest = longest.max(count);
            if count == run_length {
                return Ok(index + 1 - run_length);
            }
        } else {
            count = 0;
        }
    }
    Err(longest)
}
