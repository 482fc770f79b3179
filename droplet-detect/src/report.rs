use crate::{
    droplet_detection::{PeakStrategy, Real, SaveToFileFilter, Time, Trace, Voltage},
    error::{DetectionError, DetectionResult},
    processing::{Detection, Extraction},
};
use std::{
    fmt::Display,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

/// Rewritten traces are inverted about this level, the polarity downstream tools expect.
pub(crate) const INVERSION_LEVEL: Voltage = 10.0;

const OVERWRITE_PROMPT: &str =
    "Specify output (-o) or trace will be overwritten. Continue? (y/n): ";

/// The droplet summary written at the end of a detection run.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DetectionReport {
    /// In seconds.
    total_duration: Time,
    num_extracted: usize,
    frequency: Real,
    strategy: String,
    level: Voltage,
    /// Residence time and peak value of each retained event.
    peaks: Vec<(Time, Voltage)>,
}

impl DetectionReport {
    pub(crate) fn new(
        extraction: &Extraction,
        strategy: &PeakStrategy,
        detection: &Detection,
    ) -> Self {
        let peaks = detection
            .outcome
            .retained
            .iter()
            .filter_map(|record| {
                let event = extraction.events.get(record.event_id)?;
                Some((event.duration(), record.value))
            })
            .collect();
        Self {
            total_duration: extraction.trace.last_time().unwrap_or_default() / 1000.0,
            num_extracted: extraction.events.len(),
            frequency: extraction.frequency,
            strategy: strategy.to_string(),
            level: extraction.band.level,
            peaks,
        }
    }
}

impl Display for DetectionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Dataset of {:.1}s, {} events at {} Hz",
            self.total_duration,
            self.num_extracted,
            self.frequency.trunc()
        )?;
        writeln!(
            f,
            "Final number of events extracted via {}: {}",
            self.strategy,
            self.peaks.len()
        )?;
        writeln!(f, "Baseline voltage at:")?;
        writeln!(f, "{:?}", self.level)?;
        writeln!(f)?;
        writeln!(f, "Peaks:")?;
        for (residence, value) in &self.peaks {
            writeln!(f, "{residence:?}\t{value:?}")?;
        }
        Ok(())
    }
}

/// Writes `trace` in the input layout, with the signal inverted about [INVERSION_LEVEL].
/// Returns the number of samples written.
pub(crate) fn write_rewrite<W: Write>(trace: &Trace, writer: &mut W) -> io::Result<usize> {
    trace
        .iter()
        .map(|(time, signal)| (time, INVERSION_LEVEL - signal))
        .save_to_writer(writer)
}

/// Chooses the file a rewritten trace goes to. Without an explicit output the input
/// is replaced, which must be confirmed either by `overwrite` or by answering `y` to a prompt.
pub(crate) fn rewrite_target<R: BufRead, W: Write>(
    input: &Path,
    output: Option<&Path>,
    overwrite: bool,
    reader: &mut R,
    prompt: &mut W,
) -> DetectionResult<PathBuf> {
    if let Some(output) = output {
        return Ok(output.to_owned());
    }
    if !overwrite {
        write!(prompt, "{OVERWRITE_PROMPT}")?;
        prompt.flush()?;
        let mut answer = String::new();
        reader.read_line(&mut answer)?;
        if answer.trim() != "y" {
            return Err(DetectionError::OverwriteDeclined {
                path: input.to_owned(),
            });
        }
    }
    Ok(input.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::droplet_detection::{
        BaselineBand, Event, GateOutcome, PeakRecord, peak_locators::LocatorStatistics,
    };
    use std::io::Cursor;

    fn extraction() -> Extraction {
        Extraction {
            trace: (0..=10).map(|i| (i as Time * 150.0, 5.0)).collect(),
            band: BaselineBand::new(5.0, 0.3),
            events: vec![
                Event {
                    start: 1,
                    end: 2,
                    start_time: 150.0,
                    end_time: 150.5,
                },
                Event {
                    start: 4,
                    end: 5,
                    start_time: 600.0,
                    end_time: 602.0,
                },
                Event {
                    start: 7,
                    end: 8,
                    start_time: 1050.0,
                    end_time: 1050.75,
                },
            ],
            frequency: 22.7,
        }
    }

    fn detection() -> Detection {
        let record = |event_id, value| PeakRecord {
            event_id,
            time: 0.0,
            value,
        };
        Detection {
            statistics: LocatorStatistics::default(),
            outcome: GateOutcome {
                window: None,
                retained: vec![record(0, 2.5), record(2, 3.0)],
                removed: vec![record(1, 1.0)],
            },
        }
    }

    #[test]
    fn report_layout() {
        let report = DetectionReport::new(&extraction(), &PeakStrategy::Absolute, &detection());
        assert_eq!(
            report.to_string(),
            "Dataset of 1.5s, 3 events at 22 Hz\n\
             Final number of events extracted via absolute: 2\n\
             Baseline voltage at:\n\
             5.0\n\
             \n\
             Peaks:\n\
             0.5\t2.5\n\
             0.75\t3.0\n"
        );
    }

    #[test]
    fn strategy_name_in_report() {
        let report = DetectionReport::new(
            &extraction(),
            &PeakStrategy::Midpeak { edge: 5.0 },
            &detection(),
        );
        assert!(
            report
                .to_string()
                .contains("Final number of events extracted via midpeak: 2")
        );
    }

    #[test]
    fn rewrite_is_inverted() {
        let trace: Trace = [(0.5, 4.5), (0.75, 7.0)].into_iter().collect();
        let mut buffer = Vec::<u8>::new();
        assert_eq!(write_rewrite(&trace, &mut buffer).unwrap(), 2);
        assert_eq!(String::from_utf8(buffer).unwrap(), "0.5\t5.5\n0.75\t3\n");
    }

    #[test]
    fn explicit_output() {
        let mut prompt = Vec::<u8>::new();
        let target = rewrite_target(
            Path::new("trace.txt"),
            Some(Path::new("reduced.txt")),
            false,
            &mut Cursor::new(""),
            &mut prompt,
        )
        .unwrap();
        assert_eq!(target, PathBuf::from("reduced.txt"));
        assert!(prompt.is_empty());
    }

    #[test]
    fn overwrite_flag_skips_prompt() {
        let mut prompt = Vec::<u8>::new();
        let target = rewrite_target(
            Path::new("trace.txt"),
            None,
            true,
            &mut Cursor::new(""),
            &mut prompt,
        )
        .unwrap();
        assert_eq!(target, PathBuf::from("trace.txt"));
        assert!(prompt.is_empty());
    }

    #[test]
    fn overwrite_confirmed() {
        let mut prompt = Vec::<u8>::new();
        let target = rewrite_target(
            Path::new("trace.txt"),
            None,
            false,
            &mut Cursor::new("y\n"),
            &mut prompt,
        )
        .unwrap();
        assert_eq!(target, PathBuf::from("trace.txt"));
        assert_eq!(String::from_utf8(prompt).unwrap(), OVERWRITE_PROMPT);
    }

    #[test]
    fn overwrite_declined() {
        for answer in ["n\n", "yes\n", ""] {
            let result = rewrite_target(
                Path::new("trace.txt"),
                None,
                false,
                &mut Cursor::new(answer),
                &mut Vec::<u8>::new(),
            );
            assert!(matches!(
                result,
                Err(DetectionError::OverwriteDeclined { .. })
            ));
        }
    }
}
