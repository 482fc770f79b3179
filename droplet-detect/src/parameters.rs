use std::{path::PathBuf, str::FromStr};

use crate::{
    droplet_detection::{
        ExtractorSettings, Gate, GateWindow, PeakStrategy, Real, Time, Voltage,
    },
    error::{DetectionError, DetectionResult},
};
use anyhow::{Error, anyhow};
use clap::{Parser, Subcommand};

/// A pair of times in milliseconds, given on the command line as `left,right`.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub(crate) struct TimeRange {
    pub(crate) left: Time,
    pub(crate) right: Time,
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vals: Vec<_> = s.split(',').map(str::trim).collect();
        if let [left, right] = vals.as_slice() {
            Ok(TimeRange {
                left: Time::from_str(left)?,
                right: Time::from_str(right)?,
            })
        } else {
            Err(anyhow!(
                "Incorrect number of values in range, expected pattern '*,*', got '{s}'"
            ))
        }
    }
}

fn ensure(condition: bool, name: &'static str, reason: &str) -> DetectionResult<()> {
    if condition {
        Ok(())
    } else {
        Err(DetectionError::InvalidParameter {
            name,
            reason: reason.to_owned(),
        })
    }
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct DetectorParameters {
    /// Only analyse samples with `left <= time < right`, in ms.
    #[clap(long, value_name = "LEFT,RIGHT")]
    pub(crate) select: Option<TimeRange>,

    /// Half width of the baseline band about the median signal, in V.
    #[clap(long, default_value = "0.3")]
    pub(crate) tolerance: Voltage,

    /// Number of consecutive baseline samples the analysed trace must start and end with.
    #[clap(long, default_value = "40")]
    pub(crate) continuity_run: usize,

    /// Number of samples inspected either side of an event edge.
    #[clap(long, default_value = "40")]
    pub(crate) bracket_run: usize,

    /// Fraction of the inspected samples which must be at baseline.
    #[clap(long, default_value = "0.9")]
    pub(crate) bracket_fraction: Real,

    /// Shortest accepted residence time, in ms.
    #[clap(long, default_value = "0.2")]
    pub(crate) min_event_size: Time,

    /// Longest accepted residence time, in ms.
    #[clap(long, default_value = "4.0")]
    pub(crate) max_event_size: Time,

    /// If set, the extracted events are written to this file as `start,end,duration`.
    #[clap(long)]
    pub(crate) save_events: Option<PathBuf>,
}

impl DetectorParameters {
    pub(crate) fn validate(&self) -> DetectionResult<()> {
        if let Some(select) = self.select {
            ensure(
                select.left < select.right,
                "select",
                "left must be less than right",
            )?;
        }
        ensure(self.tolerance > 0.0, "tolerance", "must be positive")?;
        ensure(self.continuity_run > 0, "continuity-run", "must be positive")?;
        ensure(self.bracket_run > 0, "bracket-run", "must be positive")?;
        ensure(
            self.bracket_fraction > 0.0 && self.bracket_fraction <= 1.0,
            "bracket-fraction",
            "must lie in (0, 1]",
        )?;
        ensure(
            self.min_event_size > 0.0,
            "min-event-size",
            "must be positive",
        )?;
        ensure(
            self.min_event_size < self.max_event_size,
            "max-event-size",
            "must be greater than min-event-size",
        )
    }

    pub(crate) fn extractor_settings(&self) -> ExtractorSettings {
        ExtractorSettings {
            bracket_run: self.bracket_run,
            bracket_fraction: self.bracket_fraction,
            min_event_size: self.min_event_size,
            max_event_size: self.max_event_size,
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct GateParameters {
    /// Accept residence times strictly between `left` and `right` (ms) instead of gating automatically.
    #[clap(long, value_name = "LEFT,RIGHT", conflicts_with = "no_gate")]
    pub(crate) manual_gate: Option<TimeRange>,

    /// Keep every event regardless of residence time.
    #[clap(long)]
    pub(crate) no_gate: bool,

    /// Density below which the automatic gate closes. Lower values remove less.
    #[clap(long, default_value = "0.1")]
    pub(crate) gate_density: Real,
}

impl GateParameters {
    pub(crate) fn gate(&self) -> DetectionResult<Gate> {
        if self.no_gate {
            return Ok(Gate::Disabled);
        }
        match self.manual_gate {
            Some(TimeRange { left, right }) => Ok(Gate::Manual(GateWindow::new(left, right)?)),
            None => {
                ensure(self.gate_density > 0.0, "gate-density", "must be positive")?;
                Ok(Gate::Automatic {
                    density: self.gate_density,
                })
            }
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct MidpeakParameters {
    /// Depth below baseline (V) at which the deepest minimum is preferred to the most central.
    #[clap(long, default_value = "5.0")]
    pub(crate) edge: Voltage,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct GradientParameters {
    /// Depth below baseline (V) beyond which a misshapen event is kept at its minimum.
    #[clap(long, default_value = "4.0")]
    pub(crate) height: Voltage,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct RewriteParameters {
    /// Number of samples kept either side of each event.
    #[clap(long, default_value = "50")]
    pub(crate) margin: usize,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Mode {
    #[clap(about = "Takes the middle sample of each event.")]
    Midpoint,
    #[clap(about = "Takes the lowest sample of each event.")]
    Absolute,
    #[clap(
        about = "Takes the deepest local minimum of each event, or the most central one if none is deep enough."
    )]
    Midpeak(MidpeakParameters),
    #[clap(
        about = "Takes the middle gradient zero of well formed events. Misshapen events are dropped unless deep."
    )]
    Gradient(GradientParameters),
    #[clap(
        about = "Writes only the samples around each event, inverted, to reduce file size. No detection."
    )]
    Rewrite(RewriteParameters),
}

impl Mode {
    /// Returns `None` in rewrite mode, which locates no peaks.
    pub(crate) fn strategy(&self) -> Option<PeakStrategy> {
        match self {
            Mode::Midpoint => Some(PeakStrategy::Midpoint),
            Mode::Absolute => Some(PeakStrategy::Absolute),
            Mode::Midpeak(parameters) => Some(PeakStrategy::Midpeak {
                edge: parameters.edge,
            }),
            Mode::Gradient(parameters) => Some(PeakStrategy::Gradient {
                height: parameters.height,
            }),
            Mode::Rewrite(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[clap(flatten)]
        detector: DetectorParameters,
        #[clap(flatten)]
        gate: GateParameters,
        #[command(subcommand)]
        mode: Mode,
    }

    #[test]
    fn parse_time_range() {
        let range = TimeRange::from_str("0.4, 0.6").unwrap();
        assert_eq!(range.left, 0.4);
        assert_eq!(range.right, 0.6);
        assert!(TimeRange::from_str("0.4").is_err());
        assert!(TimeRange::from_str("0.4,0.6,0.8").is_err());
        assert!(TimeRange::from_str("a,b").is_err());
    }

    #[test]
    fn defaults() {
        let cli = TestCli::parse_from(["test", "absolute"]);
        assert!(cli.detector.validate().is_ok());
        assert_eq!(cli.detector.extractor_settings(), ExtractorSettings::default());
        assert_eq!(cli.detector.continuity_run, 40);
        assert_eq!(cli.gate.gate().unwrap(), Gate::Automatic { density: 0.1 });
        assert_eq!(cli.mode.strategy(), Some(PeakStrategy::Absolute));
    }

    #[test]
    fn mode_parameters() {
        let cli = TestCli::parse_from(["test", "midpeak", "--edge", "3.5"]);
        assert_eq!(cli.mode.strategy(), Some(PeakStrategy::Midpeak { edge: 3.5 }));

        let cli = TestCli::parse_from(["test", "gradient"]);
        assert_eq!(cli.mode.strategy(), Some(PeakStrategy::Gradient { height: 4.0 }));

        let cli = TestCli::parse_from(["test", "rewrite"]);
        assert!(cli.mode.strategy().is_none());
        assert!(matches!(cli.mode, Mode::Rewrite(RewriteParameters { margin: 50 })));
    }

    #[test]
    fn manual_gate() {
        let cli = TestCli::parse_from(["test", "--manual-gate", "0.4,0.6", "midpoint"]);
        assert_eq!(
            cli.gate.gate().unwrap(),
            Gate::Manual(GateWindow {
                left: 0.4,
                right: 0.6
            })
        );

        let cli = TestCli::parse_from(["test", "--manual-gate", "0.6,0.4", "midpoint"]);
        assert!(matches!(
            cli.gate.gate(),
            Err(DetectionError::InvalidGate { .. })
        ));
    }

    #[test]
    fn manual_gate_conflicts_with_no_gate() {
        assert!(
            TestCli::try_parse_from(["test", "--manual-gate", "0.4,0.6", "--no-gate", "absolute"])
                .is_err()
        );
        let cli = TestCli::parse_from(["test", "--no-gate", "absolute"]);
        assert_eq!(cli.gate.gate().unwrap(), Gate::Disabled);
    }

    #[test]
    fn invalid_settings() {
        let invalid = [
            ["test", "--min-event-size", "5.0"],
            ["test", "--bracket-fraction", "1.5"],
            ["test", "--tolerance", "0"],
            ["test", "--select", "10,5"],
        ];
        for args in invalid {
            let cli = TestCli::parse_from(args.into_iter().chain(["absolute"]));
            assert!(matches!(
                cli.detector.validate(),
                Err(DetectionError::InvalidParameter { .. })
            ));
        }
    }
}
