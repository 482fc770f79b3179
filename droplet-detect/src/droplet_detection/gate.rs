use super::{Event, PeakRecord, Real, Time};
use crate::error::{DetectionError, DetectionResult, Stage};
use ndarray::array;
use ndarray_stats::histogram::{Bins, Edges, Grid, Histogram};
use noisy_float::types::n64;
use tracing::{debug, warn};

/// Residence times are binned at roughly the sampling interval of the source data.
pub(crate) const RESIDENCE_BIN_WIDTH: Time = 0.026313;

/// Residence times strictly between `left` and `right` are accepted as single droplets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GateWindow {
    pub(crate) left: Time,
    pub(crate) right: Time,
}

impl GateWindow {
    pub(crate) fn new(left: Time, right: Time) -> DetectionResult<Self> {
        if left < right {
            Ok(Self { left, right })
        } else {
            Err(DetectionError::InvalidGate { left, right })
        }
    }

    pub(crate) fn contains(&self, residence: Time) -> bool {
        self.left < residence && residence < self.right
    }
}

/// Edges from `start` in steps of `width`, continuing until `stop` lies inside the last bin.
pub(crate) fn make_bin_edges(start: Time, stop: Time, width: Time) -> Vec<Time> {
    let num_bins = ((stop - start) / width).floor() as usize + 1;
    (0..=num_bins).map(|i| start + i as Time * width).collect()
}

/// Density of residence times per unit time, so that the bins integrate to one.
pub(crate) struct ResidenceHistogram {
    edges: Vec<Time>,
    density: Vec<Real>,
}

impl ResidenceHistogram {
    /// The first bin is centred on the shortest residence time. Returns `None` if there are none.
    pub(crate) fn new(residence: &[Time], bin_width: Time) -> Option<Self> {
        let min = residence.iter().copied().reduce(Real::min)?;
        let max = residence.iter().copied().reduce(Real::max)?;
        let edges = make_bin_edges(min - bin_width / 2.0, max, bin_width);

        let bins = Bins::new(Edges::from(
            edges.iter().copied().map(n64).collect::<Vec<_>>(),
        ));
        let mut histogram = Histogram::new(Grid::from(vec![bins]));
        for &time in residence {
            if histogram.add_observation(&array![n64(time)]).is_err() {
                warn!("Bin not found for residence time {time}");
            }
        }

        let counts = histogram.counts();
        let total = counts.sum() as Real;
        let density = counts
            .iter()
            .map(|&count| count as Real / (total * bin_width))
            .collect();
        Some(Self { edges, density })
    }

    pub(crate) fn density(&self) -> &[Real] {
        &self.density
    }

    /// The first bin of greatest density.
    pub(crate) fn top_bin(&self) -> Option<usize> {
        self.density
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| b.total_cmp(a))
            .map(|(bin, _)| bin)
    }

    pub(crate) fn bin_centre(&self, bin: usize) -> Option<Time> {
        Some((self.edges.get(bin)? + self.edges.get(bin + 1)?) / 2.0)
    }

    /// Walks outwards from the densest bin until the density first drops below `threshold`,
    /// isolating the dominant droplet population from fused and split events.
    pub(crate) fn auto_gate(&self, threshold: Real) -> Option<GateWindow> {
        let top = self.top_bin()?;
        let below = |bin: &usize| self.density.get(*bin).is_some_and(|&d| d < threshold);
        let right = (top..self.density.len())
            .find(below)
            .map_or(self.density.len(), |bin| bin + 1);
        let left = (1..=top).rev().find(below).unwrap_or(0);
        Some(GateWindow {
            left: *self.edges.get(left)?,
            right: *self.edges.get(right)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Gate {
    Automatic { density: Real },
    Manual(GateWindow),
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GateOutcome {
    pub(crate) window: Option<GateWindow>,
    pub(crate) retained: Vec<PeakRecord>,
    pub(crate) removed: Vec<PeakRecord>,
}

impl Gate {
    /// Returns `None` if gating is disabled.
    pub(crate) fn window(&self, residence: &[Time]) -> DetectionResult<Option<GateWindow>> {
        match self {
            Gate::Automatic { density } => {
                let histogram = ResidenceHistogram::new(residence, RESIDENCE_BIN_WIDTH)
                    .ok_or(DetectionError::EmptyEventSet(Stage::PeakLocation))?;
                debug!(
                    num_bins = histogram.density().len(),
                    top_bin_centre = ?histogram.top_bin().and_then(|bin| histogram.bin_centre(bin)),
                    "Residence histogram built"
                );
                histogram
                    .auto_gate(*density)
                    .map(Some)
                    .ok_or(DetectionError::EmptyEventSet(Stage::PeakLocation))
            }
            Gate::Manual(window) => Ok(Some(*window)),
            Gate::Disabled => Ok(None),
        }
    }

    /// Splits `records` by the residence time of the event each refers to, preserving order.
    #[tracing::instrument(skip_all, fields(num_retained, num_removed))]
    pub(crate) fn apply(
        &self,
        records: Vec<PeakRecord>,
        events: &[Event],
    ) -> DetectionResult<GateOutcome> {
        let residence = |record: &PeakRecord| events.get(record.event_id).map(Event::duration);
        let residences: Vec<Time> = records.iter().filter_map(residence).collect();
        let window = self.window(&residences)?;
        let (retained, removed): (Vec<_>, Vec<_>) = match window {
            Some(window) => records.into_iter().partition(|record| {
                residence(record).is_some_and(|time| window.contains(time))
            }),
            None => (records, Vec::new()),
        };

        let span = tracing::Span::current();
        span.record("num_retained", retained.len());
        span.record("num_removed", removed.len());
        Ok(GateOutcome {
            window,
            retained,
            removed,
        })
    }
}
