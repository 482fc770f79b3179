pub(crate) mod absolute;
pub(crate) mod gradient;
pub(crate) mod midpeak;
pub(crate) mod midpoint;

use super::{BaselineBand, EventId, EventSlice, PeakRecord, Voltage};
use std::collections::BTreeMap;

/// How the representative point of each event is chosen. One strategy is used for a whole run.
#[derive(Debug, Clone, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum PeakStrategy {
    /// The middle sample of the event.
    Midpoint,
    /// The lowest sample of the event.
    Absolute,
    /// The dominant or most central local minimum.
    Midpeak { edge: Voltage },
    /// The middle zero of the gradient of a well formed droplet.
    Gradient { height: Voltage },
}

/// The outcome of examining a single event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Location {
    /// Index of the representative sample within the event.
    Found(usize),
    /// The shape was degenerate, but the dip was deep enough for its minimum to stand in.
    Salvaged(usize),
    /// The shape was degenerate and the event is dropped.
    Degenerate,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub(crate) struct LocatorStatistics {
    pub(crate) found: usize,
    pub(crate) salvaged: usize,
    pub(crate) degenerate: usize,
    /// Number of events by count of gradient zero crossings.
    pub(crate) crossings: BTreeMap<usize, usize>,
}

impl LocatorStatistics {
    pub(crate) fn examined(&self) -> usize {
        self.found + self.salvaged + self.degenerate
    }
}

pub(crate) struct PeakLocator<'a> {
    strategy: &'a PeakStrategy,
    band: BaselineBand,
    statistics: LocatorStatistics,
}

impl<'a> PeakLocator<'a> {
    pub(crate) fn new(strategy: &'a PeakStrategy, band: BaselineBand) -> Self {
        Self {
            strategy,
            band,
            statistics: LocatorStatistics::default(),
        }
    }

    pub(crate) fn statistics(&self) -> &LocatorStatistics {
        &self.statistics
    }

    /// Yields at most one record per event, always from a sample strictly inside it.
    /// Apart from events under three samples long, only the gradient strategy drops events.
    pub(crate) fn locate(&mut self, event_id: EventId, event: &EventSlice) -> Option<PeakRecord> {
        let location = match self.strategy {
            PeakStrategy::Midpoint => midpoint::locate(event),
            PeakStrategy::Absolute => absolute::locate(event),
            PeakStrategy::Midpeak { edge } => midpeak::locate(event, &self.band, *edge),
            PeakStrategy::Gradient { height } => {
                let (location, crossings) = gradient::locate(event, &self.band, *height);
                *self.statistics.crossings.entry(crossings).or_default() += 1;
                location
            }
        };
        match location {
            Location::Found(index) => {
                self.statistics.found += 1;
                event.peak(event_id, index)
            }
            Location::Salvaged(index) => {
                self.statistics.salvaged += 1;
                event.peak(event_id, index)
            }
            Location::Degenerate => {
                self.statistics.degenerate += 1;
                tracing::trace!(event_id, "Degenerate event shape");
                None
            }
        }
    }
}
