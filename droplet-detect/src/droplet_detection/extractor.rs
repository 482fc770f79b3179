use super::{BaselineBand, Event, Real, SampleIndex, Time, Trace, Voltage};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtractorSettings {
    /// Number of samples inspected either side of an edge.
    pub(crate) bracket_run: usize,
    /// Fraction of the inspected samples which must lie within the baseline band.
    pub(crate) bracket_fraction: Real,
    pub(crate) min_event_size: Time,
    pub(crate) max_event_size: Time,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            bracket_run: 40,
            bracket_fraction: 0.9,
            min_event_size: 0.2,
            max_event_size: 4.0,
        }
    }
}

impl ExtractorSettings {
    fn accepts(&self, duration: Time) -> bool {
        (self.min_event_size..=self.max_event_size).contains(&duration)
    }

    fn required_in_band(&self) -> Real {
        self.bracket_fraction * self.bracket_run as Real
    }
}

#[derive(Clone, Copy)]
enum Side {
    Before,
    After,
}

/// A hysteresis detector over the lower edge of the baseline band.
/// An event starts where the signal falls through `low` after a mostly-baseline stretch,
/// and ends where it climbs back through `low` before another mostly-baseline stretch.
#[derive(Clone)]
pub(crate) struct EventIter<'a> {
    trace: &'a Trace,
    band: BaselineBand,
    settings: &'a ExtractorSettings,
    index: SampleIndex,
    start: Option<SampleIndex>,
    rejected: usize,
}

impl<'a> EventIter<'a> {
    fn new(trace: &'a Trace, band: BaselineBand, settings: &'a ExtractorSettings) -> Self {
        Self {
            trace,
            band,
            settings,
            index: 1,
            start: None,
            rejected: 0,
        }
    }

    /// Number of completed events discarded because of their duration.
    pub(crate) fn rejected(&self) -> usize {
        self.rejected
    }

    fn is_below(&self, index: SampleIndex) -> bool {
        let low = self.band.low;
        self.trace.signal().get(index).is_some_and(|&value| value < low)
    }

    /// The nearest sample before `index` which does not sit exactly on `low`.
    fn departure(&self, index: SampleIndex) -> Option<Voltage> {
        let low = self.band.low;
        let before = self.trace.signal().get(..index)?;
        before.iter().rev().copied().find(|&value| value != low)
    }

    /// The nearest sample after `index` which does not sit exactly on `low`.
    fn arrival(&self, index: SampleIndex) -> Option<Voltage> {
        let low = self.band.low;
        let after = self.trace.signal().get(index + 1..)?;
        after.iter().copied().find(|&value| value != low)
    }

    /// Samples lying exactly on `low` belong to the crossing, not to either side of it.
    fn is_falling_edge(&self, index: SampleIndex) -> bool {
        let low = self.band.low;
        self.is_below(index) && self.departure(index).is_some_and(|value| value > low)
    }

    fn is_rising_edge(&self, index: SampleIndex) -> bool {
        let low = self.band.low;
        self.is_below(index) && self.arrival(index).is_some_and(|value| value > low)
    }

    /// Samples beyond either end of the trace count as out of band.
    fn is_bracketed(&self, index: SampleIndex, side: Side) -> bool {
        let signal = self.trace.signal();
        let in_band = (1..=self.settings.bracket_run)
            .filter_map(|offset| match side {
                Side::Before => index.checked_sub(offset),
                Side::After => index.checked_add(offset),
            })
            .filter_map(|i| signal.get(i))
            .filter(|&&value| self.band.contains(value))
            .count();
        in_band as Real >= self.settings.required_in_band()
    }
}

impl Iterator for EventIter<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        let trace = self.trace;
        while self.index + 1 < trace.len() {
            let index = self.index;
            self.index += 1;

            if self.is_falling_edge(index) && self.is_bracketed(index, Side::Before) {
                // Only the most recent unmatched start is remembered
                self.start = Some(index);
            }
            if self.is_rising_edge(index) && self.is_bracketed(index, Side::After) {
                let Some(start) = self.start.take() else {
                    continue;
                };
                let event = Event {
                    start,
                    end: index,
                    start_time: *trace.time().get(start)?,
                    end_time: *trace.time().get(index)?,
                };
                if self.settings.accepts(event.duration()) {
                    return Some(event);
                }
                self.rejected += 1;
                tracing::trace!(%event, span = event.span(), "Event rejected by size");
            }
        }
        None
    }
}

pub(crate) trait ExtractEvents {
    fn events<'a>(&'a self, band: &BaselineBand, settings: &'a ExtractorSettings)
    -> EventIter<'a>;
}

impl ExtractEvents for Trace {
    fn events<'a>(
        &'a self,
        band: &BaselineBand,
        settings: &'a ExtractorSettings,
    ) -> EventIter<'a> {
        EventIter::new(self, *band, settings)
    }
}
