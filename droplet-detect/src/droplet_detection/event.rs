use super::{Real, SampleIndex, Time, Voltage};
use std::fmt::Display;

/// Position of an event within the collection produced by the extractor.
pub(crate) type EventId = usize;

/// A single excursion below the baseline band, the samples `start..=end` of the trimmed trace.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub(crate) struct Event {
    pub(crate) start: SampleIndex,
    pub(crate) end: SampleIndex,
    pub(crate) start_time: Time,
    pub(crate) end_time: Time,
}

impl Event {
    /// The residence time of the droplet.
    pub(crate) fn duration(&self) -> Time {
        self.end_time - self.start_time
    }

    /// Number of samples between the start and end of the event.
    pub(crate) fn span(&self) -> usize {
        self.end - self.start
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{0},{1},{2}", self.start_time, self.end_time, self.duration())
    }
}

/// The samples of one event, borrowed from the trimmed trace and its gradient.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EventSlice<'a> {
    pub(crate) time: &'a [Time],
    pub(crate) signal: &'a [Voltage],
    pub(crate) gradient: &'a [Real],
}

impl EventSlice<'_> {
    pub(crate) fn len(&self) -> usize {
        self.signal.len()
    }

    pub(crate) fn start_time(&self) -> Option<Time> {
        self.time.first().copied()
    }

    pub(crate) fn end_time(&self) -> Option<Time> {
        self.time.last().copied()
    }

    pub(crate) fn peak(&self, event_id: EventId, index: usize) -> Option<PeakRecord> {
        Some(PeakRecord {
            event_id,
            time: *self.time.get(index)?,
            value: *self.signal.get(index)?,
        })
    }
}

/// The representative point of an event. `event_id` refers back into the event collection.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub(crate) struct PeakRecord {
    pub(crate) event_id: EventId,
    pub(crate) time: Time,
    pub(crate) value: Voltage,
}

impl Display for PeakRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{0} at {1} ms: {2} V", self.event_id, self.time, self.value)
    }
}
