use super::{Event, EventSlice, Real, Time, Voltage};
use crate::error::{DetectionError, DetectionResult};

/// A captured trace: strictly increasing sample times and their signal values.
/// Stages which shorten the trace produce a new one rather than mutating it.
#[derive(Default, Debug, Clone, PartialEq)]
pub(crate) struct Trace {
    time: Vec<Time>,
    signal: Vec<Voltage>,
}

impl Trace {
    pub(crate) fn len(&self) -> usize {
        self.time.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub(crate) fn time(&self) -> &[Time] {
        &self.time
    }

    pub(crate) fn signal(&self) -> &[Voltage] {
        &self.signal
    }

    pub(crate) fn last_time(&self) -> Option<Time> {
        self.time.last().copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Time, Voltage)> + Clone + '_ {
        self.time.iter().copied().zip(self.signal.iter().copied())
    }

    /// Keeps the samples with `left <= time < right`.
    pub(crate) fn select(&self, left: Time, right: Time) -> DetectionResult<Trace> {
        let selected: Trace = self
            .iter()
            .filter(|(time, _)| (left..right).contains(time))
            .collect();
        if selected.is_empty() {
            Err(DetectionError::EmptySelection { left, right })
        } else {
            Ok(selected)
        }
    }

    /// Copies the samples from `start` to `end` inclusive, clamped to the trace.
    pub(crate) fn slice(&self, start: usize, end: usize) -> Trace {
        self.iter()
            .skip(start)
            .take((end + 1).saturating_sub(start))
            .collect()
    }

    /// Borrows the samples of an event together with the matching run of `gradient`,
    /// which must have been computed over this trace.
    pub(crate) fn event_slice<'a>(
        &'a self,
        event: &Event,
        gradient: &'a [Real],
    ) -> Option<EventSlice<'a>> {
        let range = event.start..=event.end;
        Some(EventSlice {
            time: self.time.get(range.clone())?,
            signal: self.signal.get(range.clone())?,
            gradient: gradient.get(range)?,
        })
    }
}

impl FromIterator<(Time, Voltage)> for Trace {
    fn from_iter<I: IntoIterator<Item = (Time, Voltage)>>(iter: I) -> Self {
        let (time, signal) = iter.into_iter().unzip();
        Trace { time, signal }
    }
}
