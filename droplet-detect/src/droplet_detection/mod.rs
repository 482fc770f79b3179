//! This module provides the tools for turning a captured droplet trace into
//! a population of droplet events, each with a residence time and a
//! representative peak value.
//!
//! A trace is a sequence of `(time, signal)` samples in which the background
//! sits high and every droplet passing the sensor shows up as a dip.
//! Typical usage may look like:
//! ```ignore
//! let band = BaselineBand::estimate(trace.signal(), 0.3)?;     // median level +/- 0.3 V
//! let range = find_continuous_range(trace.signal(), &band, 40)?;
//! let trace = trace.slice(range);                               // starts and ends at baseline
//! let events: Vec<_> = trace.events(&band, &settings).collect();
//! let mut locator = PeakLocator::new(&PeakStrategy::Absolute, band);
//! let peaks: Vec<_> = events
//!     .iter()
//!     .enumerate()
//!     .filter_map(|(id, event)| locator.locate(id, &trace.event_slice(event, &gradient)?))
//!     .collect();
//! ```

pub(crate) mod baseline;
pub(crate) mod continuity;
pub(crate) mod event;
pub(crate) mod extractor;
pub(crate) mod finite_differences;
pub(crate) mod gate;
pub(crate) mod loader;
pub(crate) mod peak_locators;
pub(crate) mod save_to_file;
#[cfg(test)]
pub(crate) mod synthetic;
pub(crate) mod trace;

pub(crate) use aads_common::{Real, SampleIndex, Time, Voltage};
pub(crate) use baseline::BaselineBand;
pub(crate) use continuity::find_continuous_range;
pub(crate) use event::{Event, EventId, EventSlice, PeakRecord};
pub(crate) use extractor::{ExtractEvents, ExtractorSettings};
pub(crate) use finite_differences::gradient;
pub(crate) use gate::{Gate, GateOutcome, GateWindow};
pub(crate) use peak_locators::{PeakLocator, PeakStrategy};
pub(crate) use save_to_file::SaveToFileFilter;
pub(crate) use trace::Trace;
