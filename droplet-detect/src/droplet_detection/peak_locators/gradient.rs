use super::{EventSlice, Location, absolute};
use crate::droplet_detection::{BaselineBand, Real, Voltage};
use itertools::Itertools;

/// A single droplet dips, recovers, dips, recovers and dips again,
/// so its gradient passes through zero this many times.
pub(crate) const WELL_FORMED_CROSSINGS: usize = 5;

/// Indices where the gradient changes sign (or touches zero), excluding the
/// first and last sample. A run of adjacent crossings is collapsed to its last member.
pub(crate) fn zero_crossings(gradient: &[Real]) -> Vec<usize> {
    let last = gradient.len().saturating_sub(1);
    gradient
        .iter()
        .tuple_windows()
        .positions(|(previous, current)| {
            (*previous >= 0.0 && *current <= 0.0) || (*previous <= 0.0 && *current >= 0.0)
        })
        .map(|position| position + 1)
        .filter(|&index| index < last)
        .coalesce(|previous, current| {
            if current == previous + 1 {
                Ok(current)
            } else {
                Err((previous, current))
            }
        })
        .collect()
}

/// Returns the location together with the number of crossings found,
/// which describes the shape of the event.
pub(crate) fn locate(event: &EventSlice, band: &BaselineBand, height: Voltage) -> (Location, usize) {
    let crossings = zero_crossings(event.gradient);
    let location = match crossings.len() {
        WELL_FORMED_CROSSINGS => crossings
            .get(WELL_FORMED_CROSSINGS / 2)
            .copied()
            .map_or(Location::Degenerate, Location::Found),
        1..WELL_FORMED_CROSSINGS => salvage(event, band, height),
        _ => Location::Degenerate,
    };
    (location, crossings.len())
}

/// Degenerate shapes are kept only if they dip more than `height` below the baseline.
fn salvage(event: &EventSlice, band: &BaselineBand, height: Voltage) -> Location {
    absolute::lowest(event.signal)
        .filter(|&index| {
            event
                .signal
                .get(index)
                .is_some_and(|&value| band.depth(value) > height)
        })
        .map_or(Location::Degenerate, Location::Salvaged)
}
