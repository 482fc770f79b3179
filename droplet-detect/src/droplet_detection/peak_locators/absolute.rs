use super::{EventSlice, Location};
use crate::droplet_detection::Real;
use itertools::Itertools;

/// The index of the lowest sample, the first one if several share the minimum.
/// The first and last samples are never chosen, as they lie on the event boundary.
pub(crate) fn lowest(signal: &[Real]) -> Option<usize> {
    let interior = signal.get(1..signal.len().saturating_sub(1))?;
    interior
        .iter()
        .position_min_by(|a, b| a.total_cmp(b))
        .map(|position| position + 1)
}

pub(crate) fn locate(event: &EventSlice) -> Location {
    lowest(event.signal).map_or(Location::Degenerate, Location::Found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::droplet_detection::{
        peak_locators::tests::OwnedEvent,
        synthetic::{BASELINE, SyntheticTrace},
    };
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn first_minimum() {
        let event = OwnedEvent::new(&[4.5, 2.0, 3.0, 2.0, 4.5]);
        assert_eq!(locate(&event.slice()), Location::Found(1));
    }

    #[test]
    fn boundary_samples_are_ignored() {
        let event = OwnedEvent::new(&[4.0, 4.5, 4.5, 4.5, 4.5]);
        assert_eq!(locate(&event.slice()), Location::Found(1));
        let event = OwnedEvent::new(&[4.5, 4.4, 4.3, 4.2]);
        assert_eq!(locate(&event.slice()), Location::Found(2));
    }

    #[test]
    fn too_short_for_interior() {
        let signals: [&[Real]; 3] = [&[], &[2.0], &[2.0, 1.0]];
        for signal in signals {
            let event = OwnedEvent::new(signal);
            assert_eq!(locate(&event.slice()), Location::Degenerate);
        }
    }

    #[test]
    fn triangular_dip() {
        let trace = SyntheticTrace::default().dip(21, 2.0).build();
        let event = OwnedEvent::new(trace.signal());
        assert_eq!(locate(&event.slice()), Location::Found(21));
        assert_approx_eq!(event.signal[21], 2.0, 1e-9);
        assert!(event.signal[21] < BASELINE);
    }
}
