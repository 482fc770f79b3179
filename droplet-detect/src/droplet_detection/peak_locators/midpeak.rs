use super::{EventSlice, Location, absolute};
use crate::droplet_detection::{BaselineBand, Voltage};
use itertools::Itertools;

/// Indices of samples lower than both neighbours at distance one, or lower than
/// both neighbours at distance two. The second scale tolerates single sample jitter.
pub(crate) fn local_minima(signal: &[Voltage]) -> Vec<usize> {
    signal
        .iter()
        .tuple_windows()
        .positions(|(before2, before1, value, after1, after2)| {
            (value < before1 && value < after1) || (value < before2 && value < after2)
        })
        .map(|position| position + 2)
        .collect()
}

/// Picks the single local minimum if there is one. Otherwise the deepest, provided it
/// lies more than `edge` below the baseline, and failing that the one closest to the centre.
pub(crate) fn locate(event: &EventSlice, band: &BaselineBand, edge: Voltage) -> Location {
    let minima = local_minima(event.signal);
    match minima.as_slice() {
        [] => absolute::locate(event),
        [only] => Location::Found(*only),
        _ => deepest(&minima, event, band)
            .filter(|&(_, depth)| depth > edge)
            .map(|(index, _)| index)
            .or_else(|| most_central(&minima, event))
            .map_or(Location::Degenerate, Location::Found),
    }
}

/// The first of the deepest minima, with its depth.
fn deepest(minima: &[usize], event: &EventSlice, band: &BaselineBand) -> Option<(usize, Voltage)> {
    minima
        .iter()
        .filter_map(|&index| Some((index, band.depth(*event.signal.get(index)?))))
        .min_by(|(_, a), (_, b)| b.total_cmp(a))
}

/// The first minimum with the least summed squared distance to both ends of the event.
fn most_central(minima: &[usize], event: &EventSlice) -> Option<usize> {
    let start = event.start_time()?;
    let end = event.end_time()?;
    minima
        .iter()
        .filter_map(|&index| {
            let time = *event.time.get(index)?;
            Some((index, (time - start).powi(2) + (time - end).powi(2)))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::droplet_detection::peak_locators::tests::{OwnedEvent, band};

    #[test]
    fn two_scale_minima() {
        let signal = [4.5, 4.0, 3.5, 3.0, 3.5, 4.0, 3.8, 3.7, 4.2, 4.5];
        assert_eq!(local_minima(&signal), vec![3, 7]);
        // A flat bottom has no minimum at distance one
        assert_eq!(local_minima(&[4.5, 4.0, 3.0, 3.0, 4.0, 4.5]), vec![2, 3]);
    }

    #[test]
    fn too_short_for_minima() {
        assert!(local_minima(&[4.0, 3.0, 2.0, 3.0]).is_empty());
    }

    #[test]
    fn single_minimum() {
        let event = OwnedEvent::new(&[4.5, 4.0, 3.0, 2.0, 3.0, 4.0, 4.5]);
        assert_eq!(locate(&event.slice(), &band(), 5.0), Location::Found(3));
    }

    #[test]
    fn no_minimum_falls_back_to_lowest() {
        // The final sample is lower still, but lies on the event boundary
        let event = OwnedEvent::new(&[4.0, 3.5, 3.0, 2.5, 2.0, 1.5]);
        assert_eq!(locate(&event.slice(), &band(), 5.0), Location::Found(4));
    }

    #[test]
    fn deep_lobe_dominates() {
        // A deep lobe off centre and a shallow lobe at the centre
        let event = OwnedEvent::new(&[
            4.5, 2.0, 0.0, -0.5, 0.0, 2.0, 3.5, 3.0, 3.5, 4.0, 4.2, 4.5, 4.6,
        ]);
        assert_eq!(locate(&event.slice(), &band(), 5.0), Location::Found(3));
    }

    #[test]
    fn shallow_lobes_prefer_centre() {
        // Same shape without a lobe reaching the edge threshold
        let event = OwnedEvent::new(&[
            4.5, 3.0, 2.5, 2.0, 2.5, 3.0, 3.5, 3.0, 3.5, 4.0, 4.2, 4.5, 4.6,
        ]);
        assert_eq!(locate(&event.slice(), &band(), 5.0), Location::Found(7));
    }

    #[test]
    fn centre_tie_keeps_first() {
        let event = OwnedEvent::new(&[4.5, 4.0, 3.0, 4.0, 4.2, 4.0, 3.0, 4.0, 4.5]);
        assert_eq!(locate(&event.slice(), &band(), 5.0), Location::Found(2));
    }
}
