use super::{EventSlice, Location};
use crate::droplet_detection::Real;

/// Assumes a symmetric droplet, so no signal analysis is needed.
/// Events too short for the middle to fall inside them are degenerate.
pub(crate) fn locate(event: &EventSlice) -> Location {
    let middle = (event.len() as Real / 2.0).round_ties_even() as usize;
    if middle == 0 || middle + 1 >= event.len() {
        return Location::Degenerate;
    }
    Location::Found(middle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::droplet_detection::peak_locators::tests::OwnedEvent;

    #[test]
    fn middle_index() {
        let even = OwnedEvent::new(&[4.0; 8]);
        assert_eq!(locate(&even.slice()), Location::Found(4));
        // Halves are rounded to even
        let odd = OwnedEvent::new(&[4.0; 5]);
        assert_eq!(locate(&odd.slice()), Location::Found(2));
        let odd = OwnedEvent::new(&[4.0; 7]);
        assert_eq!(locate(&odd.slice()), Location::Found(4));
        let short = OwnedEvent::new(&[4.0; 4]);
        assert_eq!(locate(&short.slice()), Location::Found(2));
    }

    #[test]
    fn middle_on_boundary() {
        // Three samples round up onto the last one
        for len in [0, 1, 2, 3] {
            let event = OwnedEvent::new(&vec![4.0; len]);
            assert_eq!(locate(&event.slice()), Location::Degenerate, "{len}");
        }
    }
}
