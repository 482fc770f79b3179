use super::Real;
use itertools::Itertools;

/// The discrete derivative of `signal` per sample: central differences in the
/// interior and one-sided differences at either end.
pub(crate) fn gradient(signal: &[Real]) -> Vec<Real> {
    let (Some(head), Some(tail)) = (
        one_sided(signal.iter()),
        one_sided(signal.iter().rev()).map(|difference| -difference),
    ) else {
        return vec![Real::default(); signal.len()];
    };
    std::iter::once(head)
        .chain(
            signal
                .iter()
                .tuple_windows()
                .map(|(previous, _, next)| (next - previous) / 2.0),
        )
        .chain(std::iter::once(tail))
        .collect()
}

fn one_sided<'a>(mut values: impl Iterator<Item = &'a Real>) -> Option<Real> {
    let first = values.next()?;
    let second = values.next()?;
    Some(second - first)
}
