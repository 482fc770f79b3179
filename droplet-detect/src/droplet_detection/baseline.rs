use super::{Real, Voltage};
use crate::error::{DetectionError, DetectionResult};

/// The range of signal values regarded as "no droplet present".
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub(crate) struct BaselineBand {
    pub(crate) level: Voltage,
    pub(crate) high: Voltage,
    pub(crate) low: Voltage,
}

impl BaselineBand {
    pub(crate) fn new(level: Voltage, tolerance: Voltage) -> Self {
        BaselineBand {
            level,
            high: level + tolerance,
            low: level - tolerance,
        }
    }

    /// Takes the median of the whole signal as the background level.
    /// Droplets occupy a minority of samples, so their dips do not drag the median.
    #[tracing::instrument(skip_all, fields(num_samples = signal.len(), level))]
    pub(crate) fn estimate(signal: &[Voltage], tolerance: Voltage) -> DetectionResult<Self> {
        let mut sorted = signal.to_vec();
        let middle = sorted.len() / 2;
        if sorted.is_empty() {
            return Err(DetectionError::EmptyTrace);
        }
        let (_, &mut level, _) = sorted.select_nth_unstable_by(middle, Real::total_cmp);
        tracing::Span::current().record("level", level);
        Ok(Self::new(level, tolerance))
    }

    pub(crate) fn contains(&self, value: Voltage) -> bool {
        self.low < value && value < self.high
    }

    /// How far `value` dips below the background level.
    pub(crate) fn depth(&self, value: Voltage) -> Voltage {
        self.level - value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn median_of_odd() {
        let band = BaselineBand::estimate(&[5.0, 1.0, 4.0, 5.2, 4.9], 0.3).unwrap();
        assert_eq!(band.level, 4.9);
        assert_approx_eq!(band.high, 5.2, 1e-12);
        assert_approx_eq!(band.low, 4.6, 1e-12);
    }

    #[test]
    fn median_takes_upper_middle() {
        let band = BaselineBand::estimate(&[1.0, 2.0, 3.0, 4.0], 0.5).unwrap();
        assert_eq!(band.level, 3.0);
    }

    #[test]
    fn robust_to_dips() {
        let mut signal = vec![5.0; 80];
        signal.extend([2.0, 1.5, 1.0, 1.5, 2.0].iter().cycle().take(30));
        let band = BaselineBand::estimate(&signal, 0.3).unwrap();
        assert_eq!(band.level, 5.0);
    }

    #[test]
    fn empty_signal() {
        assert!(matches!(
            BaselineBand::estimate(&[], 0.3),
            Err(DetectionError::EmptyTrace)
        ));
    }

    #[test]
    fn band_is_open() {
        let band = BaselineBand::new(5.0, 0.5);
        assert!(band.contains(5.0));
        assert!(band.contains(4.6));
        assert!(!band.contains(4.5));
        assert!(!band.contains(5.5));
        assert_approx_eq!(band.depth(2.0), 3.0, 1e-12);
    }
}
