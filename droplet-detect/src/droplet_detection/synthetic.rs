//! Builders for synthetic droplet traces used across the unit tests.
use super::{Time, Trace, Voltage};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

pub(crate) const SAMPLE_TIME: Time = 0.025;
pub(crate) const BASELINE: Voltage = 5.0;

#[derive(Default, Clone)]
pub(crate) struct SyntheticTrace {
    signal: Vec<Voltage>,
}

impl SyntheticTrace {
    pub(crate) fn baseline(mut self, len: usize) -> Self {
        self.signal.extend(std::iter::repeat_n(BASELINE, len));
        self
    }

    /// A symmetric triangular dip of `2 * half_width + 1` samples reaching down to `minimum`.
    pub(crate) fn dip(mut self, half_width: usize, minimum: Voltage) -> Self {
        let half_width_real = half_width as Voltage;
        self.signal.extend((0..=2 * half_width).map(|k| {
            let distance = k.abs_diff(half_width) as Voltage;
            BASELINE - (BASELINE - minimum) * (1.0 - distance / half_width_real)
        }));
        self
    }

    pub(crate) fn samples(mut self, values: &[Voltage]) -> Self {
        self.signal.extend_from_slice(values);
        self
    }

    pub(crate) fn with_noise(mut self, sigma: Voltage, seed: u64) -> Self {
        let normal = Normal::new(0.0, sigma).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        for value in self.signal.iter_mut() {
            *value += normal.sample(&mut rng);
        }
        self
    }

    pub(crate) fn build(self) -> Trace {
        self.signal
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i as Time * SAMPLE_TIME, v))
            .collect()
    }
}
