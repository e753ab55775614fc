//! Seeded noise for synthetic replicate counts.

use std::f64::consts::TAU;

/// SplitMix64 stream. The same seed always yields the same gene files.
pub struct CountRng {
    state: u64,
}

impl CountRng {
    pub fn new(seed: u64) -> Self {
        CountRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Normal draw via Box-Muller.
    pub fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        mean + sd * (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
    }

    /// Non-negative whole count around `base`. Noisy samples spread wide
    /// enough to cross the default thresholds; quiet ones stay tight.
    pub fn count(&mut self, base: f64, noisy: bool) -> u64 {
        let sd = if noisy { base * 0.8 } else { base * 0.05 };
        self.normal(base, sd).abs().round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_counts() {
        let mut a = CountRng::new(42);
        let mut b = CountRng::new(42);
        let xs: Vec<u64> = (0..20).map(|_| a.count(200.0, true)).collect();
        let ys: Vec<u64> = (0..20).map(|_| b.count(200.0, true)).collect();
        assert_eq!(xs, ys);

        let mut c = CountRng::new(7);
        let zs: Vec<u64> = (0..20).map(|_| c.count(200.0, true)).collect();
        assert_ne!(xs, zs);
    }

    #[test]
    fn uniform_stays_in_unit_interval() {
        let mut rng = CountRng::new(1);
        assert!((0..1000).map(|_| rng.uniform()).all(|u| (0.0..1.0).contains(&u)));
    }

    #[test]
    fn quiet_counts_stay_near_base() {
        let mut rng = CountRng::new(3);
        let counts: Vec<u64> = (0..200).map(|_| rng.count(200.0, false)).collect();
        let mean = counts.iter().sum::<u64>() as f64 / counts.len() as f64;
        assert!((mean - 200.0).abs() < 10.0, "mean {mean}");
    }
}
