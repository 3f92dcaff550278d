//! Small linear congruential generator for visual noise and spawning.
//! Prototype randomness, not crypto secure; seeded from the clock by the glue
//! layer so replays differ, and from a fixed value in tests so they don't.

pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed from browser entropy instead of the clock.
    #[cfg(feature = "rng")]
    pub fn from_entropy() -> Self {
        let mut buf = [0u8; 4];
        getrandom::getrandom(&mut buf).ok();
        Self::new(u32::from_le_bytes(buf))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Uniform index in [0, len); 0 for an empty slice.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.next_u32() as usize % len
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Lcg::new(42);
        let mut b = Lcg::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn next_f64_stays_in_unit_interval() {
        let mut rng = Lcg::new(7);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn index_stays_in_bounds() {
        let mut rng = Lcg::new(99);
        for _ in 0..1000 {
            assert!(rng.index(10) < 10);
        }
        assert_eq!(rng.index(0), 0);
    }
}
