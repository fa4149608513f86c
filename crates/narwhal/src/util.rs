//! Small shared helpers.

/// Seeded xorshift64* generator. Only used to break ordering ties, so the layout stays
/// deterministic for a fixed seed.
#[derive(Debug, Clone)]
pub(crate) struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    pub(crate) fn new(seed: u64) -> Self {
        // Spread small seeds so that 1 and 2 do not start from nearly equal states.
        let mixed = seed.wrapping_mul(0x9E3779B97F4A7C15_u64) ^ 0xD1B54A32D192ED03_u64;
        Self { state: mixed.max(1) }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D_u64)
    }

    pub(crate) fn next_f64_unit(&mut self) -> f64 {
        // [0, 1) with 53 bits of precision.
        let u = self.next_u64() >> 11;
        (u as f64) / ((1u64 << 53) as f64)
    }

    pub(crate) fn next_bool(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    pub(crate) fn next_usize(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        let idx = (self.next_f64_unit() * (upper as f64)).floor() as usize;
        idx.min(upper - 1)
    }
}

pub(crate) const EPS: f64 = 1e-6;

pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPS
}

/// Sign of the z component of `(b - a) x (c - a)`.
pub(crate) fn cross(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = XorShift64Star::new(1);
        let mut b = XorShift64Star::new(1);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        let mut c = XorShift64Star::new(2);
        assert_ne!(XorShift64Star::new(1).next_u64(), c.next_u64());
    }

    #[test]
    fn unit_floats_stay_in_range() {
        let mut r = XorShift64Star::new(7);
        for _ in 0..100 {
            let v = r.next_f64_unit();
            assert!((0.0..1.0).contains(&v));
            assert!(r.next_usize(5) < 5);
        }
    }
}
