//! Splittable random keys.
//!
//! Every source of entropy in the library is an explicit [`Key`] value passed
//! into `reset`/`step`. There is no global or thread-local generator: given
//! the same seed, the same sequence of draws and splits always produces the
//! same results, which is what makes the parity harness able to drive two
//! independent implementations in lockstep.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// An explicit, splittable source of randomness.
///
/// Keys are consumed by value. Splitting derives child seeds from the parent
/// stream, so sibling keys produce decorrelated draws while remaining fully
/// determined by the root seed.
#[derive(Clone, Debug)]
pub struct Key {
    rng: ChaCha8Rng,
}

impl Key {
    /// Create a key from a seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Split into two child keys
    pub fn split(mut self) -> (Key, Key) {
        let a = self.rng.next_u64();
        let b = self.rng.next_u64();
        (Key::from_seed(a), Key::from_seed(b))
    }

    /// Split into three child keys
    pub fn split3(mut self) -> (Key, Key, Key) {
        let a = self.rng.next_u64();
        let b = self.rng.next_u64();
        let c = self.rng.next_u64();
        (Key::from_seed(a), Key::from_seed(b), Key::from_seed(c))
    }
}

impl RngCore for Key {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_key_determinism() {
        let mut a = Key::from_seed(42);
        let mut b = Key::from_seed(42);
        for _ in 0..100 {
            assert_eq!(a.gen_range(0..1000), b.gen_range(0..1000));
        }
    }

    #[test]
    fn test_split_determinism() {
        let (a1, a2) = Key::from_seed(7).split();
        let (b1, b2) = Key::from_seed(7).split();
        let mut pairs = [(a1, b1), (a2, b2)];
        for (x, y) in pairs.iter_mut() {
            assert_eq!(x.next_u64(), y.next_u64());
        }
    }

    #[test]
    fn test_split_children_differ() {
        let (mut a, mut b) = Key::from_seed(7).split();
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_split3() {
        let (a, b, c) = Key::from_seed(123).split3();
        let mut seen = [a, b, c].map(|mut k| k.next_u64());
        seen.sort_unstable();
        assert!(seen.windows(2).all(|w| w[0] != w[1]));
    }
}
