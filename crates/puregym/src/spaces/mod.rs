//! Observation, action, and state space descriptors.
//!
//! Spaces describe the valid domain of a value so that observations, actions,
//! and state fields can be containment-checked rather than trusted.

mod r#box;
mod dict;
mod discrete;

pub use dict::Dict;
pub use discrete::Discrete;
pub use r#box::Box;

use ndarray::{ArrayD, IxDyn};
use rand::Rng;

/// Trait for observation and action spaces
pub trait Space: Clone + Send + Sync {
    /// The type of samples from this space
    type Sample;

    /// Sample a random element from this space
    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample;

    /// Check if a value is contained in this space
    fn contains(&self, value: &Self::Sample) -> bool;

    /// Get the shape of samples from this space
    fn shape(&self) -> &[usize];

    /// Get the total number of elements in a sample
    fn num_elements(&self) -> usize {
        self.shape().iter().product()
    }
}

/// Dynamically typed sub-space used for [`Dict`] fields.
///
/// State fields are carried as `f32` arrays regardless of their logical type
/// (see [`crate::env::StateFields`]), so this enum also provides containment
/// over that encoding: a `Discrete` field accepts an integral scalar in
/// range, a `Box` field checks shape and bounds.
#[derive(Clone, Debug)]
pub enum DynSpace {
    Discrete(Discrete),
    Box(Box),
}

impl DynSpace {
    /// Shape of the field's encoded representation
    pub fn shape(&self) -> &[usize] {
        match self {
            DynSpace::Discrete(s) => s.shape(),
            DynSpace::Box(s) => s.shape(),
        }
    }

    /// Sample the field as an `f32` array
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ArrayD<f32> {
        match self {
            DynSpace::Discrete(s) => {
                ArrayD::from_elem(IxDyn(&[1]), s.sample(rng) as f32)
            }
            DynSpace::Box(s) => s.sample(rng),
        }
    }

    /// Containment over the `f32`-encoded representation
    pub fn contains_value(&self, value: &ArrayD<f32>) -> bool {
        match self {
            DynSpace::Discrete(s) => {
                if value.shape() != s.shape() {
                    return false;
                }
                let v = value[[0]];
                v >= 0.0 && v.fract() == 0.0 && s.contains(&(v as usize))
            }
            DynSpace::Box(s) => s.contains(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Key;

    #[test]
    fn test_dyn_discrete_contains_value() {
        let space = DynSpace::Discrete(Discrete::new(4));
        let ok = ArrayD::from_elem(IxDyn(&[1]), 3.0);
        let fractional = ArrayD::from_elem(IxDyn(&[1]), 1.5);
        let negative = ArrayD::from_elem(IxDyn(&[1]), -1.0);
        let too_big = ArrayD::from_elem(IxDyn(&[1]), 4.0);
        assert!(space.contains_value(&ok));
        assert!(!space.contains_value(&fractional));
        assert!(!space.contains_value(&negative));
        assert!(!space.contains_value(&too_big));
    }

    #[test]
    fn test_dyn_sample_contained() {
        let mut key = Key::from_seed(3);
        let spaces = [
            DynSpace::Discrete(Discrete::new(7)),
            DynSpace::Box(Box::unit(&[2, 2])),
        ];
        for space in &spaces {
            for _ in 0..50 {
                let v = space.sample(&mut key);
                assert!(space.contains_value(&v));
            }
        }
    }
}
