//! Dict (dictionary) state space

use std::collections::{BTreeMap, HashMap};

use ndarray::ArrayD;
use rand::Rng;

use super::{DynSpace, Space};

/// Dictionary space over named sub-spaces.
///
/// Used as the state-space descriptor: each state field maps to a sub-space
/// and containment requires exactly the declared fields, each within its
/// sub-space. Sub-spaces are kept in a `BTreeMap` so iteration (and thus
/// keyed sampling) is deterministic.
#[derive(Clone, Debug)]
pub struct Dict {
    /// Named sub-spaces
    pub spaces: BTreeMap<String, DynSpace>,
    /// Cached total flattened shape
    shape: Vec<usize>,
}

impl Dict {
    /// Create a new dict space
    pub fn new(spaces: BTreeMap<String, DynSpace>) -> Self {
        let total: usize = spaces
            .values()
            .map(|s| s.shape().iter().product::<usize>())
            .sum();
        Self {
            spaces,
            shape: vec![total],
        }
    }

    /// Create from a list of (name, space) pairs
    pub fn from_pairs(pairs: Vec<(&str, DynSpace)>) -> Self {
        let spaces: BTreeMap<_, _> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self::new(spaces)
    }

    /// Get a sub-space by name
    pub fn get(&self, name: &str) -> Option<&DynSpace> {
        self.spaces.get(name)
    }

    /// Iterate field names in deterministic order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.spaces.keys()
    }
}

impl Space for Dict {
    type Sample = HashMap<String, ArrayD<f32>>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        self.spaces
            .iter()
            .map(|(k, v)| (k.clone(), v.sample(rng)))
            .collect()
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        if value.len() != self.spaces.len() {
            return false;
        }
        self.spaces.iter().all(|(name, space)| {
            value
                .get(name)
                .map(|field| space.contains_value(field))
                .unwrap_or(false)
        })
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Key;
    use crate::spaces::{Box as BoxSpace, Discrete};
    use ndarray::IxDyn;

    fn sample_space() -> Dict {
        Dict::from_pairs(vec![
            ("label", DynSpace::Discrete(Discrete::new(4))),
            ("grid", DynSpace::Box(BoxSpace::unit(&[2, 2]))),
        ])
    }

    #[test]
    fn test_dict_lookup() {
        let dict = sample_space();
        assert!(dict.get("label").is_some());
        assert!(dict.get("grid").is_some());
        assert!(dict.get("unknown").is_none());
    }

    #[test]
    fn test_dict_contains() {
        let dict = sample_space();
        let mut value = HashMap::new();
        value.insert("label".to_string(), ArrayD::from_elem(IxDyn(&[1]), 2.0));
        value.insert("grid".to_string(), ArrayD::from_elem(IxDyn(&[2, 2]), 0.5));
        assert!(dict.contains(&value));

        // Out-of-range field
        value.insert("label".to_string(), ArrayD::from_elem(IxDyn(&[1]), 9.0));
        assert!(!dict.contains(&value));
    }

    #[test]
    fn test_dict_rejects_missing_and_extra_fields() {
        let dict = sample_space();
        let mut value = HashMap::new();
        value.insert("label".to_string(), ArrayD::from_elem(IxDyn(&[1]), 1.0));
        assert!(!dict.contains(&value));

        value.insert("grid".to_string(), ArrayD::from_elem(IxDyn(&[2, 2]), 0.5));
        value.insert("stray".to_string(), ArrayD::from_elem(IxDyn(&[1]), 0.0));
        assert!(!dict.contains(&value));
    }

    #[test]
    fn test_dict_sample_contained() {
        let dict = sample_space();
        let mut key = Key::from_seed(11);
        for _ in 0..20 {
            let sample = dict.sample(&mut key);
            assert!(dict.contains(&sample));
        }
    }
}
