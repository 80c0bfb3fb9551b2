//! Core environment trait definitions.

use std::collections::HashMap;

use ndarray::{ArrayD, IxDyn};
use smallvec::SmallVec;

use crate::rng::Key;
use crate::spaces::{Box as BoxSpace, Dict, Discrete, Space};
use crate::{GymError, Result};

/// Auxiliary diagnostics attached to a transition
#[derive(Clone, Debug)]
pub struct StepInfo {
    /// Discount factor after the transition (0.0 once terminal)
    pub discount: f32,
    /// Custom metrics (kept minimal for performance)
    pub extra: SmallVec<[(&'static str, f32); 4]>,
}

impl StepInfo {
    /// Create info carrying only the discount
    pub fn new(discount: f32) -> Self {
        Self {
            discount,
            extra: SmallVec::new(),
        }
    }

    /// Add a custom metric (use rarely)
    pub fn with_extra(mut self, key: &'static str, value: f32) -> Self {
        self.extra.push((key, value));
        self
    }

    /// Get a value by key (including the discount)
    pub fn get(&self, key: &str) -> Option<f32> {
        match key {
            "discount" => Some(self.discount),
            _ => self.extra.iter().find(|(k, _)| k == &key).map(|(_, v)| *v),
        }
    }
}

/// Result of a single environment transition
#[derive(Clone, Debug)]
pub struct Transition<S> {
    /// Observation derived from the new state
    pub obs: ArrayD<f32>,
    /// The replacement state (the previous state is never mutated)
    pub state: S,
    /// Reward received
    pub reward: f32,
    /// Whether the episode has terminated
    pub done: bool,
    /// Additional info
    pub info: StepInfo,
}

/// Projection of a state onto named numeric fields.
///
/// Scalar fields are encoded as shape-`[1]` arrays; grid fields keep their
/// shape. The same encoding serves two purposes: `Dict` state-space
/// containment checks and field-by-field comparison in the parity harness.
pub trait StateFields {
    fn fields(&self) -> HashMap<String, ArrayD<f32>>;
}

/// Encode a scalar state field as a shape-`[1]` array
pub fn scalar_field(value: f32) -> ArrayD<f32> {
    ArrayD::from_elem(IxDyn(&[1]), value)
}

/// Core trait for functional environments.
///
/// Every environment is a pure value: `reset` and `step` take an explicit
/// [`Key`] and an explicit state, and return a wholly new state. Identical
/// `(key, state, action)` inputs always produce identical outputs. Episode
/// termination is a pure predicate of the state alone, with no hidden
/// counters on the environment value.
///
/// # Example
///
/// ```rust,ignore
/// use puregym::prelude::*;
///
/// let env = MyEnv::new()?;
/// let (obs, mut state) = env.reset(Key::from_seed(0))?;
/// let t = env.step(Key::from_seed(1), &state, 2)?;
/// assert_eq!(t.done, env.is_terminal(&t.state));
/// ```
pub trait Environment {
    /// Explicitly threaded episode state
    type State: Clone + StateFields;

    /// Environment name
    fn name(&self) -> &'static str;

    /// Sample an initial state and its observation
    ///
    /// The key is the sole entropy source; repeated calls with fresh keys
    /// are idempotent in distribution.
    fn reset(&self, key: Key) -> Result<(ArrayD<f32>, Self::State)>;

    /// Perform a single state transition
    ///
    /// # Returns
    /// A [`Transition`] holding the observation, replacement state, reward,
    /// termination flag, and info diagnostics.
    fn step(&self, key: Key, state: &Self::State, action: usize) -> Result<Transition<Self::State>>;

    /// Project a state to its observation
    fn get_obs(&self, state: &Self::State) -> ArrayD<f32>;

    /// Whether the state is terminal; pure in the state
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Discount factor for the state
    fn discount(&self, state: &Self::State) -> f32 {
        if self.is_terminal(state) {
            0.0
        } else {
            1.0
        }
    }

    /// Action space descriptor
    fn action_space(&self) -> Discrete;

    /// Observation space descriptor
    fn observation_space(&self) -> BoxSpace;

    /// State space descriptor over the named state fields
    fn state_space(&self) -> Dict;

    /// `reset` with the produced observation validated against
    /// [`Environment::observation_space`]
    ///
    /// A shape mismatch is reported as an error at this boundary rather than
    /// silently reshaped.
    fn reset_checked(&self, key: Key) -> Result<(ArrayD<f32>, Self::State)> {
        let (obs, state) = self.reset(key)?;
        check_obs_shape(&obs, &self.observation_space())?;
        Ok((obs, state))
    }

    /// `step` with the action validated up front and the produced observation
    /// validated against [`Environment::observation_space`]
    fn step_checked(
        &self,
        key: Key,
        state: &Self::State,
        action: usize,
    ) -> Result<Transition<Self::State>> {
        let actions = self.action_space();
        if !actions.contains(&action) {
            return Err(GymError::InvalidAction(format!(
                "action {} out of range for {} ({} actions)",
                action,
                self.name(),
                actions.n
            )));
        }
        let transition = self.step(key, state, action)?;
        check_obs_shape(&transition.obs, &self.observation_space())?;
        Ok(transition)
    }
}

fn check_obs_shape(obs: &ArrayD<f32>, space: &BoxSpace) -> Result<()> {
    if obs.shape() != space.shape() {
        return Err(GymError::ShapeMismatch {
            expected: space.shape().to_vec(),
            actual: obs.shape().to_vec(),
        });
    }
    Ok(())
}
