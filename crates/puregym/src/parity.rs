//! Cross-implementation equivalence testing.
//!
//! Drives a functional [`Environment`] candidate and a mutable ground-truth
//! [`ReferenceEnv`] with matched random draws, and asserts that observations,
//! rewards, termination flags, and post-transition state fields agree within
//! tolerance. Both sides receive the same step key and consume draws in the
//! same order, so the two trajectories stay in lockstep and can be compared
//! directly at every step.
//!
//! Mismatches are fatal and carry the episode/step index (and the offending
//! field) so a failure localizes immediately.

use std::collections::HashMap;

use ndarray::ArrayD;

use crate::env::{Environment, StateFields};
use crate::rng::Key;
use crate::spaces::Space;
use crate::GymError;

/// Parity run configuration
#[derive(Clone, Copy, Debug)]
pub struct ParityConfig {
    /// Number of episodes to drive
    pub num_episodes: usize,
    /// Step budget per episode (episodes may end earlier)
    pub num_steps: usize,
    /// Absolute tolerance for numeric comparison
    pub tolerance: f32,
}

impl Default for ParityConfig {
    fn default() -> Self {
        Self {
            num_episodes: 10,
            num_steps: 100,
            tolerance: 1e-4,
        }
    }
}

/// Mutable ground-truth environment driven alongside the functional candidate.
///
/// References hold their own state and mutate it in place; they still take
/// explicit keys so stochastic transitions can consume exactly the draws the
/// candidate consumes.
pub trait ReferenceEnv {
    /// Reset in place using the given key
    fn reset(&mut self, key: Key);

    /// Apply one action; returns `(reward, done)`
    fn act(&mut self, key: Key, action: usize) -> (f32, bool);

    /// Observation projected from the current state
    fn obs(&self) -> ArrayD<f32>;

    /// Raw terminal flag of the current state
    fn terminal(&self) -> bool;

    /// Current state projected onto named fields, using the same encoding
    /// as [`StateFields`]
    fn state_fields(&self) -> HashMap<String, ArrayD<f32>>;
}

/// A detected divergence between candidate and reference
#[derive(Debug, thiserror::Error)]
pub enum ParityError {
    #[error("observation mismatch at episode {episode} step {step}: max delta {max_delta}")]
    Observation {
        episode: usize,
        step: usize,
        max_delta: f32,
    },

    #[error("reward mismatch at episode {episode} step {step}: candidate {candidate}, reference {reference}")]
    Reward {
        episode: usize,
        step: usize,
        candidate: f32,
        reference: f32,
    },

    #[error("termination mismatch at episode {episode} step {step}: candidate {candidate}, reference {reference}")]
    Termination {
        episode: usize,
        step: usize,
        candidate: bool,
        reference: bool,
    },

    #[error("state field `{field}` mismatch at episode {episode} step {step}: max delta {max_delta}")]
    StateField {
        episode: usize,
        step: usize,
        field: String,
        max_delta: f32,
    },

    #[error("state field `{field}` missing from {side} at episode {episode} step {step}")]
    MissingField {
        episode: usize,
        step: usize,
        field: String,
        side: &'static str,
    },

    #[error("environment error at episode {episode} step {step}: {source}")]
    Env {
        episode: usize,
        step: usize,
        #[source]
        source: GymError,
    },
}

/// Largest absolute element-wise difference; `None` on shape mismatch
fn max_abs_delta(a: &ArrayD<f32>, b: &ArrayD<f32>) -> Option<f32> {
    if a.shape() != b.shape() {
        return None;
    }
    Some(
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f32::max),
    )
}

/// Compare one transition's observation, reward, and termination flag
#[allow(clippy::too_many_arguments)]
pub fn check_transition(
    obs_candidate: &ArrayD<f32>,
    reward_candidate: f32,
    done_candidate: bool,
    obs_reference: &ArrayD<f32>,
    reward_reference: f32,
    done_reference: bool,
    tolerance: f32,
    episode: usize,
    step: usize,
) -> Result<(), ParityError> {
    let max_delta =
        max_abs_delta(obs_candidate, obs_reference).unwrap_or(f32::INFINITY);
    if max_delta > tolerance {
        return Err(ParityError::Observation {
            episode,
            step,
            max_delta,
        });
    }
    if (reward_candidate - reward_reference).abs() > tolerance {
        return Err(ParityError::Reward {
            episode,
            step,
            candidate: reward_candidate,
            reference: reward_reference,
        });
    }
    if done_candidate != done_reference {
        return Err(ParityError::Termination {
            episode,
            step,
            candidate: done_candidate,
            reference: done_reference,
        });
    }
    Ok(())
}

/// Compare two state projections field by field
pub fn check_state_fields(
    candidate: &HashMap<String, ArrayD<f32>>,
    reference: &HashMap<String, ArrayD<f32>>,
    tolerance: f32,
    episode: usize,
    step: usize,
) -> Result<(), ParityError> {
    for (field, value) in candidate {
        let other = reference.get(field).ok_or_else(|| ParityError::MissingField {
            episode,
            step,
            field: field.clone(),
            side: "reference",
        })?;
        let max_delta = max_abs_delta(value, other).unwrap_or(f32::INFINITY);
        if max_delta > tolerance {
            return Err(ParityError::StateField {
                episode,
                step,
                field: field.clone(),
                max_delta,
            });
        }
    }
    if let Some(field) = reference.keys().find(|k| !candidate.contains_key(*k)) {
        return Err(ParityError::MissingField {
            episode,
            step,
            field: field.clone(),
            side: "candidate",
        });
    }
    Ok(())
}

/// Drive candidate and reference for `num_episodes` x `num_steps` and compare
/// every transition.
///
/// `action_map` is a pure lookup from candidate action index to the
/// reference's action identifier. The episode root key splits into a reset
/// key shared by both sides, then per step into an action-sampling key and a
/// step key shared by both sides. Episodes break early on termination.
pub fn run_parity<E: Environment, R: ReferenceEnv>(
    env: &E,
    reference: &mut R,
    action_map: impl Fn(usize) -> usize,
    key: Key,
    config: &ParityConfig,
) -> Result<(), ParityError> {
    let action_space = env.action_space();
    let mut key = key;

    for episode in 0..config.num_episodes {
        let (next, key_reset) = key.split();
        key = next;

        reference.reset(key_reset.clone());
        let (_obs, mut state) = env.reset(key_reset).map_err(|source| ParityError::Env {
            episode,
            step: 0,
            source,
        })?;

        for step in 0..config.num_steps {
            let (next, key_step, key_action) = key.split3();
            key = next;

            let mut key_action = key_action;
            let action = action_space.sample(&mut key_action);
            let action_ref = action_map(action);

            let (reward_ref, done_ref) = reference.act(key_step.clone(), action_ref);
            let transition =
                env.step(key_step, &state, action)
                    .map_err(|source| ParityError::Env {
                        episode,
                        step,
                        source,
                    })?;

            check_transition(
                &transition.obs,
                transition.reward,
                transition.done,
                &reference.obs(),
                reward_ref,
                done_ref,
                config.tolerance,
                episode,
                step,
            )?;
            check_state_fields(
                &transition.state.fields(),
                &reference.state_fields(),
                config.tolerance,
                episode,
                step,
            )?;

            state = transition.state;
            if done_ref {
                break;
            }
        }
        tracing::debug!(episode, "parity episode passed");
    }
    Ok(())
}
