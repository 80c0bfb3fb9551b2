//! Image-classification bandit environment.

use std::collections::HashMap;

use ndarray::{ArrayD, IxDyn};
use rand::Rng;

use puregym::env::{scalar_field, Environment, StateFields, StepInfo, Transition};
use puregym::rng::Key;
use puregym::spaces::{Box as BoxSpace, Dict, Discrete, DynSpace};
use puregym::{GymError, Result};

use crate::dataset::ImageDataset;

/// Contextual bandit over an image-classification dataset
///
/// `reset` presents a random image; the action is a label guess, rewarded +1
/// if correct and -1 otherwise. Every transition is terminal: episodes are
/// single-step by design, so there is no long-term credit assignment.
pub struct ImageBandit {
    dataset: ImageDataset,
    /// Best achievable per-episode return, used for regret accounting
    optimal_return: f32,
    max_steps_in_episode: u32,
}

/// Bandit episode state
#[derive(Clone, Debug, PartialEq)]
pub struct BanditState {
    pub correct_label: usize,
    /// Cumulative loss relative to the optimal return
    pub regret: f32,
    pub time: u32,
    pub terminal: bool,
}

impl StateFields for BanditState {
    fn fields(&self) -> HashMap<String, ArrayD<f32>> {
        HashMap::from([
            (
                "correct_label".to_string(),
                scalar_field(self.correct_label as f32),
            ),
            ("regret".to_string(), scalar_field(self.regret)),
            ("time".to_string(), scalar_field(self.time as f32)),
            (
                "terminal".to_string(),
                scalar_field(self.terminal as u8 as f32),
            ),
        ])
    }
}

impl ImageBandit {
    /// Create a bandit over the leading `fraction` of `dataset`
    ///
    /// Fails if `fraction` is outside `(0, 1]` or truncates the dataset to
    /// nothing.
    pub fn new(dataset: ImageDataset, fraction: f64) -> Result<Self> {
        let dataset = dataset.truncate(fraction)?;
        tracing::info!(
            num_data = dataset.len(),
            num_classes = dataset.num_classes(),
            "image bandit ready"
        );
        Ok(Self {
            dataset,
            optimal_return: 1.0,
            max_steps_in_episode: 1,
        })
    }

    fn zero_obs(&self) -> ArrayD<f32> {
        let [h, w] = self.dataset.image_shape();
        ArrayD::zeros(IxDyn(&[h, w]))
    }
}

impl Environment for ImageBandit {
    type State = BanditState;

    fn name(&self) -> &'static str {
        "ImageBandit"
    }

    fn reset(&self, key: Key) -> Result<(ArrayD<f32>, BanditState)> {
        let mut key = key;
        let idx = key.gen_range(0..self.dataset.len());
        let obs = self.dataset.normalized_image(idx);
        let state = BanditState {
            correct_label: self.dataset.label(idx),
            regret: 0.0,
            time: 0,
            terminal: false,
        };
        Ok((obs, state))
    }

    fn step(&self, _key: Key, state: &BanditState, action: usize) -> Result<Transition<BanditState>> {
        if action >= self.dataset.num_classes() {
            return Err(GymError::InvalidAction(format!(
                "label guess {} out of range for {} classes",
                action,
                self.dataset.num_classes()
            )));
        }

        let correct = action == state.correct_label;
        let reward = if correct { 1.0 } else { -1.0 };

        let mut next = BanditState {
            correct_label: state.correct_label,
            regret: state.regret + self.optimal_return - reward,
            time: state.time + 1,
            terminal: false,
        };
        next.terminal = self.is_terminal(&next);

        let info = StepInfo::new(self.discount(&next));
        Ok(Transition {
            obs: self.get_obs(&next),
            done: next.terminal,
            state: next,
            reward,
            info,
        })
    }

    fn get_obs(&self, _state: &BanditState) -> ArrayD<f32> {
        // The image is only ever shown by reset; every post-step observation
        // is the fixed zero array of image shape.
        self.zero_obs()
    }

    fn is_terminal(&self, _state: &BanditState) -> bool {
        // Every step transition is terminal: single-step episodes by design.
        true
    }

    fn action_space(&self) -> Discrete {
        Discrete::new(self.dataset.num_classes())
    }

    fn observation_space(&self) -> BoxSpace {
        let [h, w] = self.dataset.image_shape();
        BoxSpace::unit(&[h, w])
    }

    fn state_space(&self) -> Dict {
        Dict::from_pairs(vec![
            (
                "correct_label",
                DynSpace::Discrete(Discrete::new(self.dataset.num_classes())),
            ),
            ("regret", DynSpace::Box(BoxSpace::uniform(&[1], 0.0, 2.0))),
            (
                "time",
                DynSpace::Discrete(Discrete::new(self.max_steps_in_episode as usize + 1)),
            ),
            ("terminal", DynSpace::Discrete(Discrete::new(2))),
        ])
    }
}
