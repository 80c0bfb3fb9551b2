//! Mutable reference implementation of the image bandit.

use std::collections::HashMap;

use ndarray::{ArrayD, IxDyn};
use rand::Rng;

use puregym::env::scalar_field;
use puregym::parity::ReferenceEnv;
use puregym::rng::Key;
use puregym::Result;

use crate::dataset::ImageDataset;

/// Ground-truth bandit: one image per episode, one guess, done
#[derive(Clone, Debug)]
pub struct RefBandit {
    dataset: ImageDataset,
    optimal_return: f32,
    correct_label: usize,
    regret: f32,
    time: u32,
    terminal: bool,
}

impl RefBandit {
    pub fn new(dataset: ImageDataset, fraction: f64) -> Result<Self> {
        let dataset = dataset.truncate(fraction)?;
        Ok(Self {
            dataset,
            optimal_return: 1.0,
            correct_label: 0,
            regret: 0.0,
            time: 0,
            terminal: false,
        })
    }
}

impl ReferenceEnv for RefBandit {
    fn reset(&mut self, key: Key) {
        let mut key = key;
        let idx = key.gen_range(0..self.dataset.len());
        self.correct_label = self.dataset.label(idx);
        self.regret = 0.0;
        self.time = 0;
        self.terminal = false;
    }

    fn act(&mut self, _key: Key, action: usize) -> (f32, bool) {
        if self.terminal {
            return (0.0, true);
        }
        let reward = if action == self.correct_label { 1.0 } else { -1.0 };
        self.regret += self.optimal_return - reward;
        self.time += 1;
        self.terminal = true;
        (reward, true)
    }

    fn obs(&self) -> ArrayD<f32> {
        let [h, w] = self.dataset.image_shape();
        ArrayD::zeros(IxDyn(&[h, w]))
    }

    fn terminal(&self) -> bool {
        self.terminal
    }

    fn state_fields(&self) -> HashMap<String, ArrayD<f32>> {
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
