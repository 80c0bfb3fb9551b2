//! # PureGym
//!
//! Functional reinforcement learning environments in Rust.
//!
//! ## Overview
//!
//! PureGym provides:
//! - A purely functional `Environment` trait: all mutable state is threaded
//!   explicitly through `reset`/`step`, and all randomness flows through
//!   splittable [`rng::Key`] values
//! - Observation, action, and state space descriptors with containment checks
//! - A parity harness for comparing a functional environment against a
//!   mutable ground-truth reference implementation step by step
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use puregym::prelude::*;
//! use puregym_envs::{ImageBandit, ImageDataset};
//!
//! let dataset = ImageDataset::synthetic(100, 28, 28, 10, Key::from_seed(0))?;
//! let env = ImageBandit::new(dataset, 1.0)?;
//!
//! let (obs, state) = env.reset(Key::from_seed(42))?;
//! let transition = env.step(Key::from_seed(43), &state, 3)?;
//! ```

pub mod env;
pub mod parity;
pub mod rng;
pub mod spaces;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::env::{scalar_field, Environment, StateFields, StepInfo, Transition};
    pub use crate::parity::{run_parity, ParityConfig, ParityError, ReferenceEnv};
    pub use crate::rng::Key;
    pub use crate::spaces::{Box as BoxSpace, Dict, Discrete, DynSpace, Space};
    pub use crate::{GymError, Result};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum GymError {
    #[error("Environment error: {0}")]
    EnvError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

pub type Result<T> = core::result::Result<T, GymError>;
