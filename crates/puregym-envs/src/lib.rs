//! Built-in environments for PureGym.
//!
//! Functional environments:
//! - [`ImageBandit`] - contextual bandit over an image-classification dataset
//! - [`Breakout`] - MinAtar-style paddle/ball/brick clone
//! - [`Asterix`] - MinAtar-style dodge-and-collect clone
//!
//! Each comes with a mutable ground-truth twin under [`reference`], driven by
//! the parity suites in `tests/` through shared random keys.

pub mod action_map;
pub mod asterix;
pub mod breakout;
pub mod dataset;
pub mod image_bandit;
pub mod reference;

pub use asterix::{Asterix, AsterixState, Entity};
pub use breakout::{Breakout, BreakoutState};
pub use dataset::ImageDataset;
pub use image_bandit::{BanditState, ImageBandit};
