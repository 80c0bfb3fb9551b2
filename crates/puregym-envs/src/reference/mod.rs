//! Mutable ground-truth implementations.
//!
//! These are deliberately written in the classic mutable `&mut self` style:
//! each holds its own state and updates it in place. The parity suites drive
//! them alongside the functional environments with shared keys and assert
//! that both produce identical trajectories. They take the same explicit
//! [`puregym::rng::Key`] values so stochastic transitions consume the exact
//! draws the functional versions consume.

mod asterix;
mod bandit;
mod breakout;

pub use asterix::RefAsterix;
pub use bandit::RefBandit;
pub use breakout::RefBreakout;
