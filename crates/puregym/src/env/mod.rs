//! Environment traits and transition records.
//!
//! Provides the core [`Environment`] trait that all environments implement,
//! plus the [`Transition`] record returned from steps and the [`StateFields`]
//! projection used for state-space containment and parity comparison.

mod traits;

pub use traits::{scalar_field, Environment, StateFields, StepInfo, Transition};
