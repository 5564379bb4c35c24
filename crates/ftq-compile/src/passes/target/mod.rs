//! Passes that move a circuit toward the Clifford+T gate set.
//!
//! These passes know about the target gates: they expand multi-qubit gates
//! into CX form and snap Z rotations onto the discrete π/4 grid.

pub mod retarget;
pub mod rounding;

pub use retarget::MultiQubitRetarget;
pub use rounding::{
    DEFAULT_SYNTHESIS_EPSILON, ROUNDING_TABLE, RoundToDiscreteZ, RoundedRotation, check_angle,
};
