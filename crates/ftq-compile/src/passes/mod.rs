//! Built-in compilation passes.
//!
//! Passes are organized into two categories:
//! - [`agnostic`]: passes that operate on circuit structure and unitaries
//! - [`target`]: passes that rewrite toward the Clifford+T gate set

pub mod agnostic;
pub mod target;

pub use agnostic::{
    ApproximationError, BlockSynthesis, CaptureTargetUnitary, ForEachBlock, GateSetReport,
    GateSetVerification, GroupSingleQubitGates, LogErrorPass, QuickPartitioner,
    ScanningGateRemoval, SynthesisEngine, TargetUnitary, UnfoldPass, ZxzxzDecomposition,
    single_qubit_filter,
};
pub use target::{MultiQubitRetarget, RoundToDiscreteZ};
