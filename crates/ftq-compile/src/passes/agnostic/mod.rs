//! Target-agnostic passes.
//!
//! These passes only look at circuit structure and unitaries: partitioning
//! into blocks, per-block drivers, resynthesis, redundancy removal and the
//! analyses that bracket a compilation.

pub mod foreach;
pub mod partition;
pub mod scanning;
pub mod synthesis;
pub mod unfold;
pub mod verification;

pub use foreach::{BlockFilter, ForEachBlock, single_qubit_filter};
pub use partition::{BLOCK_NAME, GroupSingleQubitGates, QuickPartitioner};
pub use scanning::ScanningGateRemoval;
pub use synthesis::{BlockSynthesis, SynthesisEngine, ZxzxzDecomposition};
pub use unfold::UnfoldPass;
pub use verification::{
    ApproximationError, CaptureTargetUnitary, GateSetReport, GateSetVerification, LogErrorPass,
    TargetUnitary,
};
