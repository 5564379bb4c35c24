//! FTQ Clifford+T Compilation Framework
//!
//! This crate compiles quantum circuits into the gate set of an
//! error-corrected machine: Clifford gates plus T. It is built from
//! rewrite rules and passes over [`ftq_ir::CircuitDag`].
//!
//! # Overview
//!
//! Compilation runs as a pipeline of passes sharing a [`PropertySet`]:
//! 1. **Retargeting**: Expand multi-qubit gates into CX and single-qubit gates
//! 2. **Partitioning**: Group gates into small blocks
//! 3. **Resynthesis**: Rewrite each single-qubit block as `Rz·SX·Rz·SX·Rz`
//! 4. **Replacement**: Swap blocks equal to a Clifford+T gate for that gate
//! 5. **Rounding**: Turn Z rotations at multiples of π/4 into T, S and Z
//!
//! # Architecture
//!
//! ```text
//! Input Circuit
//!       │
//!       ▼
//! ┌─────────────┐
//! │  Workflow   │ ◄── WorkflowConfig (level, epsilon, block sizes)
//! └─────────────┘
//!       │
//!       ├── MultiQubitRetarget
//!       ├── QuickPartitioner / GroupSingleQubitGates
//!       ├── ForEachBlock [ ZxzxzDecomposition | ReplacementRule | ScanningGateRemoval ]
//!       ├── RoundToDiscreteZ
//!       └── GateSetVerification / LogErrorPass
//!       │
//!       ▼
//! Output Circuit (Clifford+T, possibly with unroundable Rz)
//! ```
//!
//! # Example: Compiling a circuit
//!
//! ```rust
//! use ftq_compile::{CliffordTModel, passes::GateSetReport};
//! use ftq_ir::{Circuit, QubitId};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::with_size("example", 2, 0);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.rz(PI / 4.0, QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let model = CliffordTModel::new(2).unwrap();
//! let mut dag = circuit.into_dag();
//! let props = model.compile(&mut dag, 1).unwrap();
//!
//! assert!(props.get::<GateSetReport>().unwrap().is_fault_tolerant());
//! assert!(!dag.count_ops().contains_key("rz"));
//! ```
//!
//! # Rewrite rules
//!
//! A [`rules::ReplacementRule`] pairs a match indicator with a fragment.
//! Rules are passes, so they run on whole circuits or inside
//! [`passes::ForEachBlock`]:
//!
//! ```rust
//! use ftq_compile::rules::{ReplacementOutcome, ReplacementRule, construct_unitary_match_rule};
//! use ftq_ir::{CircuitDag, Instruction, QubitId, StandardGate, UnitaryMatrix};
//! use std::f64::consts::PI;
//!
//! let rule = ReplacementRule::new(
//!     construct_unitary_match_rule(UnitaryMatrix::x()),
//!     StandardGate::X,
//! )
//! .unwrap();
//!
//! let mut region = CircuitDag::with_qubits(1);
//! region
//!     .apply(Instruction::single_qubit_gate(StandardGate::Rx(PI), QubitId(0)))
//!     .unwrap();
//! assert_eq!(rule.apply(&mut region).unwrap(), ReplacementOutcome::Replaced);
//! ```
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to create custom compilation passes:
//!
//! ```rust
//! use ftq_compile::{Pass, PassKind, CompileResult, PropertySet};
//! use ftq_ir::CircuitDag;
//!
//! struct MyCustomPass;
//!
//! impl Pass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!     fn kind(&self) -> PassKind { PassKind::Transformation }
//!
//!     fn run(&self, dag: &mut CircuitDag, props: &mut PropertySet) -> CompileResult<()> {
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod gate_set;
pub mod manager;
pub mod model;
pub mod pass;
pub mod property;
pub mod rules;
pub mod unitary;
pub mod workflow;

// Built-in passes
pub mod passes;

pub use error::{CompileError, CompileResult};
pub use gate_set::FaultTolerantGateSet;
pub use manager::{PassManager, PassManagerBuilder};
pub use model::{CliffordTModel, FaultTolerantModel};
pub use pass::{Pass, PassKind};
pub use property::PropertySet;
pub use unitary::EulerAngles;
pub use workflow::{TargetKind, Workflow, WorkflowConfig, WorkflowRegistry};
