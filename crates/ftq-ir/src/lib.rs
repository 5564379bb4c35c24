//! FTQ Circuit Intermediate Representation
//!
//! This crate provides the circuit data structures the fault-tolerant
//! compiler rewrites: gates with exact unitaries, instructions, a DAG with
//! stable node handles, and a fluent builder.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`]
//! - **Gates**: [`StandardGate`] for built-in gates, [`CustomGate`] for
//!   matrix-defined operations and [`CompositeGate`] for blocks of
//!   instructions produced by partitioning
//! - **Unitaries**: [`UnitaryMatrix`] and the [`HasUnitary`] trait, with
//!   equality decided up to global phase by [`UnitaryMatrix::distance_from`]
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **DAG**: [`CircuitDag`] for the internal graph representation
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example: Rotation up to phase
//!
//! ```rust
//! use ftq_ir::{Circuit, HasUnitary, QubitId, StandardGate};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::with_size("rz", 1, 0);
//! circuit.rz(PI / 4.0, QubitId(0)).unwrap();
//!
//! // Rz(π/4) is the T gate up to a global phase.
//! let t = StandardGate::T.matrix();
//! assert!(circuit.unitary().unwrap().distance_from(&t) < 1e-12);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg` | 1 | S and S-dagger gates |
//! | `T`, `Tdg` | 1 | T and T-dagger gates |
//! | `SX`, `SXdg` | 1 | sqrt(X) and its inverse |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation and phase gates |
//! | `U` | 1 | Universal single-qubit gate U(θ,φ,λ) |
//! | `CX`, `CY`, `CZ`, `CH` | 2 | Controlled gates |
//! | `Swap`, `ISwap` | 2 | Swap gates |
//! | `CRx`, `CRy`, `CRz`, `CP` | 2 | Controlled rotations |
//! | `RXX`, `RYY`, `RZZ` | 2 | Two-qubit Pauli rotations |
//! | `CCX`, `CSwap` | 3 | Toffoli and Fredkin gates |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;
pub mod unitary;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{CompositeGate, CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
pub use unitary::{HasUnitary, UnitaryMatrix};
