//! Circuit instructions combining gates with operands.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind, StandardGate};
use crate::qubit::{ClbitId, QubitId};
use crate::unitary::{HasUnitary, UnitaryMatrix};

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(Gate),
    /// Measurement operation.
    Measure,
    /// Reset qubit to |0⟩.
    Reset,
    /// Barrier (synchronization point).
    Barrier,
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<QubitId>,
    /// Classical bits this instruction operates on (for measure).
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate.into()),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Create a two-qubit gate instruction.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// Create a reset instruction.
    pub fn reset(qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::Reset,
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// Check if this is a block of instructions.
    pub fn is_composite(&self) -> bool {
        matches!(
            &self.kind,
            InstructionKind::Gate(Gate {
                kind: GateKind::Composite(_),
                ..
            })
        )
    }

    /// Get the gate if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
        }
    }

    /// Number of continuous gate parameters.
    pub fn num_params(&self) -> usize {
        self.as_gate().map_or(0, Gate::num_params)
    }

    /// Copy of this instruction with local qubit `i` renamed to `map[i]`.
    ///
    /// Qubits outside `map` are kept as they are.
    #[must_use]
    pub fn remapped(&self, map: &[QubitId]) -> Self {
        Self {
            kind: self.kind.clone(),
            qubits: self
                .qubits
                .iter()
                .map(|q| map.get(q.index()).copied().unwrap_or(*q))
                .collect(),
            clbits: self.clbits.clone(),
        }
    }

    /// The inverse operation on the same operands.
    pub fn inverse(&self) -> IrResult<Self> {
        let kind = match &self.kind {
            InstructionKind::Gate(g) => InstructionKind::Gate(g.inverse()?),
            InstructionKind::Barrier => InstructionKind::Barrier,
            InstructionKind::Measure | InstructionKind::Reset => {
                return Err(IrError::NonUnitary(self.name().to_string()));
            }
        };
        Ok(Self {
            kind,
            qubits: self.qubits.clone(),
            clbits: self.clbits.clone(),
        })
    }
}

impl HasUnitary for Instruction {
    /// Unitary over the instruction's own qubits, in operand order.
    fn unitary(&self) -> IrResult<UnitaryMatrix> {
        match &self.kind {
            InstructionKind::Gate(g) => g.unitary(),
            #[allow(clippy::cast_possible_truncation)]
            InstructionKind::Barrier => Ok(UnitaryMatrix::identity(self.qubits.len() as u32)),
            InstructionKind::Measure | InstructionKind::Reset => {
                Err(IrError::NonUnitary(self.name().to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        assert!(inst.is_gate());
        assert_eq!(inst.qubits.len(), 1);
        assert_eq!(inst.name(), "h");
        assert_eq!(inst.num_params(), 0);
    }

    #[test]
    fn test_measure_instruction() {
        let inst = Instruction::measure(QubitId(0), ClbitId(0));
        assert!(inst.is_measure());
        assert_eq!(inst.clbits.len(), 1);
        assert!(matches!(inst.unitary(), Err(IrError::NonUnitary(_))));
        assert!(inst.inverse().is_err());
    }

    #[test]
    fn test_barrier_is_identity() {
        let inst = Instruction::barrier([QubitId(0), QubitId(1)]);
        assert!(inst.is_barrier());
        assert_eq!(inst.unitary().unwrap().dim(), 4);
    }

    #[test]
    fn test_remapped() {
        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1));
        let moved = inst.remapped(&[QubitId(4), QubitId(2)]);
        assert_eq!(moved.qubits, vec![QubitId(4), QubitId(2)]);
        assert_eq!(moved.name(), "cx");
    }

    #[test]
    fn test_inverse_instruction() {
        let inst = Instruction::single_qubit_gate(StandardGate::T, QubitId(3));
        let inv = inst.inverse().unwrap();
        assert_eq!(inv.name(), "tdg");
        assert_eq!(inv.qubits, vec![QubitId(3)]);
    }
}
