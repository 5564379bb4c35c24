//! High-level circuit builder API.

use crate::dag::CircuitDag;
use crate::error::IrResult;
use crate::gate::{Gate, StandardGate};
use crate::instruction::Instruction;
use crate::qubit::{ClbitId, QubitId};
use crate::unitary::{HasUnitary, UnitaryMatrix};

/// A quantum circuit.
///
/// This provides a high-level API for building quantum circuits,
/// with convenient methods for common gates and operations.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// The underlying DAG representation.
    dag: CircuitDag,
    /// Counter for generating qubit IDs.
    next_qubit_id: u32,
    /// Counter for generating classical bit IDs.
    next_clbit_id: u32,
}

macro_rules! single_qubit_gates {
    ($($(#[$doc:meta])* $method:ident => $gate:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
                self.dag
                    .apply(Instruction::single_qubit_gate(StandardGate::$gate, qubit))?;
                Ok(self)
            }
        )*
    };
}

macro_rules! rotation_gates {
    ($($(#[$doc:meta])* $method:ident => $gate:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
                self.dag
                    .apply(Instruction::single_qubit_gate(StandardGate::$gate(theta), qubit))?;
                Ok(self)
            }
        )*
    };
}

macro_rules! two_qubit_gates {
    ($($(#[$doc:meta])* $method:ident => $gate:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
                self.dag
                    .apply(Instruction::two_qubit_gate(StandardGate::$gate, q1, q2))?;
                Ok(self)
            }
        )*
    };
}

macro_rules! two_qubit_rotations {
    ($($(#[$doc:meta])* $method:ident => $gate:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
                self.dag
                    .apply(Instruction::two_qubit_gate(StandardGate::$gate(theta), q1, q2))?;
                Ok(self)
            }
        )*
    };
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dag: CircuitDag::new(),
            next_qubit_id: 0,
            next_clbit_id: 0,
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.dag.add_qubit(id);
        id
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.next_clbit_id);
        self.next_clbit_id += 1;
        self.dag.add_clbit(id);
        id
    }

    single_qubit_gates! {
        /// Apply identity gate.
        id => I;
        /// Apply Hadamard gate.
        h => H;
        /// Apply Pauli-X gate.
        x => X;
        /// Apply Pauli-Y gate.
        y => Y;
        /// Apply Pauli-Z gate.
        z => Z;
        /// Apply S gate.
        s => S;
        /// Apply S-dagger gate.
        sdg => Sdg;
        /// Apply T gate.
        t => T;
        /// Apply T-dagger gate.
        tdg => Tdg;
        /// Apply sqrt(X) gate.
        sx => SX;
        /// Apply sqrt(X)-dagger gate.
        sxdg => SXdg;
    }

    rotation_gates! {
        /// Apply Rx rotation.
        rx => Rx;
        /// Apply Ry rotation.
        ry => Ry;
        /// Apply Rz rotation.
        rz => Rz;
        /// Apply phase gate.
        p => P;
    }

    /// Apply U gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::single_qubit_gate(
            StandardGate::U(theta, phi, lambda),
            qubit,
        ))?;
        Ok(self)
    }

    two_qubit_gates! {
        /// Apply CNOT gate (control first).
        cx => CX;
        /// Apply controlled-Y gate.
        cy => CY;
        /// Apply controlled-Z gate.
        cz => CZ;
        /// Apply controlled-Hadamard gate.
        ch => CH;
        /// Apply SWAP gate.
        swap => Swap;
        /// Apply iSWAP gate.
        iswap => ISwap;
    }

    two_qubit_rotations! {
        /// Apply controlled-Rx gate.
        crx => CRx;
        /// Apply controlled-Ry gate.
        cry => CRy;
        /// Apply controlled-Rz gate.
        crz => CRz;
        /// Apply controlled-phase gate.
        cp => CP;
        /// Apply XX rotation.
        rxx => RXX;
        /// Apply YY rotation.
        ryy => RYY;
        /// Apply ZZ rotation.
        rzz => RZZ;
    }

    /// Apply Toffoli gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::gate(StandardGate::CCX, [c1, c2, target]))?;
        Ok(self)
    }

    /// Apply Fredkin gate.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::gate(StandardGate::CSwap, [control, t1, t2]))?;
        Ok(self)
    }

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Reset a qubit.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::reset(qubit))?;
        Ok(self)
    }

    /// Apply a barrier.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.dag.num_qubits()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.dag.num_clbits()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Consume the circuit and return the DAG.
    pub fn into_dag(self) -> CircuitDag {
        self.dag
    }

    /// Create a circuit from a DAG.
    pub fn from_dag(dag: CircuitDag) -> Self {
        let next_qubit_id = dag.qubits().last().map_or(0, |q| q.0 + 1);
        let next_clbit_id = dag.clbits().last().map_or(0, |c| c.0 + 1);
        Self {
            name: "circuit".into(),
            dag,
            next_qubit_id,
            next_clbit_id,
        }
    }

    // ---- Pre-built circuits ----

    /// Create a Bell state preparation circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 0);
        circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
        Ok(circuit)
    }

    /// Create a GHZ state preparation circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("ghz", n, 0);
        if n == 0 {
            return Ok(circuit);
        }
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        Ok(circuit)
    }

    /// Create a QFT circuit (without measurements).
    pub fn qft(n: u32) -> IrResult<Self> {
        use std::f64::consts::PI;

        let mut circuit = Self::with_size("qft", n, 0);
        for i in 0..n {
            circuit.h(QubitId(i))?;
            for j in (i + 1)..n {
                let angle = PI / f64::from(1u32 << (j - i));
                circuit.cp(angle, QubitId(j), QubitId(i))?;
            }
        }
        for i in 0..n / 2 {
            circuit.swap(QubitId(i), QubitId(n - 1 - i))?;
        }
        Ok(circuit)
    }
}

impl HasUnitary for Circuit {
    fn unitary(&self) -> IrResult<UnitaryMatrix> {
        self.dag.unitary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("fluent", 3, 1);
        circuit
            .h(QubitId(0))
            .unwrap()
            .rz(0.5, QubitId(1))
            .unwrap()
            .ccx(QubitId(0), QubitId(1), QubitId(2))
            .unwrap()
            .measure(QubitId(2), ClbitId(0))
            .unwrap();
        assert_eq!(circuit.dag().num_ops(), 4);
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_bell_unitary() {
        let bell = Circuit::bell().unwrap();
        let u = bell.unitary().unwrap();
        // |00⟩ → (|00⟩ + |11⟩)/√2
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!((u.get(0, 0).re - s).abs() < 1e-12);
        assert!((u.get(3, 0).re - s).abs() < 1e-12);
        assert!(u.get(1, 0).norm() < 1e-12);
    }

    #[test]
    fn test_ghz_and_qft_sizes() {
        let ghz = Circuit::ghz(4).unwrap();
        assert_eq!(ghz.dag().num_ops(), 4);
        let qft = Circuit::qft(3).unwrap();
        assert_eq!(qft.dag().count_ops()["cp"], 3);
        assert!(qft.unitary().unwrap().is_unitary(1e-10));
    }

    #[test]
    fn test_from_dag_continues_ids() {
        let dag = CircuitDag::with_qubits(2);
        let mut circuit = Circuit::from_dag(dag);
        assert_eq!(circuit.add_qubit(), QubitId(2));
    }
}
