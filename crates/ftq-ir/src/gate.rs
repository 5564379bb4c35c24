//! Quantum gate types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::unitary::{HasUnitary, UnitaryMatrix};

/// Standard gates with known semantics.
///
/// Parameters are concrete angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate.
    P(f64),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    ISwap,
    /// Controlled rotation around X.
    CRx(f64),
    /// Controlled rotation around Y.
    CRy(f64),
    /// Controlled rotation around Z.
    CRz(f64),
    /// Controlled phase gate.
    CP(f64),
    /// XX rotation gate.
    RXX(f64),
    /// YY rotation gate.
    RYY(f64),
    /// ZZ rotation gate.
    RZZ(f64),

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(..) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RYY(_) => "ryy",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U(..) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::RXX(_)
            | StandardGate::RYY(_)
            | StandardGate::RZZ(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Continuous parameters of this gate.
    pub fn params(&self) -> Vec<f64> {
        match *self {
            StandardGate::Rx(t)
            | StandardGate::Ry(t)
            | StandardGate::Rz(t)
            | StandardGate::P(t)
            | StandardGate::CRx(t)
            | StandardGate::CRy(t)
            | StandardGate::CRz(t)
            | StandardGate::CP(t)
            | StandardGate::RXX(t)
            | StandardGate::RYY(t)
            | StandardGate::RZZ(t) => vec![t],
            StandardGate::U(theta, phi, lambda) => vec![theta, phi, lambda],
            _ => vec![],
        }
    }

    /// Number of continuous parameters.
    #[inline]
    pub fn num_params(&self) -> usize {
        match self {
            StandardGate::U(..) => 3,
            StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::RXX(_)
            | StandardGate::RYY(_)
            | StandardGate::RZZ(_) => 1,
            _ => 0,
        }
    }

    /// Check if this gate has continuous parameters.
    #[inline]
    pub fn is_parameterized(&self) -> bool {
        self.num_params() > 0
    }

    /// The rotation angle if this gate is a rotation about Z.
    #[inline]
    pub fn as_z_rotation(&self) -> Option<f64> {
        match *self {
            StandardGate::Rz(theta) => Some(theta),
            _ => None,
        }
    }

    /// The inverse gate, if it is itself a standard gate.
    pub fn inverse(&self) -> Option<StandardGate> {
        let inv = match *self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::SX => StandardGate::SXdg,
            StandardGate::SXdg => StandardGate::SX,
            StandardGate::Rx(t) => StandardGate::Rx(-t),
            StandardGate::Ry(t) => StandardGate::Ry(-t),
            StandardGate::Rz(t) => StandardGate::Rz(-t),
            StandardGate::P(t) => StandardGate::P(-t),
            StandardGate::U(theta, phi, lambda) => StandardGate::U(-theta, -lambda, -phi),
            StandardGate::CRx(t) => StandardGate::CRx(-t),
            StandardGate::CRy(t) => StandardGate::CRy(-t),
            StandardGate::CRz(t) => StandardGate::CRz(-t),
            StandardGate::CP(t) => StandardGate::CP(-t),
            StandardGate::RXX(t) => StandardGate::RXX(-t),
            StandardGate::RYY(t) => StandardGate::RYY(-t),
            StandardGate::RZZ(t) => StandardGate::RZZ(-t),
            StandardGate::ISwap => return None,
            self_inverse => self_inverse,
        };
        Some(inv)
    }

    /// The unitary matrix of this gate.
    ///
    /// For controlled gates the control is the first qubit.
    pub fn matrix(&self) -> UnitaryMatrix {
        use std::f64::consts::PI;

        match *self {
            StandardGate::I => UnitaryMatrix::identity(1),
            StandardGate::X => UnitaryMatrix::x(),
            StandardGate::Y => UnitaryMatrix::y(),
            StandardGate::Z => UnitaryMatrix::z(),
            StandardGate::H => UnitaryMatrix::h(),
            StandardGate::S => UnitaryMatrix::phase(PI / 2.0),
            StandardGate::Sdg => UnitaryMatrix::phase(-PI / 2.0),
            StandardGate::T => UnitaryMatrix::phase(PI / 4.0),
            StandardGate::Tdg => UnitaryMatrix::phase(-PI / 4.0),
            StandardGate::SX => UnitaryMatrix::sx(),
            StandardGate::SXdg => UnitaryMatrix::sx().dagger(),
            StandardGate::Rx(t) => UnitaryMatrix::rx(t),
            StandardGate::Ry(t) => UnitaryMatrix::ry(t),
            StandardGate::Rz(t) => UnitaryMatrix::rz(t),
            StandardGate::P(t) => UnitaryMatrix::phase(t),
            StandardGate::U(theta, phi, lambda) => UnitaryMatrix::u(theta, phi, lambda),
            StandardGate::CX => UnitaryMatrix::cx(),
            StandardGate::CY => UnitaryMatrix::controlled(&UnitaryMatrix::y()),
            StandardGate::CZ => UnitaryMatrix::controlled(&UnitaryMatrix::z()),
            StandardGate::CH => UnitaryMatrix::controlled(&UnitaryMatrix::h()),
            StandardGate::Swap => UnitaryMatrix::swap(),
            StandardGate::ISwap => UnitaryMatrix::iswap(),
            StandardGate::CRx(t) => UnitaryMatrix::controlled(&UnitaryMatrix::rx(t)),
            StandardGate::CRy(t) => UnitaryMatrix::controlled(&UnitaryMatrix::ry(t)),
            StandardGate::CRz(t) => UnitaryMatrix::controlled(&UnitaryMatrix::rz(t)),
            StandardGate::CP(t) => UnitaryMatrix::controlled(&UnitaryMatrix::phase(t)),
            StandardGate::RXX(t) => UnitaryMatrix::pauli_pair_rotation(&UnitaryMatrix::x(), t),
            StandardGate::RYY(t) => UnitaryMatrix::pauli_pair_rotation(&UnitaryMatrix::y(), t),
            StandardGate::RZZ(t) => UnitaryMatrix::pauli_pair_rotation(&UnitaryMatrix::z(), t),
            StandardGate::CCX => UnitaryMatrix::ccx(),
            StandardGate::CSwap => UnitaryMatrix::cswap(),
        }
    }
}

impl HasUnitary for StandardGate {
    fn unitary(&self) -> IrResult<UnitaryMatrix> {
        Ok(self.matrix())
    }
}

/// A user-defined gate given by its matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// Name of the gate.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: u32,
    /// Continuous parameters the matrix was generated from.
    pub params: Vec<f64>,
    /// Row-major unitary matrix, if known.
    pub matrix: Option<Vec<Complex64>>,
}

impl CustomGate {
    /// Create a new custom gate without a matrix.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            params: vec![],
            matrix: None,
        }
    }

    /// Create a custom gate from a unitary.
    pub fn from_unitary(name: impl Into<String>, unitary: &UnitaryMatrix) -> Self {
        Self {
            name: name.into(),
            num_qubits: unitary.num_qubits(),
            params: vec![],
            matrix: Some(unitary.as_array().iter().copied().collect()),
        }
    }
}

/// A named block of instructions acting on local qubits `0..num_qubits`.
///
/// Composite gates are how partitioning passes carve a circuit into
/// regions: each block is a self-contained sub-circuit that can be analysed,
/// rewritten and later unfolded back into its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeGate {
    /// Name of the block.
    pub name: String,
    /// Number of local qubits.
    pub num_qubits: u32,
    /// Instructions over local qubits, in execution order.
    pub instructions: Vec<Instruction>,
    /// Global phase of the block.
    pub global_phase: f64,
}

impl CompositeGate {
    /// Create a composite gate, checking that every instruction stays
    /// inside the block.
    pub fn new(
        name: impl Into<String>,
        num_qubits: u32,
        instructions: Vec<Instruction>,
    ) -> IrResult<Self> {
        let name = name.into();
        for inst in &instructions {
            if let Some(&q) = inst.qubits.iter().find(|q| q.0 >= num_qubits) {
                return Err(IrError::QubitNotFound {
                    qubit: q,
                    gate_name: Some(name),
                });
            }
        }
        Ok(Self {
            name,
            num_qubits,
            instructions,
            global_phase: 0.0,
        })
    }

    /// Set the global phase of the block.
    #[must_use]
    pub fn with_global_phase(mut self, phase: f64) -> Self {
        self.global_phase = phase;
        self
    }

    /// Recursively expand nested blocks.
    ///
    /// Returns primitive instructions over local qubits and the total phase
    /// accumulated from this block and everything nested inside it.
    pub fn flatten(&self) -> (Vec<Instruction>, f64) {
        let mut out = Vec::with_capacity(self.instructions.len());
        let mut phase = self.global_phase;
        for inst in &self.instructions {
            match inst.as_gate().map(|g| &g.kind) {
                Some(GateKind::Composite(inner)) => {
                    let (nested, nested_phase) = inner.flatten();
                    phase += nested_phase;
                    out.extend(nested.into_iter().map(|n| n.remapped(&inst.qubits)));
                }
                _ => out.push(inst.clone()),
            }
        }
        (out, phase)
    }
}

/// The kind of gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate.
    Standard(StandardGate),
    /// A custom gate.
    Custom(CustomGate),
    /// A block of instructions.
    Composite(CompositeGate),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Custom(g) => &g.name,
            GateKind::Composite(g) => &g.name,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::Custom(g) => g.num_qubits,
            GateKind::Composite(g) => g.num_qubits,
        }
    }
}

/// A quantum gate with optional label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    pub label: Option<String>,
}

impl Gate {
    /// Create a gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
        }
    }

    /// Create a gate from a custom gate.
    pub fn custom(gate: CustomGate) -> Self {
        Self {
            kind: GateKind::Custom(gate),
            label: None,
        }
    }

    /// Create a gate from a block of instructions.
    pub fn composite(gate: CompositeGate) -> Self {
        Self {
            kind: GateKind::Composite(gate),
            label: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the name of the gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }

    /// The standard gate, if this is one.
    #[inline]
    pub fn as_standard(&self) -> Option<&StandardGate> {
        match &self.kind {
            GateKind::Standard(g) => Some(g),
            _ => None,
        }
    }

    /// The block, if this is a composite gate.
    #[inline]
    pub fn as_composite(&self) -> Option<&CompositeGate> {
        match &self.kind {
            GateKind::Composite(g) => Some(g),
            _ => None,
        }
    }

    /// Number of continuous parameters, counting through blocks.
    pub fn num_params(&self) -> usize {
        match &self.kind {
            GateKind::Standard(g) => g.num_params(),
            GateKind::Custom(g) => g.params.len(),
            GateKind::Composite(g) => g.instructions.iter().map(Instruction::num_params).sum(),
        }
    }

    /// The rotation angle if this gate is a rotation about Z.
    pub fn as_z_rotation(&self) -> Option<f64> {
        self.as_standard().and_then(StandardGate::as_z_rotation)
    }

    /// The inverse of this gate.
    pub fn inverse(&self) -> IrResult<Gate> {
        let kind = match &self.kind {
            GateKind::Standard(g) => GateKind::Standard(
                g.inverse()
                    .ok_or_else(|| IrError::NoInverse(g.name().to_string()))?,
            ),
            GateKind::Custom(g) => {
                let inverse = self.unitary()?.dagger();
                GateKind::Custom(CustomGate::from_unitary(format!("{}_dg", g.name), &inverse))
            }
            GateKind::Composite(g) => {
                let mut instructions = Vec::with_capacity(g.instructions.len());
                for inst in g.instructions.iter().rev() {
                    instructions.push(inst.inverse()?);
                }
                GateKind::Composite(CompositeGate {
                    name: format!("{}_dg", g.name),
                    num_qubits: g.num_qubits,
                    instructions,
                    global_phase: -g.global_phase,
                })
            }
        };
        Ok(Gate { kind, label: None })
    }
}

impl HasUnitary for Gate {
    fn unitary(&self) -> IrResult<UnitaryMatrix> {
        match &self.kind {
            GateKind::Standard(g) => Ok(g.matrix()),
            GateKind::Custom(g) => {
                let elements = g
                    .matrix
                    .as_ref()
                    .ok_or_else(|| IrError::MissingMatrix(g.name.clone()))?;
                UnitaryMatrix::from_row_major(g.num_qubits, elements)
            }
            GateKind::Composite(g) => {
                let mut acc = UnitaryMatrix::identity(g.num_qubits);
                for inst in &g.instructions {
                    let positions: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
                    acc = acc.apply_on(&inst.unitary()?, &positions)?;
                }
                Ok(acc.with_global_phase(g.global_phase))
            }
        }
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::custom(gate)
    }
}

impl From<CompositeGate> for Gate {
    fn from(gate: CompositeGate) -> Self {
        Gate::composite(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubit::QubitId;
    use std::f64::consts::PI;

    const TOL: f64 = 1e-12;

    const ALL_FIXED: [StandardGate; 20] = [
        StandardGate::I,
        StandardGate::X,
        StandardGate::Y,
        StandardGate::Z,
        StandardGate::H,
        StandardGate::S,
        StandardGate::Sdg,
        StandardGate::T,
        StandardGate::Tdg,
        StandardGate::SX,
        StandardGate::SXdg,
        StandardGate::CX,
        StandardGate::CY,
        StandardGate::CZ,
        StandardGate::CH,
        StandardGate::Swap,
        StandardGate::ISwap,
        StandardGate::CCX,
        StandardGate::CSwap,
        StandardGate::U(0.4, 1.3, -0.2),
    ];

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.name(), "h");
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert!(!StandardGate::H.is_parameterized());

        assert_eq!(StandardGate::CX.name(), "cx");
        assert_eq!(StandardGate::CX.num_qubits(), 2);

        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::U(1.0, 2.0, 3.0).params(), vec![1.0, 2.0, 3.0]);
        assert_eq!(StandardGate::Rz(0.5).num_params(), 1);
    }

    #[test]
    fn test_matrix_dimensions_match_arity() {
        for gate in ALL_FIXED {
            assert_eq!(gate.matrix().num_qubits(), gate.num_qubits(), "{}", gate.name());
            assert!(gate.matrix().is_unitary(TOL), "{}", gate.name());
        }
    }

    #[test]
    fn test_inverse_matrices() {
        for gate in ALL_FIXED
            .into_iter()
            .chain([StandardGate::Rz(0.3), StandardGate::RYY(1.1), StandardGate::CP(0.2)])
        {
            let Some(inv) = gate.inverse() else {
                assert_eq!(gate, StandardGate::ISwap);
                continue;
            };
            let prod = gate.matrix().dot(&inv.matrix()).unwrap();
            let id = UnitaryMatrix::identity(gate.num_qubits());
            assert!(prod.distance_from(&id) < TOL, "{}", gate.name());
        }
    }

    #[test]
    fn test_z_rotation_capability() {
        assert_eq!(StandardGate::Rz(0.25).as_z_rotation(), Some(0.25));
        assert_eq!(StandardGate::P(0.25).as_z_rotation(), None);
        assert_eq!(StandardGate::T.as_z_rotation(), None);
        assert_eq!(Gate::standard(StandardGate::Rz(1.0)).as_z_rotation(), Some(1.0));
    }

    #[test]
    fn test_t_squared_is_s() {
        let t = StandardGate::T.matrix();
        let tt = t.dot(&t).unwrap();
        assert!(tt.distance_from(&StandardGate::S.matrix()) < TOL);
        let rz = StandardGate::Rz(PI / 4.0).matrix();
        assert!(rz.distance_from(&t) < TOL);
    }

    #[test]
    fn test_custom_gate() {
        let gate = CustomGate::new("my_gate", 1);
        assert!(matches!(
            Gate::custom(gate).unitary(),
            Err(IrError::MissingMatrix(_))
        ));

        let from_x = CustomGate::from_unitary("blob", &UnitaryMatrix::x());
        let gate = Gate::custom(from_x);
        assert_eq!(gate.num_qubits(), 1);
        assert!(gate.unitary().unwrap().distance_from(&UnitaryMatrix::x()) < TOL);
        let inv = gate.inverse().unwrap();
        assert_eq!(inv.name(), "blob_dg");
    }

    #[test]
    fn test_composite_unitary_and_inverse() {
        let block = CompositeGate::new(
            "bell_prep",
            2,
            vec![
                Instruction::single_qubit_gate(StandardGate::H, QubitId(0)),
                Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)),
            ],
        )
        .unwrap()
        .with_global_phase(0.7);
        let gate = Gate::composite(block);
        let u = gate.unitary().unwrap();
        let expected = UnitaryMatrix::cx()
            .dot(&UnitaryMatrix::h().kron(&UnitaryMatrix::identity(1)))
            .unwrap()
            .with_global_phase(0.7);
        assert!((u.get(0, 0) - expected.get(0, 0)).norm() < TOL);
        assert!(u.distance_from(&expected) < TOL);

        let inv = gate.inverse().unwrap().unitary().unwrap();
        let prod = u.dot(&inv).unwrap();
        assert!((prod.get(0, 0) - Complex64::new(1.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn test_composite_rejects_out_of_range_qubit() {
        let result = CompositeGate::new(
            "bad",
            1,
            vec![Instruction::single_qubit_gate(StandardGate::X, QubitId(1))],
        );
        assert!(matches!(result, Err(IrError::QubitNotFound { .. })));
    }

    #[test]
    fn test_flatten_nested_blocks() {
        let inner = CompositeGate::new(
            "inner",
            1,
            vec![Instruction::single_qubit_gate(StandardGate::T, QubitId(0))],
        )
        .unwrap()
        .with_global_phase(0.25);
        let outer = CompositeGate::new(
            "outer",
            2,
            vec![
                Instruction::gate(inner, [QubitId(1)]),
                Instruction::single_qubit_gate(StandardGate::H, QubitId(0)),
            ],
        )
        .unwrap()
        .with_global_phase(0.5);
        let (flat, phase) = outer.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].qubits, vec![QubitId(1)]);
        assert_eq!(flat[0].name(), "t");
        assert!((phase - 0.75).abs() < TOL);
    }

    #[test]
    fn test_gate_serde() {
        let gate = Gate::standard(StandardGate::Rz(0.125)).with_label("r");
        let json = serde_json::to_string(&gate).unwrap();
        let back: Gate = serde_json::from_str(&json).unwrap();
        assert_eq!(gate, back);
    }
}
