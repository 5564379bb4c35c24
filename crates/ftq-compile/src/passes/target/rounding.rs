//! Rounding of Z rotations onto the Clifford+T grid.

use std::f64::consts::{FRAC_PI_4, TAU};

use tracing::{debug, trace};

use ftq_ir::{CircuitDag, Instruction, NodeIndex, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Default tolerance for treating an angle as a multiple of π/4.
pub const DEFAULT_SYNTHESIS_EPSILON: f64 = 1e-8;

/// Gate sequence realizing the phase `k·π/4` for each residue `k` mod 8.
pub const ROUNDING_TABLE: [&[StandardGate]; 8] = [
    &[StandardGate::I],
    &[StandardGate::T],
    &[StandardGate::S],
    &[StandardGate::S, StandardGate::T],
    &[StandardGate::Z],
    &[StandardGate::Sdg, StandardGate::Tdg],
    &[StandardGate::Sdg],
    &[StandardGate::Tdg],
];

/// A Z rotation angle snapped to the nearest multiple of π/4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRotation {
    /// Multiple of π/4, reduced mod 8.
    pub residue: u8,
    /// The nearest multiple of π/4 to the input, without normalization.
    pub angle: f64,
    /// Distance around the circle between the input and the grid point.
    pub residual: f64,
}

impl RoundedRotation {
    /// The discrete gates equal to `P(angle)`.
    pub fn sequence(&self) -> &'static [StandardGate] {
        ROUNDING_TABLE[usize::from(self.residue)]
    }
}

/// Snap `angle` to a multiple of π/4 if it is within `epsilon` of one.
///
/// Input and grid point are both normalized into `[0, 2π)` and compared
/// by their distance around the circle, so any exact `k·π/4` has a zero
/// residual. Returns `None` when the residual exceeds `epsilon` or the
/// angle is not finite.
///
/// `epsilon` must be non-negative; [`RoundToDiscreteZ::new`] validates it.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn check_angle(angle: f64, epsilon: f64) -> Option<RoundedRotation> {
    debug_assert!(epsilon >= 0.0, "rounding tolerance must be non-negative");
    if !angle.is_finite() {
        return None;
    }
    let value = (angle / FRAC_PI_4).round();
    let grid = (value * FRAC_PI_4).rem_euclid(TAU);
    let gap = (angle.rem_euclid(TAU) - grid).abs();
    let residual = gap.min(TAU - gap);
    if residual > epsilon {
        return None;
    }
    Some(RoundedRotation {
        residue: value.rem_euclid(8.0) as u8,
        angle: value * FRAC_PI_4,
        residual,
    })
}

/// Replaces Z rotations at multiples of π/4 by discrete Clifford+T gates.
///
/// Rotations are visited latest cycle first, from a snapshot of node
/// handles taken before any edit. Each one is spliced in place and the
/// circuit's global phase absorbs the difference between `Rz(θ)` and
/// the phase gate `P(θ)`, so the unitary is unchanged for exact angles.
/// Rotations farther than `epsilon` from the grid are left alone.
#[derive(Debug, Clone, Copy)]
pub struct RoundToDiscreteZ {
    epsilon: f64,
}

impl RoundToDiscreteZ {
    /// Create the pass. `epsilon` must be finite and non-negative.
    pub fn new(epsilon: f64) -> CompileResult<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(CompileError::InvalidConfiguration(format!(
                "synthesis epsilon must be finite and non-negative, got {epsilon}"
            )));
        }
        Ok(Self { epsilon })
    }

    /// The rounding tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for RoundToDiscreteZ {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_SYNTHESIS_EPSILON,
        }
    }
}

impl Pass for RoundToDiscreteZ {
    fn name(&self) -> &'static str {
        "RoundToDiscreteZ"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let rotations: Vec<(NodeIndex, QubitId, f64)> = dag
            .operations_with_cycles(true)
            .into_iter()
            .filter_map(|(_, node, inst)| {
                let angle = inst.as_gate()?.as_z_rotation()?;
                let qubit = inst.qubits.first().copied()?;
                Some((node, qubit, angle))
            })
            .collect();

        let mut rounded = 0;
        for &(node, qubit, angle) in &rotations {
            let Some(rotation) = check_angle(angle, self.epsilon) else {
                trace!(angle, %qubit, "Rotation is not a multiple of pi/4, skipping");
                continue;
            };
            let sequence = rotation
                .sequence()
                .iter()
                .map(|&gate| Instruction::single_qubit_gate(gate, qubit));
            dag.splice_op(node, sequence)?;
            dag.add_global_phase(-rotation.angle / 2.0);
            rounded += 1;
        }

        debug!(
            "Rounded {} of {} Z rotations to Clifford+T",
            rounded,
            rotations.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftq_ir::HasUnitary;
    use std::f64::consts::PI;

    #[test]
    fn test_check_angle_grid_points() {
        for k in 0..8u8 {
            let r = check_angle(f64::from(k) * FRAC_PI_4, 0.0).unwrap();
            assert_eq!(r.residue, k);
            assert_eq!(r.residual, 0.0);
        }
    }

    #[test]
    fn test_check_angle_wraps() {
        assert_eq!(check_angle(-PI / 4.0, 1e-8).unwrap().residue, 7);
        assert_eq!(check_angle(2.0 * PI - 1e-12, 1e-8).unwrap().residue, 0);
        assert_eq!(check_angle(9.0 * PI / 4.0, 1e-8).unwrap().residue, 1);
    }

    #[test]
    fn test_check_angle_exact_far_from_zero() {
        for k in -64..64i32 {
            let r = check_angle(f64::from(k) * FRAC_PI_4, 0.0)
                .unwrap_or_else(|| panic!("k = {k} was not rounded"));
            assert_eq!(i32::from(r.residue), k.rem_euclid(8));
            assert_eq!(r.residual, 0.0);
        }
    }

    #[test]
    fn test_check_angle_residual_across_zero() {
        let r = check_angle(-1e-12, 1e-8).unwrap();
        assert_eq!(r.residue, 0);
        assert!(r.residual < 1e-11);
        assert!(check_angle(-1e-6, 1e-8).is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-negative")]
    fn test_check_angle_negative_epsilon() {
        let _ = check_angle(FRAC_PI_4, -1.0);
    }

    #[test]
    fn test_check_angle_rejects() {
        assert!(check_angle(PI / 4.0 + 1e-3, 1e-8).is_none());
        assert!(check_angle(f64::NAN, 1.0).is_none());
    }

    #[test]
    fn test_invalid_epsilon() {
        assert!(RoundToDiscreteZ::new(-1e-3).is_err());
        assert!(RoundToDiscreteZ::new(f64::INFINITY).is_err());
        assert_eq!(RoundToDiscreteZ::new(0.0).unwrap().epsilon(), 0.0);
        assert_eq!(RoundToDiscreteZ::default().epsilon(), DEFAULT_SYNTHESIS_EPSILON);
    }

    #[test]
    fn test_round_preserves_exact_unitary() {
        let mut dag = CircuitDag::with_qubits(2);
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::Rz(3.0 * FRAC_PI_4), QubitId(0)))
            .unwrap();
        dag.apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::Rz(-PI / 2.0), QubitId(1)))
            .unwrap();
        let before = dag.unitary().unwrap();

        RoundToDiscreteZ::default()
            .run(&mut dag, &mut PropertySet::new())
            .unwrap();
        dag.verify_integrity().unwrap();

        let counts = dag.count_ops();
        assert!(!counts.contains_key("rz"));
        assert_eq!(counts["s"], 1);
        assert_eq!(counts["t"], 1);
        assert_eq!(counts["sdg"], 1);

        let after = dag.unitary().unwrap();
        let diff = before.as_array() - after.as_array();
        assert!(diff.iter().all(|z| z.norm() < 1e-9));
    }
}
