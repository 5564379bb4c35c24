//! Single-qubit unitary utilities for resynthesis.
//!
//! Provides the ZYZ Euler decomposition used by the ZXZXZ resynthesis pass
//! and angle normalization.

use num_complex::Complex64;
use std::f64::consts::PI;

use ftq_ir::UnitaryMatrix;

use crate::error::{CompileError, CompileResult};

/// Magnitude below which a matrix entry is treated as zero.
const EPSILON: f64 = 1e-12;

/// Euler angles of a single-qubit unitary.
///
/// `U = e^{i·phase} · Rz(alpha) · Ry(beta) · Rz(gamma)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    /// Final Z rotation.
    pub alpha: f64,
    /// Y rotation, in `[0, π]`.
    pub beta: f64,
    /// First Z rotation.
    pub gamma: f64,
    /// Global phase.
    pub phase: f64,
}

impl EulerAngles {
    /// Decompose a single-qubit unitary into ZYZ Euler angles.
    pub fn zyz(unitary: &UnitaryMatrix) -> CompileResult<Self> {
        if unitary.num_qubits() != 1 {
            return Err(CompileError::InvalidConfiguration(format!(
                "ZYZ decomposition needs a single-qubit unitary, got {} qubits",
                unitary.num_qubits()
            )));
        }
        let (a, b, c, d) = (
            unitary.get(0, 0),
            unitary.get(0, 1),
            unitary.get(1, 0),
            unitary.get(1, 1),
        );

        // Remove the global phase to land in SU(2).
        let det = a * d - b * c;
        let phase = det.arg() / 2.0;
        let unphase = Complex64::from_polar(1.0, -phase);
        let a = a * unphase;
        let c = c * unphase;

        // a = cos(β/2)·e^{-i(α+γ)/2}, c = sin(β/2)·e^{i(α-γ)/2}
        let beta = 2.0 * c.norm().atan2(a.norm());
        let (alpha, gamma) = if c.norm() < EPSILON {
            (-2.0 * a.arg(), 0.0)
        } else if a.norm() < EPSILON {
            (2.0 * c.arg(), 0.0)
        } else {
            let sum = -2.0 * a.arg();
            let diff = 2.0 * c.arg();
            (f64::midpoint(sum, diff), (sum - diff) / 2.0)
        };

        Ok(Self {
            alpha,
            beta,
            gamma,
            phase,
        })
    }

    /// Check whether the decomposition is a pure Z rotation.
    pub fn is_diagonal(&self, tolerance: f64) -> bool {
        self.beta.abs() < tolerance
    }

    /// Rebuild the unitary the angles describe.
    pub fn to_unitary(&self) -> CompileResult<UnitaryMatrix> {
        let product = UnitaryMatrix::rz(self.alpha)
            .dot(&UnitaryMatrix::ry(self.beta))?
            .dot(&UnitaryMatrix::rz(self.gamma))?;
        Ok(product.with_global_phase(self.phase))
    }
}

/// Normalize an angle to `[-π, π]`.
///
/// Non-finite angles normalize to zero.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    }
    a
}
