//! Dense unitary matrices.
//!
//! [`UnitaryMatrix`] is the common currency between gates, circuits and the
//! rewrite rules of the compiler: every gate can produce one, every circuit
//! fragment without measurements can be folded into one, and equality up to
//! global phase is decided on them.
//!
//! Qubit ordering is big-endian: in an `n`-qubit operator, qubit position `0`
//! is the most significant bit of the basis index.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{IrError, IrResult};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// A square complex matrix of dimension `2^n` acting on `n` qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitaryMatrix {
    data: Array2<Complex64>,
    num_qubits: u32,
}

/// Anything that has a well-defined unitary.
pub trait HasUnitary {
    /// Compute the unitary of this object.
    fn unitary(&self) -> IrResult<UnitaryMatrix>;
}

impl HasUnitary for UnitaryMatrix {
    fn unitary(&self) -> IrResult<UnitaryMatrix> {
        Ok(self.clone())
    }
}

impl UnitaryMatrix {
    /// The identity on `num_qubits` qubits.
    pub fn identity(num_qubits: u32) -> Self {
        Self {
            data: Array2::eye(1usize << num_qubits),
            num_qubits,
        }
    }

    /// Wrap an existing square array whose dimension is a power of two.
    pub fn from_array(data: Array2<Complex64>) -> IrResult<Self> {
        let (rows, cols) = data.dim();
        if rows != cols {
            return Err(IrError::InvalidMatrix(format!(
                "matrix is {rows}x{cols}, expected a square matrix"
            )));
        }
        if !rows.is_power_of_two() {
            return Err(IrError::InvalidMatrix(format!(
                "dimension {rows} is not a power of two"
            )));
        }
        Ok(Self {
            data,
            num_qubits: rows.trailing_zeros(),
        })
    }

    /// Build from row-major elements.
    pub fn from_row_major(num_qubits: u32, elements: &[Complex64]) -> IrResult<Self> {
        let dim = 1usize << num_qubits;
        if elements.len() != dim * dim {
            return Err(IrError::DimensionMismatch {
                expected: dim * dim,
                got: elements.len(),
            });
        }
        Ok(Self {
            data: Array2::from_shape_fn((dim, dim), |(r, c)| elements[r * dim + c]),
            num_qubits,
        })
    }

    fn from_rows<const D: usize>(rows: [[Complex64; D]; D]) -> Self {
        Self {
            data: Array2::from_shape_fn((D, D), |(r, c)| rows[r][c]),
            num_qubits: D.trailing_zeros(),
        }
    }

    /// Permutation matrix sending basis state `j` to `perm[j]`.
    fn permutation(perm: &[usize]) -> Self {
        let dim = perm.len();
        let mut data = Array2::from_elem((dim, dim), ZERO);
        for (col, &row) in perm.iter().enumerate() {
            data[[row, col]] = ONE;
        }
        Self {
            data,
            num_qubits: dim.trailing_zeros(),
        }
    }

    /// Matrix dimension (`2^num_qubits`).
    #[inline]
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// Number of qubits the matrix acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Borrow the underlying array.
    #[inline]
    pub fn as_array(&self) -> &Array2<Complex64> {
        &self.data
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[[row, col]]
    }

    /// Matrix product `self · other`.
    pub fn dot(&self, other: &Self) -> IrResult<Self> {
        self.check_same_dim(other)?;
        Ok(Self {
            data: self.data.dot(&other.data),
            num_qubits: self.num_qubits,
        })
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        Self {
            data: self.data.t().mapv(|z| z.conj()),
            num_qubits: self.num_qubits,
        }
    }

    /// Tensor product `self ⊗ other`; `self` occupies the high qubits.
    pub fn kron(&self, other: &Self) -> Self {
        let b = other.dim();
        let dim = self.dim() * b;
        Self {
            data: Array2::from_shape_fn((dim, dim), |(r, c)| {
                self.data[[r / b, c / b]] * other.data[[r % b, c % b]]
            }),
            num_qubits: self.num_qubits + other.num_qubits,
        }
    }

    /// Multiply by `e^{i·phase}`.
    pub fn with_global_phase(&self, phase: f64) -> Self {
        let factor = Complex64::from_polar(1.0, phase);
        Self {
            data: self.data.mapv(|z| z * factor),
            num_qubits: self.num_qubits,
        }
    }

    /// Hilbert-Schmidt inner product `tr(self† · other)`.
    fn overlap(&self, other: &Self) -> Complex64 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    /// Phase `φ` such that `self ≈ e^{iφ} · reference`.
    pub fn phase_relative_to(&self, reference: &Self) -> IrResult<f64> {
        reference.check_same_dim(self)?;
        let overlap = reference.overlap(self);
        if overlap.norm() <= f64::EPSILON {
            return Ok(0.0);
        }
        Ok(overlap.arg())
    }

    /// Phase-invariant distance to `other`.
    ///
    /// Computes `‖other − e^{iφ}·self‖_F / √d` with `φ = arg tr(self†·other)`,
    /// which is zero exactly when the two operators agree up to global phase.
    /// Operators of different dimension are infinitely far apart.
    pub fn distance_from(&self, other: &Self) -> f64 {
        if self.dim() != other.dim() {
            return f64::INFINITY;
        }
        let overlap = self.overlap(other);
        let align = if overlap.norm() > f64::EPSILON {
            Complex64::from_polar(1.0, -overlap.arg())
        } else {
            ONE
        };
        let sum: f64 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (b * align - a).norm_sqr())
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let dim = self.dim() as f64;
        (sum / dim).sqrt()
    }

    /// Check `U†U ≈ I` entrywise within `tolerance`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        let product = self.dagger().data.dot(&self.data);
        product.indexed_iter().all(|((r, c), z)| {
            let expected = if r == c { ONE } else { ZERO };
            (z - expected).norm() < tolerance
        })
    }

    /// Left-multiply by `gate` acting on the qubit positions `targets`.
    ///
    /// Returns `G_embedded · self`. `targets[0]` is the most significant qubit
    /// of `gate`.
    pub fn apply_on(&self, gate: &Self, targets: &[usize]) -> IrResult<Self> {
        let n = self.num_qubits as usize;
        if gate.num_qubits as usize != targets.len() {
            return Err(IrError::DimensionMismatch {
                expected: gate.num_qubits as usize,
                got: targets.len(),
            });
        }
        let mut used = 0usize;
        for &t in targets {
            if t >= n {
                return Err(IrError::InvalidMatrix(format!(
                    "target position {t} outside a {n}-qubit operator"
                )));
            }
            let mask = 1usize << (n - 1 - t);
            if used & mask != 0 {
                return Err(IrError::InvalidMatrix(format!(
                    "target position {t} repeated"
                )));
            }
            used |= mask;
        }

        let k = targets.len();
        let sub = 1usize << k;
        let dim = self.dim();
        let masks: Vec<usize> = targets.iter().map(|&t| 1usize << (n - 1 - t)).collect();
        let scatter = |base: usize, s: usize| -> usize {
            masks.iter().enumerate().fold(base, |idx, (bit, mask)| {
                if s & (1 << (k - 1 - bit)) != 0 {
                    idx | mask
                } else {
                    idx
                }
            })
        };

        let mut out = Array2::from_elem((dim, dim), ZERO);
        let mut indices = vec![0usize; sub];
        for base in (0..dim).filter(|b| b & used == 0) {
            for (s, slot) in indices.iter_mut().enumerate() {
                *slot = scatter(base, s);
            }
            for col in 0..dim {
                for (s_out, &row) in indices.iter().enumerate() {
                    let mut acc = ZERO;
                    for (s_in, &src) in indices.iter().enumerate() {
                        acc += gate.data[[s_out, s_in]] * self.data[[src, col]];
                    }
                    out[[row, col]] = acc;
                }
            }
        }

        Ok(Self {
            data: out,
            num_qubits: self.num_qubits,
        })
    }

    fn check_same_dim(&self, other: &Self) -> IrResult<()> {
        if self.dim() == other.dim() {
            Ok(())
        } else {
            Err(IrError::DimensionMismatch {
                expected: self.dim(),
                got: other.dim(),
            })
        }
    }

    // Fixed gate matrices.

    /// Hadamard.
    pub fn h() -> Self {
        let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        Self::from_rows([[s, s], [s, -s]])
    }

    /// Pauli-X.
    pub fn x() -> Self {
        Self::from_rows([[ZERO, ONE], [ONE, ZERO]])
    }

    /// Pauli-Y.
    pub fn y() -> Self {
        Self::from_rows([[ZERO, -I], [I, ZERO]])
    }

    /// Pauli-Z.
    pub fn z() -> Self {
        Self::from_rows([[ONE, ZERO], [ZERO, -ONE]])
    }

    /// sqrt(X).
    pub fn sx() -> Self {
        let a = Complex64::new(0.5, 0.5);
        let b = Complex64::new(0.5, -0.5);
        Self::from_rows([[a, b], [b, a]])
    }

    /// Phase gate `diag(1, e^{iλ})`.
    pub fn phase(lambda: f64) -> Self {
        Self::from_rows([[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, lambda)]])
    }

    /// Rotation about X.
    pub fn rx(theta: f64) -> Self {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new(0.0, -(theta / 2.0).sin());
        Self::from_rows([[c, s], [s, c]])
    }

    /// Rotation about Y.
    pub fn ry(theta: f64) -> Self {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new((theta / 2.0).sin(), 0.0);
        Self::from_rows([[c, -s], [s, c]])
    }

    /// Rotation about Z: `diag(e^{-iθ/2}, e^{iθ/2})`.
    pub fn rz(theta: f64) -> Self {
        Self::from_rows([
            [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
            [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
        ])
    }

    /// Universal single-qubit gate U(θ, φ, λ).
    pub fn u(theta: f64, phi: f64, lambda: f64) -> Self {
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        Self::from_rows([
            [
                Complex64::new(c, 0.0),
                -Complex64::from_polar(s, lambda),
            ],
            [
                Complex64::from_polar(s, phi),
                Complex64::from_polar(c, phi + lambda),
            ],
        ])
    }

    /// Two-qubit gate applying `target` when the high qubit is |1⟩.
    pub fn controlled(target: &Self) -> Self {
        let mut data = Array2::eye(4);
        for r in 0..2 {
            for c in 0..2 {
                data[[2 + r, 2 + c]] = target.data[[r, c]];
            }
        }
        Self {
            data,
            num_qubits: 2,
        }
    }

    /// `exp(-i θ/2 · P⊗P)` for a single-qubit Pauli `P`.
    pub fn pauli_pair_rotation(pauli: &Self, theta: f64) -> Self {
        let pp = pauli.kron(pauli);
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new(0.0, -(theta / 2.0).sin());
        Self {
            data: Array2::from_shape_fn((4, 4), |(r, col)| {
                let diag = if r == col { c } else { ZERO };
                diag + s * pp.data[[r, col]]
            }),
            num_qubits: 2,
        }
    }

    /// SWAP.
    pub fn swap() -> Self {
        Self::permutation(&[0, 2, 1, 3])
    }

    /// CNOT with the high qubit as control.
    pub fn cx() -> Self {
        Self::permutation(&[0, 1, 3, 2])
    }

    /// iSWAP.
    pub fn iswap() -> Self {
        Self::from_rows([
            [ONE, ZERO, ZERO, ZERO],
            [ZERO, ZERO, I, ZERO],
            [ZERO, I, ZERO, ZERO],
            [ZERO, ZERO, ZERO, ONE],
        ])
    }

    /// Toffoli with the two high qubits as controls.
    pub fn ccx() -> Self {
        Self::permutation(&[0, 1, 2, 3, 4, 5, 7, 6])
    }

    /// Fredkin with the high qubit as control.
    pub fn cswap() -> Self {
        Self::permutation(&[0, 1, 2, 3, 4, 6, 5, 7])
    }
}
