//! Retargeting of multi-qubit gates onto CX plus single-qubit gates.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use tracing::debug;

use ftq_ir::{CircuitDag, Instruction, QubitId, StandardGate};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Rewrites multi-qubit standard gates outside the Clifford+T set.
///
/// CX, CZ and SWAP are kept. Every other two- and three-qubit standard gate
/// is expanded into CX and single-qubit gates, with the circuit's global
/// phase adjusted so the unitary is unchanged. Single-qubit gates, custom
/// gates and blocks pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiQubitRetarget;

impl Pass for MultiQubitRetarget {
    fn name(&self) -> &'static str {
        "MultiQubitRetarget"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let needs_work = dag.topological_ops().any(|(_, inst)| {
            inst.as_gate()
                .and_then(|g| g.as_standard())
                .is_some_and(|g| decompose(g, &inst.qubits).is_some())
        });
        if !needs_work {
            return Ok(());
        }

        // Rebuild so every expansion lands at its gate's position.
        let mut next = dag.empty_like();
        let mut phase = dag.global_phase();
        let mut rewritten = 0;
        for (_, inst) in dag.topological_ops() {
            let expansion = inst
                .as_gate()
                .and_then(|g| g.as_standard())
                .and_then(|g| decompose(g, &inst.qubits));
            match expansion {
                Some((instructions, delta)) => {
                    for replacement in instructions {
                        next.apply(replacement)?;
                    }
                    phase += delta;
                    rewritten += 1;
                }
                None => {
                    next.apply(inst.clone())?;
                }
            }
        }
        next.set_global_phase(phase);
        *dag = next;

        debug!("Retargeted {} multi-qubit gates", rewritten);
        Ok(())
    }
}

fn one(gate: StandardGate, qubit: QubitId) -> Instruction {
    Instruction::single_qubit_gate(gate, qubit)
}

fn cx(control: QubitId, target: QubitId) -> Instruction {
    Instruction::two_qubit_gate(StandardGate::CX, control, target)
}

/// `Rz(θ)` on the target of a CX pair, controlled by `control`.
fn controlled_rz(theta: f64, control: QubitId, target: QubitId) -> Vec<Instruction> {
    vec![
        one(StandardGate::Rz(theta / 2.0), target),
        cx(control, target),
        one(StandardGate::Rz(-theta / 2.0), target),
        cx(control, target),
    ]
}

/// `exp(-iθ/2 · Z⊗Z)`.
fn zz_rotation(theta: f64, a: QubitId, b: QubitId) -> Vec<Instruction> {
    vec![cx(a, b), one(StandardGate::Rz(theta), b), cx(a, b)]
}

/// Exact Clifford+T Toffoli.
fn toffoli(a: QubitId, b: QubitId, c: QubitId) -> Vec<Instruction> {
    use StandardGate::{H, T, Tdg};
    vec![
        one(H, c),
        cx(b, c),
        one(Tdg, c),
        cx(a, c),
        one(T, c),
        cx(b, c),
        one(Tdg, c),
        cx(a, c),
        one(T, b),
        one(T, c),
        one(H, c),
        cx(a, b),
        one(T, a),
        one(Tdg, b),
        cx(a, b),
    ]
}

/// Expansion of a gate into CX plus single-qubit gates and the global phase
/// to add, or `None` if the gate is kept.
fn decompose(gate: &StandardGate, qubits: &[QubitId]) -> Option<(Vec<Instruction>, f64)> {
    use StandardGate as G;

    match (*gate, qubits) {
        (G::CY, &[c, t]) => Some((vec![one(G::Sdg, t), cx(c, t), one(G::S, t)], 0.0)),
        (G::CH, &[c, t]) => Some((
            vec![
                one(G::Ry(-FRAC_PI_4), t),
                Instruction::two_qubit_gate(G::CZ, c, t),
                one(G::Ry(FRAC_PI_4), t),
            ],
            0.0,
        )),
        (G::ISwap, &[a, b]) => Some((
            vec![
                one(G::S, a),
                one(G::S, b),
                one(G::H, a),
                cx(a, b),
                cx(b, a),
                one(G::H, b),
            ],
            0.0,
        )),
        (G::CRz(theta), &[c, t]) => Some((controlled_rz(theta, c, t), 0.0)),
        (G::CRx(theta), &[c, t]) => {
            let mut out = vec![one(G::H, t)];
            out.extend(controlled_rz(theta, c, t));
            out.push(one(G::H, t));
            Some((out, 0.0))
        }
        (G::CRy(theta), &[c, t]) => Some((
            vec![
                one(G::Ry(theta / 2.0), t),
                cx(c, t),
                one(G::Ry(-theta / 2.0), t),
                cx(c, t),
            ],
            0.0,
        )),
        // CRz(θ) · Rz(θ/2) on the control equals CP(θ) up to e^{-iθ/4}.
        (G::CP(theta), &[c, t]) => {
            let mut out = vec![one(G::Rz(theta / 2.0), c)];
            out.extend(controlled_rz(theta, c, t));
            Some((out, theta / 4.0))
        }
        (G::RZZ(theta), &[a, b]) => Some((zz_rotation(theta, a, b), 0.0)),
        (G::RXX(theta), &[a, b]) => {
            let mut out = vec![one(G::H, a), one(G::H, b)];
            out.extend(zz_rotation(theta, a, b));
            out.extend([one(G::H, a), one(G::H, b)]);
            Some((out, 0.0))
        }
        (G::RYY(theta), &[a, b]) => {
            let mut out = vec![one(G::Rx(FRAC_PI_2), a), one(G::Rx(FRAC_PI_2), b)];
            out.extend(zz_rotation(theta, a, b));
            out.extend([one(G::Rx(-FRAC_PI_2), a), one(G::Rx(-FRAC_PI_2), b)]);
            Some((out, 0.0))
        }
        (G::CCX, &[a, b, c]) => Some((toffoli(a, b, c), 0.0)),
        (G::CSwap, &[c, a, b]) => {
            let mut out = vec![cx(b, a)];
            out.extend(toffoli(c, a, b));
            out.push(cx(b, a));
            Some((out, 0.0))
        }
        _ => None,
    }
}
