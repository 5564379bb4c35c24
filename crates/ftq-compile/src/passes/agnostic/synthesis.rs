//! Resynthesis of blocks into standard gates.

use std::f64::consts::PI;
use std::sync::Arc;

use tracing::{debug, trace};

use ftq_ir::{
    CircuitDag, GateKind, HasUnitary, Instruction, NodeIndex, QubitId, StandardGate, UnitaryMatrix,
};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::passes::target::DEFAULT_SYNTHESIS_EPSILON;
use crate::property::PropertySet;
use crate::unitary::{EulerAngles, normalize_angle};

/// Floor on the accepted synthesis error, absorbing floating point noise.
const MIN_SYNTHESIS_TOLERANCE: f64 = 1e-10;

/// Euler angle `beta` below which a unitary is treated as a Z rotation.
const DIAGONAL_TOLERANCE: f64 = 1e-10;

/// A numerical synthesizer turning a unitary into standard gates.
///
/// Implementations return instructions over local qubits `0..n` whose
/// unitary is within `epsilon` of `target` up to global phase. The caller
/// restores the phase.
pub trait SynthesisEngine: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Synthesize `target`.
    fn synthesize(&self, target: &UnitaryMatrix, epsilon: f64) -> CompileResult<Vec<Instruction>>;
}

/// Exact single-qubit resynthesis into `Rz · SX · Rz · SX · Rz`.
///
/// Diagonal unitaries collapse to a single `Rz`. The result has at most
/// three continuous angles, all of them Z rotations, which is the form the
/// rounding pass expects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZxzxzDecomposition;

impl ZxzxzDecomposition {
    /// Gate sequence for a single-qubit unitary, in execution order.
    pub fn sequence(unitary: &UnitaryMatrix) -> CompileResult<Vec<StandardGate>> {
        let angles = EulerAngles::zyz(unitary)?;
        if angles.is_diagonal(DIAGONAL_TOLERANCE) {
            return Ok(vec![StandardGate::Rz(normalize_angle(
                angles.alpha + angles.gamma,
            ))]);
        }
        Ok(vec![
            StandardGate::Rz(normalize_angle(angles.gamma)),
            StandardGate::SX,
            StandardGate::Rz(normalize_angle(angles.beta + PI)),
            StandardGate::SX,
            StandardGate::Rz(normalize_angle(angles.alpha + PI)),
        ])
    }
}

impl SynthesisEngine for ZxzxzDecomposition {
    fn name(&self) -> &str {
        "ZXZXZ"
    }

    fn synthesize(&self, target: &UnitaryMatrix, _epsilon: f64) -> CompileResult<Vec<Instruction>> {
        Ok(Self::sequence(target)?
            .into_iter()
            .map(|gate| Instruction::single_qubit_gate(gate, QubitId(0)))
            .collect())
    }
}

impl Pass for ZxzxzDecomposition {
    fn name(&self) -> &'static str {
        "ZXZXZDecomposition"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let qubits = dag.qubits();
        let &[qubit] = qubits.as_slice() else {
            return Err(CompileError::PassFailed {
                name: "ZXZXZDecomposition".into(),
                reason: format!("expected a single-qubit circuit, got {} qubits", qubits.len()),
            });
        };

        let target = dag.unitary()?;
        let mut next = dag.empty_like();
        for gate in Self::sequence(&target)? {
            next.apply(Instruction::single_qubit_gate(gate, qubit))?;
        }
        let phase = target.phase_relative_to(&next.unitary()?)?;
        next.set_global_phase(phase);

        trace!("Resynthesized {} gates into {}", dag.num_ops(), next.num_ops());
        *dag = next;
        Ok(())
    }
}

/// Replaces every block and matrix-defined gate by synthesized gates.
///
/// Single-qubit operations always go through [`ZxzxzDecomposition`].
/// Wider ones need an engine; without one, blocks made only of standard
/// gates are left for later passes and anything else is an error. Each
/// result is checked against the block's unitary before it is spliced in.
#[derive(Clone)]
pub struct BlockSynthesis {
    engine: Option<Arc<dyn SynthesisEngine>>,
    epsilon: f64,
}

impl BlockSynthesis {
    /// Create the pass without a multi-qubit engine.
    pub fn new(epsilon: f64) -> CompileResult<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(CompileError::InvalidConfiguration(format!(
                "synthesis epsilon must be finite and non-negative, got {epsilon}"
            )));
        }
        Ok(Self {
            engine: None,
            epsilon,
        })
    }

    /// Use `engine` for blocks on more than one qubit.
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn SynthesisEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    fn synthesize(&self, inst: &Instruction) -> CompileResult<Option<Vec<Instruction>>> {
        let block = inst.name().to_string();
        let failed = |reason: String| CompileError::SynthesisFailed {
            block: block.clone(),
            reason,
        };

        if inst.qubits.len() == 1 {
            let target = inst.unitary().map_err(|e| failed(e.to_string()))?;
            return ZxzxzDecomposition.synthesize(&target, self.epsilon).map(Some);
        }

        match (&self.engine, inst.as_gate().map(|g| &g.kind)) {
            (Some(engine), _) => {
                let target = inst.unitary().map_err(|e| failed(e.to_string()))?;
                trace!(engine = engine.name(), %block, "Synthesizing block");
                engine.synthesize(&target, self.epsilon).map(Some)
            }
            (None, Some(GateKind::Composite(composite))) => {
                let (flat, _) = composite.flatten();
                if flat
                    .iter()
                    .all(|i| i.as_gate().and_then(|g| g.as_standard()).is_some())
                {
                    Ok(None)
                } else {
                    Err(failed("no synthesis engine for multi-qubit block".into()))
                }
            }
            (None, _) => Err(failed("no synthesis engine for multi-qubit gate".into())),
        }
    }
}

impl Default for BlockSynthesis {
    fn default() -> Self {
        Self {
            engine: None,
            epsilon: DEFAULT_SYNTHESIS_EPSILON,
        }
    }
}

impl std::fmt::Debug for BlockSynthesis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockSynthesis")
            .field("engine", &self.engine.as_ref().map(|e| e.name()))
            .field("epsilon", &self.epsilon)
            .finish()
    }
}

fn is_synthesizable(inst: &Instruction) -> bool {
    inst.as_gate()
        .is_some_and(|g| matches!(g.kind, GateKind::Composite(_) | GateKind::Custom(_)))
}

impl Pass for BlockSynthesis {
    fn name(&self) -> &'static str {
        "BlockSynthesis"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let blocks: Vec<NodeIndex> = dag
            .topological_ops()
            .filter(|(_, inst)| is_synthesizable(inst))
            .map(|(node, _)| node)
            .collect();

        let mut synthesized = 0;
        for node in blocks {
            let Some(inst) = dag.get_instruction(node).cloned() else {
                continue;
            };
            let Some(local) = self.synthesize(&inst)? else {
                trace!(block = inst.name(), "No engine, leaving block in place");
                continue;
            };

            #[allow(clippy::cast_possible_truncation)]
            let width = inst.qubits.len() as u32;
            let target = inst.unitary()?;
            let built = CircuitDag::from_instructions(width, local.iter().cloned())?.unitary()?;
            let error = built.distance_from(&target);
            if error > self.epsilon.max(MIN_SYNTHESIS_TOLERANCE) {
                return Err(CompileError::SynthesisFailed {
                    block: inst.name().to_string(),
                    reason: format!("synthesized within {error:.3e}, needed {:.3e}", self.epsilon),
                });
            }

            let phase = target.phase_relative_to(&built)?;
            dag.splice_op(node, local.iter().map(|i| i.remapped(&inst.qubits)))?;
            dag.add_global_phase(phase);
            synthesized += 1;
        }

        debug!("Synthesized {} blocks", synthesized);
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, _properties: &PropertySet) -> bool {
        dag.topological_ops().any(|(_, inst)| is_synthesizable(inst))
    }
}
