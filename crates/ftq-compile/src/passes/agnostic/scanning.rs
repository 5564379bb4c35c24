//! Removal of gates that do not contribute to a circuit's unitary.

use tracing::debug;

use ftq_ir::{CircuitDag, HasUnitary, NodeIndex};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::passes::target::DEFAULT_SYNTHESIS_EPSILON;
use crate::property::PropertySet;

/// Drops every gate whose removal keeps the circuit within `epsilon` of its
/// original unitary.
///
/// Gates are tried from the end of the circuit backwards, each against the
/// unitary the circuit had before the pass, so errors never accumulate past
/// `epsilon`. The global phase is corrected afterwards. Intended for small
/// blocks, since each candidate costs a full unitary evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ScanningGateRemoval {
    epsilon: f64,
}

impl ScanningGateRemoval {
    /// Create the pass. `epsilon` must be finite and non-negative.
    pub fn new(epsilon: f64) -> CompileResult<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(CompileError::InvalidConfiguration(format!(
                "gate removal tolerance must be finite and non-negative, got {epsilon}"
            )));
        }
        Ok(Self { epsilon })
    }
}

impl Default for ScanningGateRemoval {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_SYNTHESIS_EPSILON,
        }
    }
}

impl Pass for ScanningGateRemoval {
    fn name(&self) -> &'static str {
        "ScanningGateRemoval"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let Ok(target) = dag.unitary() else {
            debug!("Circuit has no unitary, skipping gate removal");
            return Ok(());
        };

        let gates: Vec<NodeIndex> = dag
            .topological_ops()
            .filter(|(_, inst)| inst.is_gate())
            .map(|(node, _)| node)
            .collect();

        let mut removed = 0;
        for &node in gates.iter().rev() {
            let mut candidate = dag.clone();
            candidate.remove_op(node)?;
            if candidate.unitary()?.distance_from(&target) < self.epsilon {
                *dag = candidate;
                removed += 1;
            }
        }

        if removed > 0 {
            let current = dag.unitary()?;
            dag.add_global_phase(target.phase_relative_to(&current)?);
            debug!("Removed {} of {} gates", removed, gates.len());
        }
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, _properties: &PropertySet) -> bool {
        dag.topological_ops().any(|(_, inst)| inst.is_gate())
    }
}
