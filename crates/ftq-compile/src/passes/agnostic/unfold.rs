//! Flattening of composite blocks.

use tracing::debug;

use ftq_ir::CircuitDag;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Expands every composite block, recursively, into primitive instructions.
///
/// Block phases move into the circuit's global phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnfoldPass;

impl Pass for UnfoldPass {
    fn name(&self) -> &'static str {
        "UnfoldPass"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let unfolded = dag.unfold_all()?;
        if unfolded > 0 {
            debug!("Unfolded {} blocks", unfolded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftq_ir::{CompositeGate, Instruction, QubitId, StandardGate};

    #[test]
    fn test_unfold_nested_blocks() {
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
                Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)),
            ],
        )
        .unwrap()
        .with_global_phase(0.5);

        let mut dag = CircuitDag::with_qubits(2);
        dag.apply(Instruction::gate(outer, [QubitId(1), QubitId(0)]))
            .unwrap();
        UnfoldPass.run(&mut dag, &mut PropertySet::new()).unwrap();

        let ops = dag.to_instructions();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].name(), "t");
        assert_eq!(ops[0].qubits, vec![QubitId(0)]);
        assert_eq!(ops[1].qubits, vec![QubitId(1), QubitId(0)]);
        assert!((dag.global_phase() - 0.75).abs() < 1e-12);
    }
}
