//! Running passes on each block of a partitioned circuit.

use tracing::trace;

use ftq_ir::{CircuitDag, CompositeGate, Gate, Instruction, NodeIndex};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Predicate choosing which blocks a [`ForEachBlock`] visits.
pub type BlockFilter = Box<dyn Fn(&Instruction) -> bool + Send + Sync>;

/// Accepts single-qubit blocks carrying at least one continuous parameter.
///
/// Blocks without parameters hold only fixed gates and are already in a
/// discrete gate set, so resynthesis and replacement skip them.
pub fn single_qubit_filter(block: &Instruction) -> bool {
    block.qubits.len() == 1 && block.num_params() > 0
}

/// Runs a list of passes on every composite block of a circuit.
///
/// Each accepted block is lifted into its own circuit over local qubits,
/// the passes run on it in order and the result, including any change to
/// its global phase, is written back in place.
pub struct ForEachBlock {
    passes: Vec<Box<dyn Pass>>,
    filter: Option<BlockFilter>,
}

impl ForEachBlock {
    /// Create a pass running `passes` on every block.
    pub fn new(passes: Vec<Box<dyn Pass>>) -> Self {
        Self {
            passes,
            filter: None,
        }
    }

    /// Create a pass running a single pass on every block.
    pub fn with_pass(pass: impl Pass + 'static) -> Self {
        Self::new(vec![Box::new(pass)])
    }

    /// Only visit blocks accepted by `filter`.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Fn(&Instruction) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    fn accepts(&self, inst: &Instruction) -> bool {
        inst.is_composite() && self.filter.as_ref().is_none_or(|f| f(inst))
    }

    /// Number of sub-passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if there are no sub-passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl std::fmt::Debug for ForEachBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.passes.iter().map(|p| p.name()).collect();
        f.debug_struct("ForEachBlock")
            .field("passes", &names)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl Pass for ForEachBlock {
    fn name(&self) -> &'static str {
        "ForEachBlock"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let blocks: Vec<NodeIndex> = dag
            .topological_ops()
            .filter(|(_, inst)| self.accepts(inst))
            .map(|(node, _)| node)
            .collect();

        for node in blocks {
            let Some(inst) = dag.get_instruction(node) else {
                continue;
            };
            let Some(block) = inst.as_gate().and_then(Gate::as_composite) else {
                continue;
            };
            let qubits = inst.qubits.clone();
            let name = block.name.clone();
            let width = block.num_qubits;

            let mut region = CircuitDag::from_instructions(width, block.instructions.clone())?;
            region.set_global_phase(block.global_phase);

            let mut block_properties = PropertySet::new();
            block_properties.gate_set.clone_from(&properties.gate_set);
            for pass in &self.passes {
                if pass.should_run(&region, &block_properties) {
                    pass.run(&mut region, &mut block_properties)?;
                }
            }

            let updated = CompositeGate::new(name, width, region.to_instructions())?
                .with_global_phase(region.global_phase());
            dag.replace_op(node, Instruction::gate(updated, qubits))?;
        }

        trace!("Visited blocks with {} sub-passes", self.passes.len());
        Ok(())
    }
}
