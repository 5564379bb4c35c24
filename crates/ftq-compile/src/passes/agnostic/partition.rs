//! Partitioning passes that carve a circuit into composite blocks.
//!
//! Blocks are [`CompositeGate`]s over local qubits. Downstream passes inspect
//! or rewrite them one at a time through
//! [`ForEachBlock`](super::ForEachBlock) and [`UnfoldPass`](super::UnfoldPass)
//! splices them back.

use rustc_hash::FxHashMap;
use tracing::debug;

use ftq_ir::{CircuitDag, CompositeGate, Instruction, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Name given to blocks created by the partitioners.
pub const BLOCK_NAME: &str = "block";

/// Wrap instructions over `qubits` into one block instruction.
///
/// `qubits` must be sorted; local qubit `i` of the block is `qubits[i]`.
fn make_block(qubits: Vec<QubitId>, instructions: Vec<Instruction>) -> CompileResult<Instruction> {
    let local_index: FxHashMap<QubitId, u32> = qubits
        .iter()
        .zip(0u32..)
        .map(|(&q, i)| (q, i))
        .collect();
    let local = instructions
        .into_iter()
        .map(|mut inst| {
            for q in &mut inst.qubits {
                *q = QubitId(local_index[&*q]);
            }
            inst
        })
        .collect();
    #[allow(clippy::cast_possible_truncation)]
    let block = CompositeGate::new(BLOCK_NAME, qubits.len() as u32, local)?;
    Ok(Instruction::gate(block, qubits))
}

fn is_single_qubit_gate(inst: &Instruction) -> bool {
    inst.is_gate() && inst.qubits.len() == 1
}

/// Groups each maximal run of single-qubit gates on a wire into one block.
///
/// Single-qubit blocks count as single-qubit gates, so an earlier block is
/// nested inside the new one.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupSingleQubitGates;

impl Pass for GroupSingleQubitGates {
    fn name(&self) -> &'static str {
        "GroupSingleQubitGates"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut next = dag.empty_like();
        next.set_global_phase(dag.global_phase());
        let mut runs: FxHashMap<QubitId, Vec<Instruction>> = FxHashMap::default();
        let mut blocks = 0;

        for (_, inst) in dag.topological_ops() {
            if is_single_qubit_gate(inst) {
                runs.entry(inst.qubits[0]).or_default().push(inst.clone());
                continue;
            }
            for qubit in &inst.qubits {
                if let Some(run) = runs.remove(qubit) {
                    next.apply(make_block(vec![*qubit], run)?)?;
                    blocks += 1;
                }
            }
            next.apply(inst.clone())?;
        }

        let mut remaining: Vec<_> = runs.into_iter().collect();
        remaining.sort_by_key(|(qubit, _)| *qubit);
        for (qubit, run) in remaining {
            next.apply(make_block(vec![qubit], run)?)?;
            blocks += 1;
        }

        debug!("Grouped single-qubit gates into {} blocks", blocks);
        *dag = next;
        Ok(())
    }
}

/// A block under construction.
#[derive(Debug, Default)]
struct OpenBlock {
    qubits: Vec<QubitId>,
    instructions: Vec<Instruction>,
}

/// Greedy partitioner into convex blocks of at most `block_size` qubits.
///
/// Operations are scanned in topological order. An operation joins the open
/// blocks owning its qubits, merging them, when the union stays within the
/// size limit. Otherwise the blocks it touches are closed and it starts a
/// new one. Measurements, resets, barriers, existing blocks and gates wider
/// than the limit are never grouped.
#[derive(Debug, Clone, Copy)]
pub struct QuickPartitioner {
    block_size: usize,
}

impl QuickPartitioner {
    /// Create a partitioner. `block_size` must be at least 1.
    pub fn new(block_size: usize) -> CompileResult<Self> {
        if block_size == 0 {
            return Err(CompileError::InvalidConfiguration(
                "partition block size must be at least 1".into(),
            ));
        }
        Ok(Self { block_size })
    }

    /// Maximum number of qubits per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Default for QuickPartitioner {
    fn default() -> Self {
        Self { block_size: 3 }
    }
}

/// Open blocks and which block owns each qubit.
#[derive(Debug, Default)]
struct Partition {
    blocks: Vec<Option<OpenBlock>>,
    owner: FxHashMap<QubitId, usize>,
    closed: usize,
}

impl Partition {
    fn touching(&self, qubits: &[QubitId]) -> Vec<usize> {
        let mut ids: Vec<usize> = qubits
            .iter()
            .filter_map(|q| self.owner.get(q).copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn open(&mut self, inst: Instruction) {
        let id = self.blocks.len();
        for &q in &inst.qubits {
            self.owner.insert(q, id);
        }
        self.blocks.push(Some(OpenBlock {
            qubits: inst.qubits.clone(),
            instructions: vec![inst],
        }));
    }

    /// Qubit count of the union of `ids` and `qubits`.
    fn width_with(&self, ids: &[usize], qubits: &[QubitId]) -> usize {
        let owned: usize = ids
            .iter()
            .filter_map(|&id| self.blocks[id].as_ref())
            .map(|block| block.qubits.len())
            .sum();
        owned + qubits.iter().filter(|q| !self.owner.contains_key(q)).count()
    }

    /// Move the contents of `others` into block `id`.
    ///
    /// Open blocks never depend on each other, so concatenation keeps a
    /// valid order.
    fn merge(&mut self, id: usize, others: &[usize]) {
        for &other in others {
            let Some(taken) = self.blocks.get_mut(other).and_then(Option::take) else {
                continue;
            };
            for &q in &taken.qubits {
                self.owner.insert(q, id);
            }
            if let Some(Some(block)) = self.blocks.get_mut(id) {
                block.qubits.extend(taken.qubits);
                block.instructions.extend(taken.instructions);
            }
        }
    }

    fn extend(&mut self, id: usize, inst: Instruction) {
        let Some(Some(block)) = self.blocks.get_mut(id) else {
            return;
        };
        for &q in &inst.qubits {
            if !block.qubits.contains(&q) {
                block.qubits.push(q);
                self.owner.insert(q, id);
            }
        }
        block.instructions.push(inst);
    }

    fn close(&mut self, id: usize, out: &mut CircuitDag) -> CompileResult<()> {
        let Some(block) = self.blocks.get_mut(id).and_then(Option::take) else {
            return Ok(());
        };
        for q in &block.qubits {
            self.owner.remove(q);
        }
        let mut qubits = block.qubits;
        qubits.sort_unstable();
        out.apply(make_block(qubits, block.instructions)?)?;
        self.closed += 1;
        Ok(())
    }

    fn close_all(&mut self, ids: &[usize], out: &mut CircuitDag) -> CompileResult<()> {
        for &id in ids {
            self.close(id, out)?;
        }
        Ok(())
    }
}

impl Pass for QuickPartitioner {
    fn name(&self) -> &'static str {
        "QuickPartitioner"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut next = dag.empty_like();
        next.set_global_phase(dag.global_phase());
        let mut partition = Partition::default();

        for (_, inst) in dag.topological_ops() {
            let touching = partition.touching(&inst.qubits);
            let groupable =
                inst.is_gate() && !inst.is_composite() && inst.qubits.len() <= self.block_size;

            if groupable {
                if partition.width_with(&touching, &inst.qubits) <= self.block_size {
                    match touching.split_first() {
                        Some((&id, others)) => {
                            partition.merge(id, others);
                            partition.extend(id, inst.clone());
                        }
                        None => partition.open(inst.clone()),
                    }
                    continue;
                }
                partition.close_all(&touching, &mut next)?;
                partition.open(inst.clone());
            } else {
                partition.close_all(&touching, &mut next)?;
                next.apply(inst.clone())?;
            }
        }

        let open: Vec<usize> = (0..partition.blocks.len()).collect();
        partition.close_all(&open, &mut next)?;

        debug!(
            "Partitioned {} operations into {} blocks of at most {} qubits",
            dag.num_ops(),
            partition.closed,
            self.block_size
        );
        *dag = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftq_ir::{ClbitId, Gate, HasUnitary, StandardGate};

    fn assert_same_unitary(a: &CircuitDag, b: &CircuitDag) {
        let diff = a.unitary().unwrap().as_array() - b.unitary().unwrap().as_array();
        assert!(diff.iter().all(|z| z.norm() < 1e-9));
    }

    fn sample() -> CircuitDag {
        let mut dag = CircuitDag::with_qubits(3);
        for inst in [
            Instruction::single_qubit_gate(StandardGate::H, QubitId(0)),
            Instruction::single_qubit_gate(StandardGate::T, QubitId(0)),
            Instruction::single_qubit_gate(StandardGate::X, QubitId(2)),
            Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)),
            Instruction::single_qubit_gate(StandardGate::Rz(0.3), QubitId(1)),
            Instruction::two_qubit_gate(StandardGate::CX, QubitId(1), QubitId(2)),
            Instruction::single_qubit_gate(StandardGate::S, QubitId(0)),
        ] {
            dag.apply(inst).unwrap();
        }
        dag
    }

    #[test]
    fn test_group_single_qubit_runs() {
        let original = sample();
        let mut dag = original.clone();
        GroupSingleQubitGates
            .run(&mut dag, &mut PropertySet::new())
            .unwrap();
        dag.verify_integrity().unwrap();

        let counts = dag.count_ops();
        assert_eq!(counts[BLOCK_NAME], 4);
        assert_eq!(counts["cx"], 2);
        let first = dag
            .topological_ops()
            .find_map(|(_, inst)| inst.as_gate().and_then(Gate::as_composite).cloned())
            .unwrap();
        assert_eq!(first.num_qubits, 1);
        assert_block_sizes(&dag);
        assert_same_unitary(&original, &dag);
    }

    fn assert_block_sizes(dag: &CircuitDag) {
        let sizes: Vec<usize> = dag
            .topological_ops()
            .filter_map(|(_, inst)| inst.as_gate().and_then(Gate::as_composite))
            .map(|block| block.instructions.len())
            .collect();
        assert_eq!(sizes.iter().sum::<usize>(), 5);
    }

    #[test]
    fn test_group_stops_at_measurement() {
        let mut dag = CircuitDag::with_qubits(1);
        dag.add_clbit(ClbitId(0));
        dag.apply(Instruction::single_qubit_gate(StandardGate::H, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::measure(QubitId(0), ClbitId(0))).unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        GroupSingleQubitGates
            .run(&mut dag, &mut PropertySet::new())
            .unwrap();
        let names: Vec<String> = dag
            .to_instructions()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(names, vec![BLOCK_NAME, "measure", BLOCK_NAME]);
    }

    #[test]
    fn test_quick_partition_respects_size() {
        let original = sample();
        for size in 1..=3 {
            let mut dag = original.clone();
            QuickPartitioner::new(size)
                .unwrap()
                .run(&mut dag, &mut PropertySet::new())
                .unwrap();
            dag.verify_integrity().unwrap();
            for (_, inst) in dag.topological_ops() {
                if inst.is_composite() {
                    assert!(inst.qubits.len() <= size);
                }
            }
            assert_same_unitary(&original, &dag);
        }
    }

    #[test]
    fn test_quick_partition_single_block() {
        let mut dag = sample();
        QuickPartitioner::new(3)
            .unwrap()
            .run(&mut dag, &mut PropertySet::new())
            .unwrap();
        assert_eq!(dag.num_ops(), 1);
        assert_eq!(dag.count_ops()[BLOCK_NAME], 1);
    }

    #[test]
    fn test_quick_partition_wide_gate_passes_through() {
        let mut dag = CircuitDag::with_qubits(3);
        dag.apply(Instruction::gate(
            StandardGate::CCX,
            [QubitId(0), QubitId(1), QubitId(2)],
        ))
        .unwrap();
        QuickPartitioner::new(2)
            .unwrap()
            .run(&mut dag, &mut PropertySet::new())
            .unwrap();
        assert_eq!(dag.count_ops()["ccx"], 1);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        assert!(QuickPartitioner::new(0).is_err());
    }
}
