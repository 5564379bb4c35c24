//! DAG-based circuit representation.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex as PetNodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};
use crate::unitary::{HasUnitary, UnitaryMatrix};

/// Node index type for the circuit DAG.
///
/// Indices are stable: removing or splicing one operation never changes the
/// index of any other node.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, DagNode::Op(_))
    }

    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

impl From<QubitId> for WireId {
    fn from(q: QubitId) -> Self {
        WireId::Qubit(q)
    }
}

impl From<ClbitId> for WireId {
    fn from(c: ClbitId) -> Self {
        WireId::Clbit(c)
    }
}

/// An edge in the circuit DAG representing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

fn wires_of(instruction: &Instruction) -> Vec<WireId> {
    instruction
        .qubits
        .iter()
        .map(|&q| WireId::Qubit(q))
        .chain(instruction.clbits.iter().map(|&c| WireId::Clbit(c)))
        .collect()
}

/// DAG-based circuit representation.
///
/// The circuit is represented as a directed acyclic graph where:
/// - Nodes are either input nodes, output nodes, or operation nodes
/// - Edges represent wires (quantum or classical)
/// - Each wire has exactly one input and one output node
/// - Operations are connected to wires in placement order
///
/// The graph is a [`StableDiGraph`], so [`NodeIndex`] handles collected
/// before a mutation remain valid for every node the mutation did not
/// remove. Rewrite passes rely on this to snapshot handles and then edit
/// the circuit in place.
#[derive(Debug, Clone)]
pub struct CircuitDag {
    /// The underlying graph.
    graph: StableDiGraph<DagNode, DagEdge, u32>,
    /// Map from qubit to its input node.
    qubit_inputs: FxHashMap<QubitId, NodeIndex>,
    /// Map from qubit to its output node.
    qubit_outputs: FxHashMap<QubitId, NodeIndex>,
    /// Map from classical bit to its input node.
    clbit_inputs: FxHashMap<ClbitId, NodeIndex>,
    /// Map from classical bit to its output node.
    clbit_outputs: FxHashMap<ClbitId, NodeIndex>,
    /// Wire front: maps each wire to the node just before the output node.
    wire_front: FxHashMap<WireId, NodeIndex>,
    /// Global phase of the circuit.
    global_phase: f64,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::default(),
            qubit_inputs: FxHashMap::default(),
            qubit_outputs: FxHashMap::default(),
            clbit_inputs: FxHashMap::default(),
            clbit_outputs: FxHashMap::default(),
            wire_front: FxHashMap::default(),
            global_phase: 0.0,
        }
    }

    /// Create an empty DAG over qubits `0..num_qubits`.
    pub fn with_qubits(num_qubits: u32) -> Self {
        let mut dag = Self::new();
        for q in 0..num_qubits {
            dag.add_qubit(QubitId(q));
        }
        dag
    }

    /// Build a DAG over qubits `0..num_qubits` from instructions in order.
    ///
    /// Classical bits referenced by the instructions are added on demand.
    pub fn from_instructions(
        num_qubits: u32,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<Self> {
        let mut dag = Self::with_qubits(num_qubits);
        for inst in instructions {
            for &clbit in &inst.clbits {
                dag.add_clbit(clbit);
            }
            dag.apply(inst)?;
        }
        Ok(dag)
    }

    /// Create an empty DAG with the same wires as this one and no phase.
    pub fn empty_like(&self) -> Self {
        let mut dag = Self::new();
        for qubit in self.qubits() {
            dag.add_qubit(qubit);
        }
        for clbit in self.clbits() {
            dag.add_clbit(clbit);
        }
        dag
    }

    /// Add a qubit to the circuit.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.qubit_inputs.contains_key(&qubit) {
            return;
        }
        let wire = WireId::Qubit(qubit);
        let (in_node, out_node) = self.add_wire(wire);
        self.qubit_inputs.insert(qubit, in_node);
        self.qubit_outputs.insert(qubit, out_node);
    }

    /// Add a classical bit to the circuit.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.clbit_inputs.contains_key(&clbit) {
            return;
        }
        let wire = WireId::Clbit(clbit);
        let (in_node, out_node) = self.add_wire(wire);
        self.clbit_inputs.insert(clbit, in_node);
        self.clbit_outputs.insert(clbit, out_node);
    }

    fn add_wire(&mut self, wire: WireId) -> (NodeIndex, NodeIndex) {
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        // Initially the input node is the predecessor of the output.
        self.wire_front.insert(wire, in_node);
        (in_node, out_node)
    }

    fn output_node(&self, wire: WireId) -> Option<NodeIndex> {
        match wire {
            WireId::Qubit(q) => self.qubit_outputs.get(&q).copied(),
            WireId::Clbit(c) => self.clbit_outputs.get(&c).copied(),
        }
    }

    /// Check arity, operand existence and operand uniqueness.
    #[allow(clippy::cast_possible_truncation)]
    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits() as usize;
            let got = instruction.qubits.len();
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected: expected as u32,
                    got: got as u32,
                });
            }
        }

        for &qubit in &instruction.qubits {
            if !self.qubit_inputs.contains_key(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if !self.clbit_inputs.contains_key(&clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Apply an instruction at the end of the circuit.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.validate(&instruction)?;

        let wires = wires_of(&instruction);
        let op_node = self.graph.add_node(DagNode::Op(instruction));

        for wire in wires {
            let out_node = self.output_node(wire).ok_or_else(|| {
                IrError::InvalidDag(format!("Missing output node for wire {wire:?}"))
            })?;
            let prev_node = self.wire_front[&wire];

            let edge_id = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == wire && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!(
                        "Missing edge from predecessor to output for wire {wire:?}"
                    ))
                })?;
            self.graph.remove_edge(edge_id);
            self.graph.add_edge(prev_node, op_node, DagEdge { wire });
            self.graph.add_edge(op_node, out_node, DagEdge { wire });
            self.wire_front.insert(wire, op_node);
        }

        Ok(op_node)
    }

    /// All nodes in a deterministic topological order.
    ///
    /// Among nodes that are ready at the same time the lowest index wins.
    fn topological_nodes(&self) -> Vec<NodeIndex> {
        let mut indegree: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut ready = BinaryHeap::new();
        for node in self.graph.node_indices() {
            let degree = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .count();
            if degree == 0 {
                ready.push(Reverse(node));
            } else {
                indegree.insert(node, degree);
            }
        }

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                let target = edge.target();
                if let Some(degree) = indegree.get_mut(&target) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(target));
                    }
                }
            }
        }
        order
    }

    /// Iterate over operations in topological order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.topological_nodes()
            .into_iter()
            .filter_map(move |idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    /// Layer (cycle) index of every operation node.
    ///
    /// An operation sits one layer after the latest operation it depends on;
    /// operations with no predecessors are in layer 0.
    fn cycles(&self) -> (Vec<NodeIndex>, FxHashMap<NodeIndex, usize>) {
        let order = self.topological_nodes();
        let mut cycles: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(order.len(), Default::default());
        for &node in &order {
            if !self.graph[node].is_op() {
                continue;
            }
            let cycle = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .filter_map(|e| cycles.get(&e.source()).map(|c| c + 1))
                .max()
                .unwrap_or(0);
            cycles.insert(node, cycle);
        }
        (order, cycles)
    }

    /// Operations with their cycle index, ordered by cycle.
    ///
    /// With `reverse` set, the order is reversed: later cycles come first.
    pub fn operations_with_cycles(&self, reverse: bool) -> Vec<(usize, NodeIndex, &Instruction)> {
        let (order, cycles) = self.cycles();
        let mut ops: Vec<_> = order
            .into_iter()
            .filter_map(|idx| {
                let inst = self.graph[idx].instruction()?;
                Some((cycles[&idx], idx, inst))
            })
            .collect();
        ops.sort_by_key(|(cycle, _, _)| *cycle);
        if reverse {
            ops.reverse();
        }
        ops
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    /// Replace the instruction at `node` by one acting on the same wires.
    ///
    /// Returns the previous instruction.
    pub fn replace_op(&mut self, node: NodeIndex, instruction: Instruction) -> IrResult<Instruction> {
        let old = self.get_instruction(node).ok_or(IrError::InvalidNode)?;
        let old_wires: FxHashSet<WireId> = wires_of(old).into_iter().collect();
        let new_wires: FxHashSet<WireId> = wires_of(&instruction).into_iter().collect();
        if old_wires != new_wires {
            return Err(IrError::InvalidDag(format!(
                "Replacement '{}' does not act on the wires of '{}'",
                instruction.name(),
                old.name()
            )));
        }
        self.validate(&instruction)?;

        let previous = std::mem::replace(&mut self.graph[node], DagNode::Op(instruction));
        match previous {
            DagNode::Op(inst) => Ok(inst),
            _ => Err(IrError::InvalidNode),
        }
    }

    /// Replace the operation at `node` by a sequence of instructions, in place.
    ///
    /// The replacement may only touch wires of the replaced operation. It is
    /// wired between the operation's predecessors and successors, so its
    /// position in the circuit is preserved. Handles of all other nodes stay
    /// valid. Nothing is modified if validation fails.
    pub fn splice_op(
        &mut self,
        node: NodeIndex,
        replacement: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<Vec<NodeIndex>> {
        self.splice(node, replacement.into_iter().collect())
            .map(|(_, nodes)| nodes)
    }

    /// Remove an operation, reconnecting its wires.
    pub fn remove_op(&mut self, node: NodeIndex) -> IrResult<Instruction> {
        self.splice(node, vec![]).map(|(old, _)| old)
    }

    fn splice(
        &mut self,
        node: NodeIndex,
        replacement: Vec<Instruction>,
    ) -> IrResult<(Instruction, Vec<NodeIndex>)> {
        let old = self.get_instruction(node).ok_or(IrError::InvalidNode)?;
        let wires: FxHashSet<WireId> = wires_of(old).into_iter().collect();

        for inst in &replacement {
            self.validate(inst)?;
            for wire in wires_of(inst) {
                if !wires.contains(&wire) {
                    return Err(match wire {
                        WireId::Qubit(qubit) => IrError::WireOutsideOperation {
                            gate_name: old.name().to_string(),
                            qubit,
                        },
                        WireId::Clbit(clbit) => IrError::InvalidDag(format!(
                            "Replacement for '{}' writes {clbit}, which the operation does not touch",
                            old.name()
                        )),
                    });
                }
            }
        }

        let mut fronts: FxHashMap<WireId, NodeIndex> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (e.weight().wire, e.source()))
            .collect();
        let successors: FxHashMap<WireId, NodeIndex> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.weight().wire, e.target()))
            .collect();
        if fronts.len() != wires.len() || successors.len() != wires.len() {
            return Err(IrError::InvalidDag(format!(
                "Operation node {node:?} is not connected on all of its wires"
            )));
        }
        let tail_wires: Vec<WireId> = wires
            .iter()
            .copied()
            .filter(|w| self.wire_front.get(w) == Some(&node))
            .collect();

        let Some(DagNode::Op(old)) = self.graph.remove_node(node) else {
            return Err(IrError::InvalidNode);
        };

        let mut new_nodes = Vec::with_capacity(replacement.len());
        for inst in replacement {
            let inst_wires = wires_of(&inst);
            let new_node = self.graph.add_node(DagNode::Op(inst));
            for wire in inst_wires {
                let prev = fronts[&wire];
                self.graph.add_edge(prev, new_node, DagEdge { wire });
                fronts.insert(wire, new_node);
            }
            new_nodes.push(new_node);
        }

        for (wire, succ) in successors {
            let prev = fronts[&wire];
            self.graph.add_edge(prev, succ, DagEdge { wire });
        }
        for wire in tail_wires {
            self.wire_front.insert(wire, fronts[&wire]);
        }

        Ok((old, new_nodes))
    }

    /// Replace the whole contents of this circuit with a copy of `other`.
    ///
    /// `other` must have the same number of qubits; its qubits are mapped
    /// onto this circuit's qubits in ascending order. The new contents are
    /// built completely before they are swapped in.
    pub fn replace_with(&mut self, other: &CircuitDag) -> IrResult<()> {
        if other.num_qubits() != self.num_qubits() {
            return Err(IrError::DimensionMismatch {
                expected: self.num_qubits(),
                got: other.num_qubits(),
            });
        }
        let lookup: FxHashMap<QubitId, QubitId> =
            other.qubits().into_iter().zip(self.qubits()).collect();

        let mut next = self.empty_like();
        for (_, inst) in other.topological_ops() {
            let mut copy = inst.clone();
            for q in &mut copy.qubits {
                *q = lookup[q];
            }
            for &clbit in &copy.clbits {
                next.add_clbit(clbit);
            }
            next.apply(copy)?;
        }
        next.global_phase = other.global_phase;
        *self = next;
        Ok(())
    }

    /// Instructions in topological order.
    pub fn to_instructions(&self) -> Vec<Instruction> {
        self.topological_ops().map(|(_, inst)| inst.clone()).collect()
    }

    /// Expand every composite block into its primitive instructions.
    ///
    /// Block phases are folded into the circuit's global phase. Returns the
    /// number of blocks unfolded.
    pub fn unfold_all(&mut self) -> IrResult<usize> {
        if !self.topological_ops().any(|(_, inst)| inst.is_composite()) {
            return Ok(0);
        }

        let mut next = self.empty_like();
        let mut phase = self.global_phase;
        let mut unfolded = 0;
        for (_, inst) in self.topological_ops() {
            match inst.as_gate().and_then(Gate::as_composite) {
                Some(block) => {
                    let (flat, block_phase) = block.flatten();
                    phase += block_phase;
                    for primitive in flat {
                        next.apply(primitive.remapped(&inst.qubits))?;
                    }
                    unfolded += 1;
                }
                None => {
                    next.apply(inst.clone())?;
                }
            }
        }
        next.global_phase = phase;
        *self = next;
        Ok(unfolded)
    }

    /// Count operations by name.
    pub fn count_ops(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for inst in self
            .graph
            .node_indices()
            .filter_map(|n| self.graph[n].instruction())
        {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubit_inputs.len()
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.clbit_inputs.len()
    }

    /// Get the number of operations.
    ///
    /// Computed as total nodes minus input and output nodes (2 per qubit + 2 per clbit).
    #[inline]
    pub fn num_ops(&self) -> usize {
        let io_nodes = 2 * (self.qubit_inputs.len() + self.clbit_inputs.len());
        self.graph.node_count().saturating_sub(io_nodes)
    }

    /// Calculate the circuit depth.
    pub fn depth(&self) -> usize {
        let (_, cycles) = self.cycles();
        cycles.values().max().map_or(0, |c| c + 1)
    }

    /// Qubits in ascending order.
    pub fn qubits(&self) -> Vec<QubitId> {
        let mut qubits: Vec<QubitId> = self.qubit_inputs.keys().copied().collect();
        qubits.sort_unstable();
        qubits
    }

    /// Classical bits in ascending order.
    pub fn clbits(&self) -> Vec<ClbitId> {
        let mut clbits: Vec<ClbitId> = self.clbit_inputs.keys().copied().collect();
        clbits.sort_unstable();
        clbits
    }

    /// Get the global phase.
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.global_phase = phase;
    }

    /// Add to the global phase.
    pub fn add_global_phase(&mut self, delta: f64) {
        self.global_phase += delta;
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &StableDiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Verify the structural integrity of the DAG.
    ///
    /// Checks that:
    /// - Every wire has exactly one In node and one Out node
    /// - Each wire forms an unbroken path from In to Out
    /// - The graph is acyclic and every node is reachable
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidDag("Graph contains a cycle".into()));
        }

        let qubit_wires = self
            .qubit_inputs
            .iter()
            .map(|(&q, &n)| (WireId::Qubit(q), n));
        let clbit_wires = self
            .clbit_inputs
            .iter()
            .map(|(&c, &n)| (WireId::Clbit(c), n));

        for (wire, in_node) in qubit_wires.chain(clbit_wires) {
            let out_node = self.output_node(wire).ok_or_else(|| {
                IrError::InvalidDag(format!("Wire {wire:?} has an In node but no Out node"))
            })?;

            let mut current = in_node;
            let mut steps = 0;
            let max_steps = self.graph.node_count();
            while current != out_node {
                current = self
                    .graph
                    .edges_directed(current, Direction::Outgoing)
                    .find(|e| e.weight().wire == wire)
                    .map(|e| e.target())
                    .ok_or_else(|| {
                        IrError::InvalidDag(format!(
                            "Wire {wire:?} is broken: no outgoing edge from node {current:?}"
                        ))
                    })?;
                steps += 1;
                if steps > max_steps {
                    return Err(IrError::InvalidDag(format!(
                        "Wire {wire:?} has too many steps (possible infinite loop)"
                    )));
                }
            }
        }

        if self.topological_nodes().len() != self.graph.node_count() {
            return Err(IrError::InvalidDag(
                "Unreachable operation node found in DAG".into(),
            ));
        }

        Ok(())
    }
}

impl Default for CircuitDag {
    fn default() -> Self {
        Self::new()
    }
}

impl HasUnitary for CircuitDag {
    /// Unitary of the whole circuit including its global phase.
    ///
    /// Qubits are laid out in ascending id order, the smallest id being the
    /// most significant bit.
    #[allow(clippy::cast_possible_truncation)]
    fn unitary(&self) -> IrResult<UnitaryMatrix> {
        let position: FxHashMap<QubitId, usize> = self
            .qubits()
            .into_iter()
            .enumerate()
            .map(|(i, q)| (q, i))
            .collect();
        let mut acc = UnitaryMatrix::identity(self.num_qubits() as u32);
        for (_, inst) in self.topological_ops() {
            let targets: Vec<usize> = inst.qubits.iter().map(|q| position[q]).collect();
            acc = acc.apply_on(&inst.unitary()?, &targets)?;
        }
        Ok(acc.with_global_phase(self.global_phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;
    use std::f64::consts::PI;

    fn h(q: u32) -> Instruction {
        Instruction::single_qubit_gate(StandardGate::H, QubitId(q))
    }

    fn cx(c: u32, t: u32) -> Instruction {
        Instruction::two_qubit_gate(StandardGate::CX, QubitId(c), QubitId(t))
    }

    #[test]
    fn test_empty_dag() {
        let dag = CircuitDag::new();
        assert_eq!(dag.num_qubits(), 0);
        assert_eq!(dag.num_ops(), 0);
        assert_eq!(dag.depth(), 0);
    }

    #[test]
    fn test_apply_and_order() {
        let dag = CircuitDag::from_instructions(2, [h(0), cx(0, 1), h(1)]).unwrap();
        assert_eq!(dag.num_ops(), 3);
        assert_eq!(dag.depth(), 3);
        let names: Vec<_> = dag.topological_ops().map(|(_, i)| i.name().to_string()).collect();
        assert_eq!(names, vec!["h", "cx", "h"]);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_apply_validation() {
        let mut dag = CircuitDag::with_qubits(2);
        let bad_arity = Instruction::gate(StandardGate::CX, [QubitId(0)]);
        assert!(matches!(
            dag.apply(bad_arity),
            Err(IrError::QubitCountMismatch { .. })
        ));
        assert!(matches!(
            dag.apply(h(5)),
            Err(IrError::QubitNotFound { .. })
        ));
        assert!(matches!(
            dag.apply(cx(1, 1)),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert_eq!(dag.num_ops(), 0);
    }

    #[test]
    fn test_cycles_and_reverse_order() {
        let dag = CircuitDag::from_instructions(2, [h(0), h(1), cx(0, 1)]).unwrap();
        let forward = dag.operations_with_cycles(false);
        assert_eq!(forward[0].0, 0);
        assert_eq!(forward[1].0, 0);
        assert_eq!(forward[2].0, 1);
        let reverse = dag.operations_with_cycles(true);
        assert_eq!(reverse[0].2.name(), "cx");
        assert_eq!(reverse[0].0, 1);
    }

    #[test]
    fn test_splice_preserves_position() {
        let mut dag = CircuitDag::from_instructions(2, [h(0), cx(0, 1)]).unwrap();
        let h_node = dag.topological_ops().next().map(|(n, _)| n).unwrap();
        let cx_node = dag.topological_ops().nth(1).map(|(n, _)| n).unwrap();

        let before = dag.unitary().unwrap();
        // H = S · SX · S up to phase
        let new_nodes = dag
            .splice_op(
                h_node,
                [
                    Instruction::single_qubit_gate(StandardGate::S, QubitId(0)),
                    Instruction::single_qubit_gate(StandardGate::SX, QubitId(0)),
                    Instruction::single_qubit_gate(StandardGate::S, QubitId(0)),
                ],
            )
            .unwrap();
        assert_eq!(new_nodes.len(), 3);
        dag.verify_integrity().unwrap();

        // The CX is still last and its handle is still valid.
        assert_eq!(dag.get_instruction(cx_node).unwrap().name(), "cx");
        let names: Vec<_> = dag.topological_ops().map(|(_, i)| i.name().to_string()).collect();
        assert_eq!(names, vec!["s", "sx", "s", "cx"]);
        assert!(dag.unitary().unwrap().distance_from(&before) < 1e-12);
    }

    #[test]
    fn test_splice_rejects_foreign_wire() {
        let mut dag = CircuitDag::from_instructions(2, [h(0), h(1)]).unwrap();
        let node = dag.topological_ops().next().map(|(n, _)| n).unwrap();
        let result = dag.splice_op(node, [h(1)]);
        assert!(matches!(result, Err(IrError::WireOutsideOperation { .. })));
        assert_eq!(dag.num_ops(), 2);
        dag.verify_integrity().unwrap();
    }

    #[test]
    fn test_remove_op_then_apply() {
        let mut dag = CircuitDag::from_instructions(2, [h(0), cx(0, 1)]).unwrap();
        let cx_node = dag.topological_ops().nth(1).map(|(n, _)| n).unwrap();
        let removed = dag.remove_op(cx_node).unwrap();
        assert_eq!(removed.name(), "cx");
        assert_eq!(dag.num_ops(), 1);
        dag.verify_integrity().unwrap();

        // The wire front was updated so appending still works.
        dag.apply(h(1)).unwrap();
        dag.verify_integrity().unwrap();
        assert_eq!(dag.num_ops(), 2);
    }

    #[test]
    fn test_replace_op_same_wires() {
        let mut dag = CircuitDag::from_instructions(1, [h(0)]).unwrap();
        let node = dag.topological_ops().next().map(|(n, _)| n).unwrap();
        let old = dag
            .replace_op(node, Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        assert_eq!(old.name(), "h");
        assert_eq!(dag.get_instruction(node).unwrap().name(), "x");
    }

    #[test]
    fn test_replace_with_maps_qubits() {
        let mut region = CircuitDag::new();
        region.add_qubit(QubitId(3));
        region
            .apply(Instruction::single_qubit_gate(StandardGate::Rz(0.3), QubitId(3)))
            .unwrap();

        let mut replacement = CircuitDag::with_qubits(1);
        replacement
            .apply(Instruction::single_qubit_gate(StandardGate::T, QubitId(0)))
            .unwrap();
        replacement.set_global_phase(0.5);

        region.replace_with(&replacement).unwrap();
        let ops = region.to_instructions();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].qubits, vec![QubitId(3)]);
        assert!((region.global_phase() - 0.5).abs() < 1e-15);

        let wide = CircuitDag::with_qubits(2);
        assert!(region.replace_with(&wide).is_err());
    }

    #[test]
    fn test_unfold_all_folds_phase() {
        use crate::gate::CompositeGate;

        let block = CompositeGate::new("blk", 2, vec![h(0), cx(0, 1)])
            .unwrap()
            .with_global_phase(PI / 3.0);
        let mut dag = CircuitDag::with_qubits(3);
        dag.apply(Instruction::gate(block, [QubitId(2), QubitId(0)]))
            .unwrap();
        let before = dag.unitary().unwrap();

        assert_eq!(dag.unfold_all().unwrap(), 1);
        assert_eq!(dag.num_ops(), 2);
        assert!((dag.global_phase() - PI / 3.0).abs() < 1e-15);
        let after = dag.unitary().unwrap();
        assert!((after.get(0, 0) - before.get(0, 0)).norm() < 1e-12);
        assert!(after.distance_from(&before) < 1e-12);
        assert_eq!(dag.unfold_all().unwrap(), 0);
    }

    #[test]
    fn test_unitary_includes_global_phase() {
        let mut dag = CircuitDag::with_qubits(1);
        dag.set_global_phase(PI);
        let u = dag.unitary().unwrap();
        assert!((u.get(0, 0).re + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_count_ops() {
        let dag = CircuitDag::from_instructions(2, [h(0), h(1), cx(0, 1)]).unwrap();
        let counts = dag.count_ops();
        assert_eq!(counts["h"], 2);
        assert_eq!(counts["cx"], 1);
    }
}
