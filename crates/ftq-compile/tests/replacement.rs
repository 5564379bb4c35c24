//! Integration tests for replacement rules running inside block workflows.

use std::f64::consts::PI;

use ftq_compile::passes::{ForEachBlock, GroupSingleQubitGates, UnfoldPass};
use ftq_compile::rules::{
    ReplacementOutcome, ReplacementRule, UnitaryMatcher, construct_unitary_match_rule,
};
use ftq_compile::{Pass, PassManager, PropertySet};
use ftq_ir::{
    CircuitDag, CompositeGate, HasUnitary, Instruction, QubitId, StandardGate, UnitaryMatrix,
};
use proptest::prelude::*;

/// Helper: the two-qubit circuit with an X-like and a Z-like `U` gate.
fn u_gate_circuit() -> CircuitDag {
    let mut dag = CircuitDag::with_qubits(2);
    dag.apply(Instruction::single_qubit_gate(StandardGate::U(PI, 0.0, PI), QubitId(0)))
        .unwrap();
    dag.apply(Instruction::single_qubit_gate(StandardGate::U(0.0, PI, 0.0), QubitId(1)))
        .unwrap();
    dag.apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)))
        .unwrap();
    dag
}

/// Helper: group, apply `rule` to every block, unfold.
fn rule_workflow(rule: ReplacementRule) -> PassManager {
    let mut manager = PassManager::new();
    manager.add_pass(GroupSingleQubitGates);
    manager.add_pass(ForEachBlock::with_pass(rule));
    manager.add_pass(UnfoldPass);
    manager
}

fn rule_for(gate: StandardGate) -> ReplacementRule {
    ReplacementRule::new(construct_unitary_match_rule(gate.matrix()), gate).unwrap()
}

fn assert_same_unitary(a: &UnitaryMatrix, b: &UnitaryMatrix) {
    let diff = a.as_array() - b.as_array();
    assert!(diff.iter().all(|z| z.norm() < 1e-9), "{a:?} != {b:?}");
}

#[test]
fn test_construct_unitary_match() {
    let x = Instruction::single_qubit_gate(StandardGate::X, QubitId(0));
    let x_match = construct_unitary_match_rule(UnitaryMatrix::x());
    let i_match = construct_unitary_match_rule(UnitaryMatrix::identity(1));
    assert!(x_match.distance(&x).unwrap() < 1e-12);
    assert!(i_match.distance(&x).unwrap() > 0.5);
}

#[test]
fn test_replace_single_qubit() {
    let mut props = PropertySet::new();

    let mut dag = u_gate_circuit();
    let before = dag.unitary().unwrap();
    rule_workflow(rule_for(StandardGate::X))
        .run(&mut dag, &mut props)
        .unwrap();
    let counts = dag.count_ops();
    assert_eq!(counts.get("x"), Some(&1));
    assert!(!counts.contains_key("z"));
    assert_same_unitary(&dag.unitary().unwrap(), &before);

    let mut dag = u_gate_circuit();
    rule_workflow(rule_for(StandardGate::Z))
        .run(&mut dag, &mut props)
        .unwrap();
    let counts = dag.count_ops();
    assert!(!counts.contains_key("x"));
    assert_eq!(counts.get("z"), Some(&1));
    assert_same_unitary(&dag.unitary().unwrap(), &before);
}

#[test]
fn test_any_x_equivalent_fragment_becomes_flat_x() {
    let fragments: Vec<Vec<StandardGate>> = vec![
        vec![StandardGate::H, StandardGate::Z, StandardGate::H],
        vec![StandardGate::SX, StandardGate::SX],
        vec![StandardGate::Rx(PI)],
        vec![StandardGate::Ry(PI / 2.0), StandardGate::Rz(PI), StandardGate::Ry(-PI / 2.0)],
        vec![StandardGate::U(PI, 0.3, PI + 0.3)],
    ];
    let rule = rule_for(StandardGate::X);
    for fragment in fragments {
        let mut region = CircuitDag::with_qubits(1);
        for gate in &fragment {
            region
                .apply(Instruction::single_qubit_gate(*gate, QubitId(0)))
                .unwrap();
        }
        let before = region.unitary().unwrap();
        assert_eq!(rule.apply(&mut region).unwrap(), ReplacementOutcome::Replaced);

        let instructions = region.to_instructions();
        assert_eq!(instructions.len(), 1, "{fragment:?}");
        assert_eq!(instructions[0].name(), "x");
        assert!(!instructions[0].is_composite());
        assert_same_unitary(&region.unitary().unwrap(), &before);
    }
}

#[test]
fn test_arity_guard_leaves_region_untouched() {
    let rule = rule_for(StandardGate::X);
    let mut region = CircuitDag::with_qubits(2);
    region
        .apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1)))
        .unwrap();
    region.set_global_phase(0.5);
    let before = region.to_instructions();

    assert_eq!(rule.apply(&mut region).unwrap(), ReplacementOutcome::NotApplicable);
    assert_eq!(region.to_instructions(), before);
    assert_eq!(region.global_phase(), 0.5);
}

#[test]
fn test_circuit_replacement() {
    // SWAP as three CX gates.
    let mut fragment = CircuitDag::with_qubits(2);
    for (c, t) in [(0, 1), (1, 0), (0, 1)] {
        fragment
            .apply(Instruction::two_qubit_gate(StandardGate::CX, QubitId(c), QubitId(t)))
            .unwrap();
    }
    let rule = ReplacementRule::new(construct_unitary_match_rule(UnitaryMatrix::swap()), fragment)
        .unwrap()
        .with_name("swap_to_cx");
    assert_eq!(rule.name(), "swap_to_cx");

    let mut dag = CircuitDag::with_qubits(2);
    dag.apply(Instruction::two_qubit_gate(StandardGate::Swap, QubitId(0), QubitId(1)))
        .unwrap();
    let before = dag.unitary().unwrap();
    rule.run(&mut dag, &mut PropertySet::new()).unwrap();
    assert_eq!(dag.count_ops()["cx"], 3);
    assert_same_unitary(&dag.unitary().unwrap(), &before);
}

#[test]
fn test_composite_replacement_is_unfolded() {
    let inner = CompositeGate::new(
        "inner",
        1,
        vec![
            Instruction::single_qubit_gate(StandardGate::S, QubitId(0)),
            Instruction::single_qubit_gate(StandardGate::S, QubitId(0)),
        ],
    )
    .unwrap();
    let rule = ReplacementRule::new(
        construct_unitary_match_rule(UnitaryMatrix::z()),
        ftq_ir::Gate::composite(inner),
    )
    .unwrap();
    assert_eq!(rule.replacement().count_ops()["s"], 2);
    assert!(rule.replacement().topological_ops().all(|(_, i)| !i.is_composite()));
}

proptest! {
    #[test]
    fn prop_matcher_ignores_global_phase(
        theta in -PI..PI,
        phi in -PI..PI,
        lambda in -PI..PI,
        phase in -10.0f64..10.0,
    ) {
        let reference = UnitaryMatrix::u(theta, phi, lambda);
        let matcher = UnitaryMatcher::new(reference.clone(), 1e-8).unwrap();
        let shifted = reference.with_global_phase(phase);
        prop_assert!(matcher.distance(&shifted).unwrap() < 1e-10);
    }

    #[test]
    fn prop_replacement_idempotent(theta in -PI..PI, phase in -PI..PI) {
        let rule = rule_for(StandardGate::H);
        let mut region = CircuitDag::with_qubits(1);
        // H up to phase, reached through a rotation pair.
        region
            .apply(Instruction::single_qubit_gate(StandardGate::Ry(PI / 2.0), QubitId(0)))
            .unwrap();
        region
            .apply(Instruction::single_qubit_gate(StandardGate::Rx(PI), QubitId(0)))
            .unwrap();
        region
            .apply(Instruction::single_qubit_gate(StandardGate::Rz(theta), QubitId(0)))
            .unwrap();
        region
            .apply(Instruction::single_qubit_gate(StandardGate::Rz(-theta), QubitId(0)))
            .unwrap();
        region.set_global_phase(phase);

        prop_assert_eq!(rule.apply(&mut region).unwrap(), ReplacementOutcome::Replaced);
        let once = region.to_instructions();
        let once_phase = region.global_phase();
        prop_assert_eq!(rule.apply(&mut region).unwrap(), ReplacementOutcome::Replaced);
        prop_assert_eq!(region.to_instructions(), once);
        prop_assert!((region.global_phase() - once_phase).abs() < 1e-9);
    }
}
