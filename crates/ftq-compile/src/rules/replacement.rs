//! Replacement rules: swap a matching region for a fixed fragment.

use tracing::trace;

use ftq_ir::{CircuitDag, Gate, HasUnitary, Instruction, QubitId, StandardGate, UnitaryMatrix};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::rules::matcher::MatchRule;

/// What a rule replaces a matching region with.
#[derive(Debug, Clone)]
pub enum Replacement {
    /// A single gate applied to all qubits of the region, in order.
    Gate(Gate),
    /// A complete circuit fragment.
    Circuit(CircuitDag),
}

impl From<Gate> for Replacement {
    fn from(gate: Gate) -> Self {
        Replacement::Gate(gate)
    }
}

impl From<StandardGate> for Replacement {
    fn from(gate: StandardGate) -> Self {
        Replacement::Gate(gate.into())
    }
}

impl From<CircuitDag> for Replacement {
    fn from(fragment: CircuitDag) -> Self {
        Replacement::Circuit(fragment)
    }
}

/// Result of applying a rule to one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementOutcome {
    /// The region's width differs from the replacement's.
    NotApplicable,
    /// The indicator rejected the region.
    NoMatch,
    /// The region now holds a copy of the replacement.
    Replaced,
}

/// Replaces a region with a fixed fragment whenever the indicator accepts it.
///
/// Regions are usually the blocks produced by a partitioner, visited with
/// [`ForEachBlock`](crate::passes::ForEachBlock). A region only qualifies
/// when its width equals the fragment's. On replacement the region's global
/// phase is chosen so its unitary does not change.
pub struct ReplacementRule {
    name: String,
    indicator: Box<dyn MatchRule>,
    replacement: CircuitDag,
    replacement_unitary: Option<UnitaryMatrix>,
}

impl ReplacementRule {
    /// Create a rule.
    ///
    /// A gate replacement is wrapped into a fragment as wide as the gate and
    /// flattened to primitive gates. Zero-width replacements are rejected.
    pub fn new(
        indicator: impl MatchRule + 'static,
        replacement: impl Into<Replacement>,
    ) -> CompileResult<Self> {
        let replacement = match replacement.into() {
            Replacement::Gate(gate) => {
                let width = gate.num_qubits();
                let mut fragment = CircuitDag::with_qubits(width);
                if width > 0 {
                    fragment.apply(Instruction::gate(gate, (0..width).map(QubitId)))?;
                    fragment.unfold_all()?;
                }
                fragment
            }
            Replacement::Circuit(fragment) => fragment,
        };
        if replacement.num_qubits() == 0 {
            return Err(CompileError::InvalidConfiguration(
                "replacement must act on at least one qubit".into(),
            ));
        }
        let replacement_unitary = replacement.unitary().ok();
        Ok(Self {
            name: "replacement_rule".into(),
            indicator: Box::new(indicator),
            replacement,
            replacement_unitary,
        })
    }

    /// Set the name reported by the pass.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The fragment substituted for matching regions.
    pub fn replacement(&self) -> &CircuitDag {
        &self.replacement
    }

    /// Apply the rule to a region.
    ///
    /// The substitute is built completely before it is swapped in, so a
    /// failure leaves the region untouched.
    pub fn apply(&self, region: &mut CircuitDag) -> CompileResult<ReplacementOutcome> {
        if region.num_qubits() != self.replacement.num_qubits() {
            return Ok(ReplacementOutcome::NotApplicable);
        }
        if !self.indicator.matches(region) {
            return Ok(ReplacementOutcome::NoMatch);
        }

        let mut fragment = self.replacement.clone();
        if let (Ok(target), Some(reference)) = (region.unitary(), &self.replacement_unitary) {
            fragment.add_global_phase(target.phase_relative_to(reference)?);
        }
        region.replace_with(&fragment)?;
        Ok(ReplacementOutcome::Replaced)
    }
}

impl std::fmt::Debug for ReplacementRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplacementRule")
            .field("name", &self.name)
            .field("replacement", &self.replacement.to_instructions())
            .finish_non_exhaustive()
    }
}

impl Pass for ReplacementRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let outcome = self.apply(dag)?;
        trace!(rule = %self.name, ?outcome, "Applied replacement rule");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::matcher::construct_unitary_match_rule;
    use ftq_ir::{CompositeGate, CustomGate};
    use std::f64::consts::PI;

    fn region(gates: &[StandardGate]) -> CircuitDag {
        CircuitDag::from_instructions(
            1,
            gates
                .iter()
                .map(|&g| Instruction::single_qubit_gate(g, QubitId(0))),
        )
        .unwrap()
    }

    fn x_rule() -> ReplacementRule {
        ReplacementRule::new(construct_unitary_match_rule(UnitaryMatrix::x()), StandardGate::X)
            .unwrap()
    }

    #[test]
    fn test_gate_replacement_is_flat() {
        let block = CompositeGate::new(
            "hh",
            1,
            vec![
                Instruction::single_qubit_gate(StandardGate::H, QubitId(0)),
                Instruction::single_qubit_gate(StandardGate::Z, QubitId(0)),
                Instruction::single_qubit_gate(StandardGate::H, QubitId(0)),
            ],
        )
        .unwrap();
        let rule = ReplacementRule::new(
            construct_unitary_match_rule(UnitaryMatrix::x()),
            Gate::composite(block),
        )
        .unwrap();
        assert_eq!(rule.replacement().num_ops(), 3);
        assert!(!rule.replacement().topological_ops().any(|(_, i)| i.is_composite()));
    }

    #[test]
    fn test_zero_width_rejected() {
        let matcher = construct_unitary_match_rule(UnitaryMatrix::identity(1));
        let empty = Gate::custom(CustomGate::new("nothing", 0));
        assert!(matches!(
            ReplacementRule::new(matcher.clone(), empty),
            Err(CompileError::InvalidConfiguration(_))
        ));
        assert!(ReplacementRule::new(matcher, CircuitDag::new()).is_err());
    }

    #[test]
    fn test_width_mismatch_not_applicable() {
        let mut dag = CircuitDag::with_qubits(2);
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        let before = dag.to_instructions();
        assert_eq!(x_rule().apply(&mut dag).unwrap(), ReplacementOutcome::NotApplicable);
        assert_eq!(dag.to_instructions(), before);
    }

    #[test]
    fn test_no_match_leaves_region() {
        let mut dag = region(&[StandardGate::H]);
        assert_eq!(x_rule().apply(&mut dag).unwrap(), ReplacementOutcome::NoMatch);
        assert_eq!(dag.count_ops()["h"], 1);
    }

    #[test]
    fn test_replacement_preserves_unitary() {
        // Rx(π) = -i·X
        let mut dag = region(&[StandardGate::Rx(PI / 2.0), StandardGate::Rx(PI / 2.0)]);
        let before = dag.unitary().unwrap();

        assert_eq!(x_rule().apply(&mut dag).unwrap(), ReplacementOutcome::Replaced);
        assert_eq!(dag.num_ops(), 1);
        assert_eq!(dag.count_ops()["x"], 1);

        let after = dag.unitary().unwrap();
        let diff = before.as_array() - after.as_array();
        assert!(diff.iter().all(|z| z.norm() < 1e-9));
    }

    #[test]
    fn test_replacement_is_idempotent() {
        let mut dag = region(&[StandardGate::Y, StandardGate::Z]);
        let rule = x_rule();
        assert_eq!(rule.apply(&mut dag).unwrap(), ReplacementOutcome::Replaced);
        let once = dag.to_instructions();
        let phase = dag.global_phase();

        assert_eq!(rule.apply(&mut dag).unwrap(), ReplacementOutcome::Replaced);
        assert_eq!(dag.to_instructions(), once);
        assert!((dag.global_phase() - phase).abs() < 1e-9);
    }

    #[test]
    fn test_empty_region_with_identity_rule() {
        let rule = ReplacementRule::new(
            construct_unitary_match_rule(UnitaryMatrix::identity(1)),
            StandardGate::I,
        )
        .unwrap();
        let mut dag = CircuitDag::with_qubits(1);
        assert_eq!(rule.apply(&mut dag).unwrap(), ReplacementOutcome::Replaced);
        assert_eq!(dag.count_ops()["id"], 1);
    }

    #[test]
    fn test_rule_as_pass() {
        let rule = x_rule().with_name("replace_x");
        assert_eq!(rule.name(), "replace_x");
        let mut dag = region(&[StandardGate::SX, StandardGate::SX]);
        rule.run(&mut dag, &mut PropertySet::new()).unwrap();
        assert_eq!(dag.count_ops()["x"], 1);
    }
}
