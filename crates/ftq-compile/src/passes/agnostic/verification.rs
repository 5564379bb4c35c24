//! Analysis passes recording what a compilation achieved.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use ftq_ir::{CircuitDag, HasUnitary, UnitaryMatrix};

use crate::error::{CompileError, CompileResult};
use crate::gate_set::FaultTolerantGateSet;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Unitary of the circuit before compilation.
#[derive(Debug, Clone)]
pub struct TargetUnitary(pub UnitaryMatrix);

/// Phase-invariant distance between the compiled and the input circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximationError(pub f64);

/// Gates a compiled circuit still needs to get rid of, with their counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateSetReport {
    /// Gates outside the gate set entirely.
    pub offending: BTreeMap<String, usize>,
    /// Continuous gates of the set that were not rounded, such as `Rz`
    /// at an angle off the π/4 grid.
    pub unrounded: BTreeMap<String, usize>,
}

impl GateSetReport {
    /// Check if every gate belongs to the gate set.
    pub fn is_within_gate_set(&self) -> bool {
        self.offending.is_empty()
    }

    /// Check if every gate is executable without further synthesis.
    pub fn is_fault_tolerant(&self) -> bool {
        self.offending.is_empty() && self.unrounded.is_empty()
    }
}

/// Stores the input unitary as a [`TargetUnitary`].
///
/// Circuits wider than `max_qubits` or containing non-unitary operations
/// are skipped.
#[derive(Debug, Clone, Copy)]
pub struct CaptureTargetUnitary {
    max_qubits: usize,
}

impl CaptureTargetUnitary {
    pub fn new(max_qubits: usize) -> Self {
        Self { max_qubits }
    }
}

impl Pass for CaptureTargetUnitary {
    fn name(&self) -> &'static str {
        "CaptureTargetUnitary"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        match dag.unitary() {
            Ok(unitary) => properties.insert(TargetUnitary(unitary)),
            Err(e) => debug!("Not capturing target unitary: {}", e),
        }
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, _properties: &PropertySet) -> bool {
        dag.num_qubits() <= self.max_qubits
    }
}

/// Logs the distance between the compiled circuit and its [`TargetUnitary`]
/// and stores it as an [`ApproximationError`].
#[derive(Debug, Clone, Copy)]
pub struct LogErrorPass {
    max_qubits: usize,
}

impl LogErrorPass {
    pub fn new(max_qubits: usize) -> Self {
        Self { max_qubits }
    }
}

impl Pass for LogErrorPass {
    fn name(&self) -> &'static str {
        "LogErrorPass"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let Some(TargetUnitary(target)) = properties.get::<TargetUnitary>() else {
            return Ok(());
        };
        let error = dag.unitary()?.distance_from(target);
        info!("Compiled circuit is within {:.3e} of its input", error);
        properties.insert(ApproximationError(error));
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, properties: &PropertySet) -> bool {
        dag.num_qubits() <= self.max_qubits && properties.contains::<TargetUnitary>()
    }
}

/// Reports gates outside the target gate set, and continuous gates left
/// unrounded, as a [`GateSetReport`].
///
/// Uses the gate set in the [`PropertySet`], falling back to the default
/// Clifford+T set. Findings are logged as warnings; in strict mode a gate
/// outside the set fails the pass instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct GateSetVerification {
    strict: bool,
}

impl GateSetVerification {
    /// Fail on the first offending gate instead of only reporting.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

impl Pass for GateSetVerification {
    fn name(&self) -> &'static str {
        "GateSetVerification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let fallback;
        let gate_set = match &properties.gate_set {
            Some(set) => set,
            None => {
                fallback = FaultTolerantGateSet::default();
                &fallback
            }
        };

        let mut report = GateSetReport::default();
        for (_, inst) in dag.topological_ops() {
            let name = inst.name();
            if !gate_set.allows(inst) {
                *report.offending.entry(name.to_string()).or_default() += 1;
            } else if inst.is_gate() && name != "id" && !gate_set.is_fault_tolerant(name) {
                *report.unrounded.entry(name.to_string()).or_default() += 1;
            }
        }

        if let Some((gate, count)) = report.offending.iter().next() {
            if self.strict {
                return Err(CompileError::GateNotInGateSet(gate.clone()));
            }
            warn!(
                "{} kinds of gate outside the gate set, first '{}' x{}",
                report.offending.len(),
                gate,
                count
            );
        }
        let unrounded: usize = report.unrounded.values().sum();
        if unrounded > 0 {
            warn!("{} continuous gates left unrounded", unrounded);
        }
        properties.insert(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftq_ir::{Instruction, QubitId, StandardGate};

    fn circuit(gates: &[StandardGate]) -> CircuitDag {
        let mut dag = CircuitDag::with_qubits(1);
        for &gate in gates {
            dag.apply(Instruction::single_qubit_gate(gate, QubitId(0)))
                .unwrap();
        }
        dag
    }

    #[test]
    fn test_capture_and_log_error() {
        let mut dag = circuit(&[StandardGate::Rz(0.1)]);
        let mut props = PropertySet::new();
        let capture = CaptureTargetUnitary::new(4);
        capture.run(&mut dag, &mut props).unwrap();
        assert!(props.contains::<TargetUnitary>());

        let mut compiled = circuit(&[StandardGate::T]);
        LogErrorPass::new(4).run(&mut compiled, &mut props).unwrap();
        let ApproximationError(error) = *props.get::<ApproximationError>().unwrap();
        assert!(error > 0.1);
    }

    #[test]
    fn test_capture_respects_width_limit() {
        let dag = CircuitDag::with_qubits(3);
        let props = PropertySet::new();
        assert!(!CaptureTargetUnitary::new(2).should_run(&dag, &props));
        assert!(!LogErrorPass::new(8).should_run(&dag, &props));
    }

    #[test]
    fn test_gate_set_report() {
        let mut dag = circuit(&[StandardGate::H, StandardGate::Ry(0.2), StandardGate::Ry(0.3)]);
        let mut props = PropertySet::new();
        GateSetVerification::default()
            .run(&mut dag, &mut props)
            .unwrap();
        let report = props.get::<GateSetReport>().unwrap();
        assert!(!report.is_within_gate_set());
        assert_eq!(report.offending["ry"], 2);

        let err = GateSetVerification::default()
            .strict()
            .run(&mut dag, &mut props)
            .unwrap_err();
        assert!(matches!(err, CompileError::GateNotInGateSet(g) if g == "ry"));
    }

    #[test]
    fn test_unrounded_rotations() {
        let mut dag = circuit(&[StandardGate::T, StandardGate::Rz(0.1), StandardGate::I]);
        let mut props = PropertySet::new();
        GateSetVerification::default()
            .strict()
            .run(&mut dag, &mut props)
            .unwrap();
        let report = props.get::<GateSetReport>().unwrap();
        assert!(report.is_within_gate_set());
        assert!(!report.is_fault_tolerant());
        assert_eq!(report.unrounded["rz"], 1);
    }

    #[test]
    fn test_gate_set_from_properties() {
        let mut dag = circuit(&[StandardGate::T]);
        let mut props =
            PropertySet::new().with_gate_set(FaultTolerantGateSet::new(["h"], Vec::<String>::new(), ["rz"]));
        GateSetVerification::default()
            .run(&mut dag, &mut props)
            .unwrap();
        assert_eq!(props.get::<GateSetReport>().unwrap().offending["t"], 1);
    }
}
