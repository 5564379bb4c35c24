//! Fault-tolerant machine models.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ftq_ir::CircuitDag;

use crate::error::{CompileError, CompileResult};
use crate::gate_set::FaultTolerantGateSet;
use crate::passes::agnostic::SynthesisEngine;
use crate::property::PropertySet;
use crate::workflow::{
    MAX_OPTIMIZATION_LEVEL, MIN_OPTIMIZATION_LEVEL, TargetKind, Workflow, WorkflowConfig,
    WorkflowRegistry, build_workflow,
};

/// An error-corrected machine: how many logical qubits it has and which
/// logical gates it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultTolerantModel {
    pub num_qubits: usize,
    pub gate_set: FaultTolerantGateSet,
}

impl FaultTolerantModel {
    pub fn new(num_qubits: usize, gate_set: FaultTolerantGateSet) -> Self {
        Self {
            num_qubits,
            gate_set,
        }
    }
}

/// A Clifford+T machine with a workflow for every optimization level and
/// target kind.
#[derive(Debug)]
pub struct CliffordTModel {
    model: FaultTolerantModel,
    registry: WorkflowRegistry,
}

impl CliffordTModel {
    /// Create a model of `num_qubits` logical qubits with the Clifford+T
    /// gate set and no multi-qubit synthesis engine.
    pub fn new(num_qubits: usize) -> CompileResult<Self> {
        Self::build(num_qubits, &WorkflowConfig::default(), None)
    }

    /// Create a model whose workflows use `engine` for multi-qubit blocks.
    pub fn with_synthesis_engine(
        num_qubits: usize,
        engine: Arc<dyn SynthesisEngine>,
    ) -> CompileResult<Self> {
        Self::build(num_qubits, &WorkflowConfig::default(), Some(engine))
    }

    /// Create a model from a base configuration.
    ///
    /// The configuration's optimization level is ignored; every level gets
    /// its own workflow.
    pub fn with_config(
        num_qubits: usize,
        config: &WorkflowConfig,
        engine: Option<Arc<dyn SynthesisEngine>>,
    ) -> CompileResult<Self> {
        Self::build(num_qubits, config, engine)
    }

    fn build(
        num_qubits: usize,
        base: &WorkflowConfig,
        engine: Option<Arc<dyn SynthesisEngine>>,
    ) -> CompileResult<Self> {
        let model = FaultTolerantModel::new(num_qubits, FaultTolerantGateSet::clifford_t());
        let mut registry = WorkflowRegistry::new();
        for level in MIN_OPTIMIZATION_LEVEL..=MAX_OPTIMIZATION_LEVEL {
            let config = WorkflowConfig {
                optimization_level: level,
                ..base.clone()
            };
            for target in TargetKind::ALL {
                let workflow =
                    build_workflow(target, &config, engine.clone(), model.gate_set.clone())?;
                registry.insert(level, workflow);
            }
        }
        debug!("Built {} Clifford+T workflows", registry.len());
        Ok(Self { model, registry })
    }

    pub fn model(&self) -> &FaultTolerantModel {
        &self.model
    }

    pub fn num_qubits(&self) -> usize {
        self.model.num_qubits
    }

    pub fn gate_set(&self) -> &FaultTolerantGateSet {
        &self.model.gate_set
    }

    /// The workflow for an optimization level and target kind.
    pub fn workflow(&self, level: u8, target: TargetKind) -> CompileResult<&Workflow> {
        self.registry.get(level, target)
    }

    /// Compile a circuit with the circuit workflow of `level`.
    pub fn compile(&self, dag: &mut CircuitDag, level: u8) -> CompileResult<PropertySet> {
        if dag.num_qubits() > self.model.num_qubits {
            return Err(CompileError::InvalidConfiguration(format!(
                "circuit has {} qubits, model has {}",
                dag.num_qubits(),
                self.model.num_qubits
            )));
        }
        self.workflow(level, TargetKind::Circuit)?.run(dag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftq_ir::{Circuit, QubitId};

    #[test]
    fn test_model_registers_every_workflow() {
        let model = CliffordTModel::new(4).unwrap();
        assert_eq!(model.num_qubits(), 4);
        assert!(model.gate_set().is_fault_tolerant("swap"));
        for level in 1..=4 {
            for target in TargetKind::ALL {
                let workflow = model.workflow(level, target).unwrap();
                assert_eq!(workflow.target(), target);
                assert_eq!(workflow.name(), target.workflow_name());
            }
        }
        assert!(matches!(
            model.workflow(5, TargetKind::Circuit),
            Err(CompileError::UnsupportedWorkflow { level: 5, .. })
        ));
    }

    #[test]
    fn test_compile_rejects_wide_circuit() {
        let model = CliffordTModel::new(1).unwrap();
        let mut dag = Circuit::bell().unwrap().into_dag();
        assert!(matches!(
            model.compile(&mut dag, 1),
            Err(CompileError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_compile_bell() {
        let model = CliffordTModel::new(2).unwrap();
        let mut circuit = Circuit::with_size("bell", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let mut dag = circuit.into_dag();
        let props = model.compile(&mut dag, 1).unwrap();
        let counts = dag.count_ops();
        assert_eq!(counts["h"], 1);
        assert_eq!(counts["cx"], 1);
        assert!(props
            .get::<crate::passes::GateSetReport>()
            .unwrap()
            .is_fault_tolerant());
    }
}
