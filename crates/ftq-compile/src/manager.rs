//! Pass manager for orchestrating compilation.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use ftq_ir::CircuitDag;

use crate::error::CompileResult;
use crate::gate_set::FaultTolerantGateSet;
use crate::pass::Pass;
use crate::passes::agnostic::SynthesisEngine;
use crate::property::PropertySet;
use crate::workflow::{TargetKind, WorkflowConfig, build_cliffordt_workflow};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given DAG.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            dag.depth(),
            dag.num_ops()
        );

        Ok(())
    }

    /// Names of the passes, in execution order.
    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|p| p.name())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PassManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.pass_names()).finish()
    }
}

/// Builder for Clifford+T pass managers.
pub struct PassManagerBuilder {
    config: WorkflowConfig,
    target: TargetKind,
    engine: Option<Arc<dyn SynthesisEngine>>,
    gate_set: FaultTolerantGateSet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: WorkflowConfig::default(),
            target: TargetKind::Circuit,
            engine: None,
            gate_set: FaultTolerantGateSet::clifford_t(),
        }
    }

    /// Set the optimization level.
    ///
    /// - Level 1: Retargeting, single-qubit resynthesis and rounding (default)
    /// - Level 2: Same passes as level 1
    /// - Level 3: Adds block resynthesis for circuit inputs
    /// - Level 4: Same passes as level 3
    ///
    /// Levels outside 1 to 4 are rejected by [`build`](Self::build).
    #[must_use]
    pub fn with_optimization_level(mut self, level: u8) -> Self {
        self.config.optimization_level = level;
        self
    }

    /// Set the tolerance used for rounding, removal and synthesis.
    #[must_use]
    pub fn with_synthesis_epsilon(mut self, epsilon: f64) -> Self {
        self.config.synthesis_epsilon = epsilon;
        self
    }

    /// Set the kind of input the pipeline compiles.
    #[must_use]
    pub fn with_target(mut self, target: TargetKind) -> Self {
        self.target = target;
        self
    }

    /// Replace the whole workflow configuration.
    #[must_use]
    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the engine used for multi-qubit block synthesis.
    #[must_use]
    pub fn with_synthesis_engine(mut self, engine: Arc<dyn SynthesisEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Set the gate set the result is verified against.
    #[must_use]
    pub fn with_gate_set(mut self, gate_set: FaultTolerantGateSet) -> Self {
        self.gate_set = gate_set;
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> CompileResult<(PassManager, PropertySet)> {
        let manager = build_cliffordt_workflow(
            &self.config,
            self.target == TargetKind::Circuit,
            self.engine,
        )?;
        Ok((manager, PropertySet::new().with_gate_set(self.gate_set)))
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use ftq_ir::{Circuit, QubitId};

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_pass_manager_run() {
        let pm = PassManager::new();
        let mut props = PropertySet::new();

        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let mut dag = circuit.into_dag();
        pm.run(&mut dag, &mut props).unwrap();

        assert_eq!(dag.num_ops(), 2);
    }

    #[test]
    fn test_pass_manager_builder() {
        let (pm, props) = PassManagerBuilder::new()
            .with_optimization_level(2)
            .with_synthesis_epsilon(1e-6)
            .build()
            .unwrap();

        assert!(!pm.is_empty());
        assert!(props.gate_set.is_some());
        assert_eq!(format!("{pm:?}").matches("RoundToDiscreteZ").count(), 2);
    }

    #[test]
    fn test_builder_rejects_bad_level() {
        let err = PassManagerBuilder::new()
            .with_optimization_level(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidConfiguration(_)));
    }
}
