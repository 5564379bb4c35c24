//! Clifford+T compilation workflows.
//!
//! A workflow is a named [`PassManager`] assembled from a validated
//! [`WorkflowConfig`]. The stages, in order:
//!
//! 1. Capture the input unitary for error reporting.
//! 2. Circuit inputs only: expand blocks, retarget multi-qubit gates to CX
//!    form and partition into blocks of `max_synthesis_size` qubits.
//! 3. Non-circuit inputs, or level 3 and up: resynthesize blocks.
//! 4. Expand all blocks and resynthesize every single-qubit run as
//!    `Rz·SX·Rz·SX·Rz`.
//! 5. Two clean-up rounds of Clifford+T replacement and Z rounding, with
//!    redundant gate removal on two-qubit blocks in between.
//! 6. Verify the gate set and log the approximation error.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use ftq_ir::{CircuitDag, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::gate_set::FaultTolerantGateSet;
use crate::manager::PassManager;
use crate::pass::Pass;
use crate::passes::agnostic::{
    BlockSynthesis, CaptureTargetUnitary, ForEachBlock, GateSetVerification,
    GroupSingleQubitGates, LogErrorPass, QuickPartitioner, ScanningGateRemoval, SynthesisEngine,
    UnfoldPass, ZxzxzDecomposition, single_qubit_filter,
};
use crate::passes::target::{DEFAULT_SYNTHESIS_EPSILON, MultiQubitRetarget, RoundToDiscreteZ};
use crate::property::PropertySet;
use crate::rules::{ReplacementRule, construct_unitary_match_rule};

/// Lowest supported optimization level.
pub const MIN_OPTIMIZATION_LEVEL: u8 = 1;

/// Highest supported optimization level.
pub const MAX_OPTIMIZATION_LEVEL: u8 = 4;

/// Level from which blocks are resynthesized even for circuit inputs.
const SEARCH_SYNTHESIS_LEVEL: u8 = 3;

/// Gates rewritten by [`clifford_replace`], in the order their rules are tried.
const CLIFFORD_T_GATES: [StandardGate; 10] = [
    StandardGate::H,
    StandardGate::X,
    StandardGate::SX,
    StandardGate::Y,
    StandardGate::Z,
    StandardGate::S,
    StandardGate::Sdg,
    StandardGate::T,
    StandardGate::Tdg,
    StandardGate::I,
];

/// What a workflow takes as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A circuit to be rewritten gate by gate.
    Circuit,
    /// A unitary to be synthesized.
    Unitary,
    /// A map between sets of states.
    StateMap,
    /// A single state to prepare.
    StatePrep,
}

impl TargetKind {
    /// Every target kind.
    pub const ALL: [TargetKind; 4] = [
        TargetKind::Circuit,
        TargetKind::Unitary,
        TargetKind::StateMap,
        TargetKind::StatePrep,
    ];

    /// Lowercase name of the target kind.
    pub fn name(self) -> &'static str {
        match self {
            TargetKind::Circuit => "circuit",
            TargetKind::Unitary => "unitary",
            TargetKind::StateMap => "statemap",
            TargetKind::StatePrep => "stateprep",
        }
    }

    /// Name of the workflow compiling this kind of input.
    pub fn workflow_name(self) -> &'static str {
        match self {
            TargetKind::Circuit => "Clifford+T Circuit Compilation",
            TargetKind::Unitary => "Clifford+T Unitary Compilation",
            TargetKind::StateMap => "Clifford+T StateSystem Compilation",
            TargetKind::StatePrep => "Clifford+T StateVector Compilation",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings shared by every stage of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Optimization level, 1 to 4.
    pub optimization_level: u8,
    /// Tolerance for rounding, removal and synthesis.
    pub synthesis_epsilon: f64,
    /// Widest block handed to synthesis.
    pub max_synthesis_size: usize,
    /// Widest circuit whose unitary is tracked for error reporting.
    pub error_sim_size: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            optimization_level: MIN_OPTIMIZATION_LEVEL,
            synthesis_epsilon: DEFAULT_SYNTHESIS_EPSILON,
            max_synthesis_size: 3,
            error_sim_size: 8,
        }
    }
}

impl WorkflowConfig {
    /// Check every field is in range.
    pub fn validate(&self) -> CompileResult<()> {
        if !(MIN_OPTIMIZATION_LEVEL..=MAX_OPTIMIZATION_LEVEL).contains(&self.optimization_level) {
            return Err(CompileError::InvalidConfiguration(format!(
                "optimization level must be between {MIN_OPTIMIZATION_LEVEL} and \
                 {MAX_OPTIMIZATION_LEVEL}, got {}",
                self.optimization_level
            )));
        }
        if !self.synthesis_epsilon.is_finite() || self.synthesis_epsilon < 0.0 {
            return Err(CompileError::InvalidConfiguration(format!(
                "synthesis epsilon must be finite and non-negative, got {}",
                self.synthesis_epsilon
            )));
        }
        if self.max_synthesis_size == 0 {
            return Err(CompileError::InvalidConfiguration(
                "max synthesis size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> CompileResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CompileError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Replacement of single-qubit parameterized blocks equal to a Clifford+T
/// gate, up to global phase, by that gate.
pub fn clifford_replace() -> CompileResult<ForEachBlock> {
    let mut rules: Vec<Box<dyn Pass>> = Vec::with_capacity(CLIFFORD_T_GATES.len());
    for gate in CLIFFORD_T_GATES {
        let rule = ReplacementRule::new(construct_unitary_match_rule(gate.matrix()), gate)?
            .with_name(format!("replace_{}", gate.name()));
        rules.push(Box::new(rule));
    }
    Ok(ForEachBlock::new(rules).with_filter(single_qubit_filter))
}

/// One round of Clifford replacement followed by Z rounding.
fn cleanup_round(manager: &mut PassManager, epsilon: f64) -> CompileResult<()> {
    manager.add_pass(GroupSingleQubitGates);
    manager.add_pass(clifford_replace()?);
    manager.add_pass(UnfoldPass);
    manager.add_pass(RoundToDiscreteZ::new(epsilon)?);
    Ok(())
}

/// Assemble the Clifford+T pass sequence.
///
/// `circuit_target` selects the circuit front end; otherwise the input is
/// expected to hold blocks or matrix-defined gates to synthesize. `engine`
/// handles blocks wider than one qubit.
pub fn build_cliffordt_workflow(
    config: &WorkflowConfig,
    circuit_target: bool,
    engine: Option<Arc<dyn SynthesisEngine>>,
) -> CompileResult<PassManager> {
    config.validate()?;
    let epsilon = config.synthesis_epsilon;
    let mut manager = PassManager::new();

    manager.add_pass(CaptureTargetUnitary::new(config.error_sim_size));

    if circuit_target {
        manager.add_pass(UnfoldPass);
        manager.add_pass(MultiQubitRetarget);
        manager.add_pass(UnfoldPass);
        manager.add_pass(QuickPartitioner::new(config.max_synthesis_size)?);
    }

    if !circuit_target || config.optimization_level >= SEARCH_SYNTHESIS_LEVEL {
        let mut synthesis = BlockSynthesis::new(epsilon)?;
        if let Some(engine) = engine {
            synthesis = synthesis.with_engine(engine);
        }
        manager.add_pass(synthesis);
        manager.add_pass(UnfoldPass);
        manager.add_pass(MultiQubitRetarget);
    }

    manager.add_pass(UnfoldPass);
    manager.add_pass(GroupSingleQubitGates);
    manager.add_pass(ForEachBlock::with_pass(ZxzxzDecomposition).with_filter(single_qubit_filter));
    manager.add_pass(UnfoldPass);

    cleanup_round(&mut manager, epsilon)?;
    manager.add_pass(QuickPartitioner::new(2)?);
    manager.add_pass(ForEachBlock::with_pass(ScanningGateRemoval::new(epsilon)?));
    manager.add_pass(UnfoldPass);
    cleanup_round(&mut manager, epsilon)?;

    manager.add_pass(UnfoldPass);
    manager.add_pass(GateSetVerification::default());
    manager.add_pass(LogErrorPass::new(config.error_sim_size));

    Ok(manager)
}

/// Workflow for circuit inputs.
pub fn build_circuit_workflow(
    config: &WorkflowConfig,
    engine: Option<Arc<dyn SynthesisEngine>>,
    gate_set: FaultTolerantGateSet,
) -> CompileResult<Workflow> {
    build_workflow(TargetKind::Circuit, config, engine, gate_set)
}

/// Workflow for unitary inputs.
pub fn build_unitary_workflow(
    config: &WorkflowConfig,
    engine: Option<Arc<dyn SynthesisEngine>>,
    gate_set: FaultTolerantGateSet,
) -> CompileResult<Workflow> {
    build_workflow(TargetKind::Unitary, config, engine, gate_set)
}

/// Workflow for state map inputs.
pub fn build_statemap_workflow(
    config: &WorkflowConfig,
    engine: Option<Arc<dyn SynthesisEngine>>,
    gate_set: FaultTolerantGateSet,
) -> CompileResult<Workflow> {
    build_workflow(TargetKind::StateMap, config, engine, gate_set)
}

/// Workflow for state preparation inputs.
pub fn build_stateprep_workflow(
    config: &WorkflowConfig,
    engine: Option<Arc<dyn SynthesisEngine>>,
    gate_set: FaultTolerantGateSet,
) -> CompileResult<Workflow> {
    build_workflow(TargetKind::StatePrep, config, engine, gate_set)
}

/// Workflow for any target kind.
pub fn build_workflow(
    target: TargetKind,
    config: &WorkflowConfig,
    engine: Option<Arc<dyn SynthesisEngine>>,
    gate_set: FaultTolerantGateSet,
) -> CompileResult<Workflow> {
    let manager = build_cliffordt_workflow(config, target == TargetKind::Circuit, engine)?;
    Ok(Workflow {
        name: target.workflow_name().to_string(),
        target,
        manager,
        gate_set,
    })
}

/// A named, ready-to-run compilation pipeline.
#[derive(Debug)]
pub struct Workflow {
    name: String,
    target: TargetKind,
    manager: PassManager,
    gate_set: FaultTolerantGateSet,
}

impl Workflow {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> TargetKind {
        self.target
    }

    pub fn manager(&self) -> &PassManager {
        &self.manager
    }

    pub fn gate_set(&self) -> &FaultTolerantGateSet {
        &self.gate_set
    }

    /// Compile `dag` in place, returning the properties the passes recorded.
    pub fn run(&self, dag: &mut CircuitDag) -> CompileResult<PropertySet> {
        info!("Running workflow '{}'", self.name);
        let mut properties = PropertySet::new().with_gate_set(self.gate_set.clone());
        self.manager.run(dag, &mut properties)?;
        Ok(properties)
    }
}

/// Workflows indexed by optimization level and target kind.
#[derive(Debug, Default)]
pub struct WorkflowRegistry {
    workflows: FxHashMap<(u8, TargetKind), Workflow>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workflow, returning the one it replaces.
    pub fn insert(&mut self, level: u8, workflow: Workflow) -> Option<Workflow> {
        self.workflows.insert((level, workflow.target), workflow)
    }

    /// Look up the workflow for a level and target.
    pub fn get(&self, level: u8, target: TargetKind) -> CompileResult<&Workflow> {
        self.workflows
            .get(&(level, target))
            .ok_or_else(|| CompileError::UnsupportedWorkflow {
                level,
                target: target.name().to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}
