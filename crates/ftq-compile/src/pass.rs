//! Pass trait and types for compilation passes.

use ftq_ir::CircuitDag;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads but does not modify the DAG.
    Analysis,
    /// Transformation pass that modifies the DAG.
    Transformation,
}

/// A compilation pass that operates on a circuit DAG.
///
/// Passes are the unit of work in a workflow. Rules, partitioners and
/// analyses all implement this trait so they can be sequenced by a
/// [`PassManager`](crate::PassManager) or nested inside
/// [`ForEachBlock`](crate::passes::ForEachBlock).
///
/// Passes are immutable after construction and `Send + Sync`, so one
/// workflow can serve many threads that each own a different circuit.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given DAG.
    ///
    /// Analysis passes should not modify the DAG but may write to the
    /// `PropertySet`. Transformation passes modify the DAG.
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _dag: &CircuitDag, _properties: &PropertySet) -> bool {
        true
    }
}
