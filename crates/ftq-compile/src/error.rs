//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] ftq_ir::IrError),

    /// Gate outside the fault-tolerant gate set.
    #[error("Gate '{0}' not in the fault-tolerant gate set")]
    GateNotInGateSet(String),

    /// Pass execution failed.
    #[error("Pass '{name}' failed: {reason}")]
    PassFailed { name: String, reason: String },

    /// Invalid pass, rule or workflow configuration.
    #[error("Invalid pass configuration: {0}")]
    InvalidConfiguration(String),

    /// A block could not be resynthesized.
    #[error("Synthesis of block '{block}' failed: {reason}")]
    SynthesisFailed { block: String, reason: String },

    /// No workflow registered for the requested level and target.
    #[error("No workflow for optimization level {level} and target '{target}'")]
    UnsupportedWorkflow { level: u8, target: String },
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
