//! Fault-tolerant gate sets.

use serde::{Deserialize, Serialize};

use ftq_ir::Instruction;

/// The gates an error-corrected machine can execute, by gate name.
///
/// Clifford gates are cheap transversal or lattice-surgery operations.
/// Magic gates need a distilled resource state. Parameterized gates are
/// allowed during synthesis but must be rounded or approximated before
/// the circuit is executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultTolerantGateSet {
    /// Clifford gates.
    pub clifford: Vec<String>,
    /// Non-Clifford gates implemented through magic-state injection.
    pub magic: Vec<String>,
    /// Continuous gates tolerated until a later synthesis step.
    pub parameterized: Vec<String>,
}

impl FaultTolerantGateSet {
    /// Create a gate set from explicit name lists.
    pub fn new(
        clifford: impl IntoIterator<Item = impl Into<String>>,
        magic: impl IntoIterator<Item = impl Into<String>>,
        parameterized: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            clifford: clifford.into_iter().map(Into::into).collect(),
            magic: magic.into_iter().map(Into::into).collect(),
            parameterized: parameterized.into_iter().map(Into::into).collect(),
        }
    }

    /// Gate set of the Clifford+T machine model: the default set plus SWAP.
    pub fn clifford_t() -> Self {
        let mut set = Self::default();
        set.clifford.push("swap".into());
        set
    }

    /// Check whether a gate name belongs to any part of the set.
    pub fn contains(&self, gate: &str) -> bool {
        self.is_fault_tolerant(gate) || self.parameterized.iter().any(|g| g == gate)
    }

    /// Check whether a gate is executable without further synthesis.
    pub fn is_fault_tolerant(&self, gate: &str) -> bool {
        self.clifford.iter().chain(&self.magic).any(|g| g == gate)
    }

    /// Check an instruction against the set.
    ///
    /// Identity gates, measurements, resets and barriers are always allowed.
    pub fn allows(&self, instruction: &Instruction) -> bool {
        if !instruction.is_gate() || instruction.name() == "id" {
            return true;
        }
        self.contains(instruction.name())
    }

    /// All gate names in the set.
    pub fn gates(&self) -> impl Iterator<Item = &str> {
        self.clifford
            .iter()
            .chain(&self.magic)
            .chain(&self.parameterized)
            .map(String::as_str)
    }
}

impl Default for FaultTolerantGateSet {
    fn default() -> Self {
        Self::new(
            ["h", "x", "y", "z", "s", "sdg", "sx", "cx", "cz"],
            ["t", "tdg"],
            ["rz"],
        )
    }
}
