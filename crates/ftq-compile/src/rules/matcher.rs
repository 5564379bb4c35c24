//! Match predicates for replacement rules.

use ftq_ir::{HasUnitary, UnitaryMatrix};

use crate::error::{CompileError, CompileResult};

/// Default distance below which two unitaries are considered equal.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 1e-8;

/// Decides whether a candidate region or operation should be rewritten.
///
/// Any `Fn(&dyn HasUnitary) -> bool` closure is a match rule, so ad-hoc
/// predicates can be passed wherever a [`UnitaryMatcher`] is accepted.
pub trait MatchRule: Send + Sync {
    /// Check the candidate.
    fn matches(&self, candidate: &dyn HasUnitary) -> bool;
}

impl<F> MatchRule for F
where
    F: Fn(&dyn HasUnitary) -> bool + Send + Sync,
{
    fn matches(&self, candidate: &dyn HasUnitary) -> bool {
        self(candidate)
    }
}

/// Matches candidates whose unitary equals a reference up to global phase.
#[derive(Debug, Clone)]
pub struct UnitaryMatcher {
    reference: UnitaryMatrix,
    threshold: f64,
}

impl UnitaryMatcher {
    /// Create a matcher with an explicit threshold.
    ///
    /// The threshold must be finite and non-negative.
    pub fn new(reference: UnitaryMatrix, threshold: f64) -> CompileResult<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(CompileError::InvalidConfiguration(format!(
                "match threshold must be finite and non-negative, got {threshold}"
            )));
        }
        Ok(Self {
            reference,
            threshold,
        })
    }

    /// The reference unitary.
    pub fn reference(&self) -> &UnitaryMatrix {
        &self.reference
    }

    /// The match threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Phase-invariant distance from the candidate to the reference.
    ///
    /// `None` when the candidate has no unitary.
    pub fn distance(&self, candidate: &dyn HasUnitary) -> Option<f64> {
        candidate
            .unitary()
            .ok()
            .map(|u| u.distance_from(&self.reference))
    }
}

impl MatchRule for UnitaryMatcher {
    fn matches(&self, candidate: &dyn HasUnitary) -> bool {
        self.distance(candidate)
            .is_some_and(|distance| distance < self.threshold)
    }
}

/// Build a matcher for `reference` with the default threshold.
///
/// Use [`construct_unitary_match_rule_with_threshold`] for another one.
pub fn construct_unitary_match_rule(reference: UnitaryMatrix) -> UnitaryMatcher {
    UnitaryMatcher {
        reference,
        threshold: DEFAULT_MATCH_THRESHOLD,
    }
}

/// Build a matcher for `reference` that accepts distances below `threshold`.
pub fn construct_unitary_match_rule_with_threshold(
    reference: UnitaryMatrix,
    threshold: f64,
) -> CompileResult<UnitaryMatcher> {
    UnitaryMatcher::new(reference, threshold)
}
