//! Rewrite rules over circuit regions.
//!
//! A rule pairs a [`MatchRule`] indicator with a replacement fragment. The
//! standard indicator is [`UnitaryMatcher`], which compares unitaries up to
//! global phase.

pub mod matcher;
pub mod replacement;

pub use matcher::{
    DEFAULT_MATCH_THRESHOLD, MatchRule, UnitaryMatcher, construct_unitary_match_rule,
    construct_unitary_match_rule_with_threshold,
};
pub use replacement::{Replacement, ReplacementOutcome, ReplacementRule};
