//! `PropertySet` for pass communication.
//!
//! Passes share data through a [`PropertySet`]: the target gate set as a
//! standard property, plus arbitrary typed values such as the captured input
//! unitary or the final approximation error.
//!
//! # Examples
//!
//! ```
//! use ftq_compile::{FaultTolerantGateSet, PropertySet};
//!
//! let props = PropertySet::new().with_gate_set(FaultTolerantGateSet::clifford_t());
//! assert!(props.gate_set.as_ref().unwrap().contains("t"));
//! ```
//!
//! ## Custom properties
//!
//! ```
//! use ftq_compile::PropertySet;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct RulesFired(usize);
//!
//! let mut props = PropertySet::new();
//! props.insert(RulesFired(3));
//! assert_eq!(props.get::<RulesFired>(), Some(&RulesFired(3)));
//! ```

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};

use crate::gate_set::FaultTolerantGateSet;

/// Properties shared between compilation passes.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Gate set the compiled circuit should end up in.
    ///
    /// Read by gate-set verification; passes that only rewrite do not need it.
    pub gate_set: Option<FaultTolerantGateSet>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target gate set.
    #[must_use]
    pub fn with_gate_set(mut self, gate_set: FaultTolerantGateSet) -> Self {
        self.gate_set = Some(gate_set);
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }

    /// Check whether a custom property is present.
    pub fn contains<T: Any>(&self) -> bool {
        self.custom.contains_key(&TypeId::of::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Counter(u32);

    #[test]
    fn test_property_set_custom() {
        let mut props = PropertySet::new();
        assert!(!props.contains::<Counter>());

        props.insert(Counter(1));
        props.get_mut::<Counter>().unwrap().0 += 1;
        assert_eq!(props.get::<Counter>(), Some(&Counter(2)));

        assert_eq!(props.remove::<Counter>(), Some(Counter(2)));
        assert!(props.get::<Counter>().is_none());
    }

    #[test]
    fn test_with_gate_set() {
        let props = PropertySet::new().with_gate_set(FaultTolerantGateSet::default());
        assert!(props.gate_set.is_some());
    }
}
