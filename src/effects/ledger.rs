//! Once-per-action grants
//!
//! Resource recovery and each action condition are granted at most once per
//! action. The ledger is threaded through every conversion of one action
//! and dropped afterwards.

use ahash::AHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Sp,
    Dp,
    Utp,
}

#[derive(Debug, Clone, Default)]
pub struct GrantLedger {
    resources: AHashSet<Resource>,
    conditions: AHashSet<u64>,
}

impl GrantLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.conditions.is_empty()
    }

    /// Forget every grant (`_IgnoreFirstHitCheck`)
    pub fn clear(&mut self) {
        self.resources.clear();
        self.conditions.clear();
    }

    pub fn has_resource(&self, resource: Resource) -> bool {
        self.resources.contains(&resource)
    }

    pub fn grant_resource(&mut self, resource: Resource) {
        self.resources.insert(resource);
    }

    pub fn has_condition(&self, id: u64) -> bool {
        self.conditions.contains(&id)
    }

    /// Record a condition grant; false when it was already granted
    pub fn grant_condition(&mut self, id: u64) -> bool {
        self.conditions.insert(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grants_and_clear() {
        let mut ledger = GrantLedger::new();
        assert!(ledger.is_empty());
        ledger.grant_resource(Resource::Sp);
        assert!(ledger.grant_condition(301));
        assert!(!ledger.grant_condition(301));
        assert!(ledger.has_resource(Resource::Sp));
        assert!(!ledger.has_resource(Resource::Dp));
        ledger.clear();
        assert!(ledger.is_empty());
        assert!(!ledger.has_condition(301));
    }
}
