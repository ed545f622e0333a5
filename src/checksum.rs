//! Checksum accumulator table.
//!
//! Maps each `InternetChecksum` instance to the name of the running-total
//! variable the target folds added fields into. Built before lowering by the
//! pass that declares the accumulators.

use std::collections::BTreeMap;

use crate::ast::InstanceId;

#[derive(Clone, Debug, Default)]
pub struct ChecksumTable {
    accumulators: BTreeMap<InstanceId, String>,
}

impl ChecksumTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the accumulator of `instance`, replacing any previous entry.
    pub fn insert(&mut self, instance: InstanceId, accumulator: impl Into<String>) {
        self.accumulators.insert(instance, accumulator.into());
    }

    pub fn get(&self, instance: &InstanceId) -> Option<&str> {
        self.accumulators.get(instance).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.accumulators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulators.is_empty()
    }
}

impl FromIterator<(InstanceId, String)> for ChecksumTable {
    fn from_iter<I: IntoIterator<Item = (InstanceId, String)>>(iter: I) -> Self {
        Self {
            accumulators: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_scope_and_name() {
        let mut table = ChecksumTable::new();
        table.insert(InstanceId::new("MyDeparser", "ck"), "state_0");
        table.insert(InstanceId::new("MyParser", "ck"), "state_1");
        assert_eq!(table.get(&InstanceId::new("MyDeparser", "ck")), Some("state_0"));
        assert_eq!(table.get(&InstanceId::new("MyParser", "ck")), Some("state_1"));
        assert_eq!(table.get(&InstanceId::new("Other", "ck")), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_cloned_identity_still_matches() {
        let id = InstanceId::new("MyDeparser", "ipv4_csum");
        let table: ChecksumTable = vec![(id.clone(), "acc".to_string())].into_iter().collect();
        let copy = id.clone();
        assert_eq!(table.get(&copy), Some("acc"));
        assert!(!table.is_empty());
    }
}
