//! Categorized domain collection
//!
//! The merge stage accumulates domains into this collection, one sorted set
//! per rule type. It is an ordinary value owned by the caller, so a pipeline
//! can be run any number of times in-process.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::RuleType;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedDomains {
    buckets: BTreeMap<RuleType, BTreeSet<String>>,
}

impl CategorizedDomains {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a domain into the bucket for `rule_type`. The domain is
    /// lowercased. Returns `true` if it was not already present.
    pub fn insert(&mut self, rule_type: RuleType, domain: &str) -> bool {
        self.buckets
            .entry(rule_type)
            .or_default()
            .insert(domain.to_lowercase())
    }

    pub fn get(&self, rule_type: RuleType) -> Option<&BTreeSet<String>> {
        self.buckets.get(&rule_type)
    }

    pub fn contains(&self, rule_type: RuleType, domain: &str) -> bool {
        self.buckets
            .get(&rule_type)
            .is_some_and(|bucket| bucket.contains(domain))
    }

    /// Non-empty buckets in lexicographic order of the type name.
    pub fn iter(&self) -> impl Iterator<Item = (RuleType, &BTreeSet<String>)> {
        self.buckets
            .iter()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(rule_type, bucket)| (*rule_type, bucket))
    }

    /// Union of every bucket.
    pub fn all_domains(&self) -> BTreeSet<&str> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter().map(String::as_str))
            .collect()
    }

    /// Number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
