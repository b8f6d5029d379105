//! Check and assembly counters for engine observability
//!
//! Counters are kept in a `DashMap` so they can be bumped from the
//! synchronous check path without a lock. Recording a metric never feeds
//! back into a verdict.

use crate::middleware::{DeniedReason, SecurityCheckResult};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;

const CHECKS: &str = "checks";
const ALLOWED: &str = "allowed";
const DENIED: &str = "denied";
const CONTEXT_BUILDS: &str = "context_builds";
const STALE_DISCARDS: &str = "stale_discards";
const ASSEMBLY_FAILURES: &str = "assembly_failures";
const OWNERSHIP_LOOKUPS: &str = "ownership_lookups";

/// Point-in-time copy of the engine counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineMetrics {
    /// Total number of verdicts produced
    pub total_checks: u64,

    /// Number of allow verdicts
    pub allowed: u64,

    /// Number of deny verdicts
    pub denied: u64,

    /// Deny verdicts broken down by reason
    pub denied_by_reason: BTreeMap<DeniedReason, u64>,

    /// Resource store round-trips made by ownership checks
    pub ownership_lookups: u64,

    /// Contexts published by the assembler
    pub context_builds: u64,

    /// Assembler results dropped because a newer build had started
    pub stale_discards: u64,

    /// Assemblies that collapsed to guest because a lookup failed
    pub assembly_failures: u64,
}

impl EngineMetrics {
    /// Fraction of checks that were allowed
    pub fn allow_rate(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            self.allowed as f64 / self.total_checks as f64
        }
    }
}

/// Thread-safe engine counters
#[derive(Debug, Default)]
pub struct MetricsCollector {
    counters: DashMap<&'static str, u64>,
    denials: DashMap<DeniedReason, u64>,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verdict
    pub fn record_check(&self, result: &SecurityCheckResult) {
        self.increment(CHECKS);

        match result.denied_reason() {
            None => self.increment(ALLOWED),
            Some(reason) => {
                self.increment(DENIED);
                *self.denials.entry(reason).or_insert(0) += 1;
            }
        }
    }

    /// Record a store round-trip made by an ownership check
    pub fn record_ownership_lookup(&self) {
        self.increment(OWNERSHIP_LOOKUPS);
    }

    /// Record a published context
    pub fn record_context_build(&self) {
        self.increment(CONTEXT_BUILDS);
    }

    /// Record a discarded stale context
    pub fn record_stale_discard(&self) {
        self.increment(STALE_DISCARDS);
    }

    /// Record an assembly that fell back to guest
    pub fn record_assembly_failure(&self) {
        self.increment(ASSEMBLY_FAILURES);
    }

    /// Snapshot of all counters
    pub fn get_metrics(&self) -> EngineMetrics {
        EngineMetrics {
            total_checks: self.get(CHECKS),
            allowed: self.get(ALLOWED),
            denied: self.get(DENIED),
            denied_by_reason: self
                .denials
                .iter()
                .map(|entry| (*entry.key(), *entry.value()))
                .collect(),
            ownership_lookups: self.get(OWNERSHIP_LOOKUPS),
            context_builds: self.get(CONTEXT_BUILDS),
            stale_discards: self.get(STALE_DISCARDS),
            assembly_failures: self.get(ASSEMBLY_FAILURES),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.counters.clear();
        self.denials.clear();
    }

    fn increment(&self, key: &'static str) {
        self.counters
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get(&self, key: &'static str) -> u64 {
        self.counters.get(key).map(|v| *v).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_checks() {
        let metrics = MetricsCollector::new();

        metrics.record_check(&SecurityCheckResult::allow());
        metrics.record_check(&SecurityCheckResult::deny(DeniedReason::NotOwner));
        metrics.record_check(&SecurityCheckResult::deny(DeniedReason::NotOwner));
        metrics.record_check(&SecurityCheckResult::deny(DeniedReason::NotAuthenticated));

        let snapshot = metrics.get_metrics();
        assert_eq!(snapshot.total_checks, 4);
        assert_eq!(snapshot.allowed, 1);
        assert_eq!(snapshot.denied, 3);
        assert_eq!(snapshot.denied_by_reason.get(&DeniedReason::NotOwner), Some(&2));
        assert_eq!(snapshot.denied_by_reason.get(&DeniedReason::InsufficientRole), None);
        assert!((snapshot.allow_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_assembly_counters_and_reset() {
        let metrics = MetricsCollector::new();
        metrics.record_context_build();
        metrics.record_stale_discard();
        metrics.record_assembly_failure();
        metrics.record_ownership_lookup();

        let snapshot = metrics.get_metrics();
        assert_eq!(snapshot.context_builds, 1);
        assert_eq!(snapshot.stale_discards, 1);
        assert_eq!(snapshot.assembly_failures, 1);
        assert_eq!(snapshot.ownership_lookups, 1);

        metrics.reset();
        assert_eq!(metrics.get_metrics(), EngineMetrics::default());
        assert_eq!(EngineMetrics::default().allow_rate(), 0.0);
    }
}
