//! Draft/commit lifecycle
//!
//! Every `compute` opens a new generation. Within a generation the draft
//! and the previews of its remediations are eligible for commit; anything
//! from an earlier generation is stale. Each eligible result can be
//! committed once, and committing is the only operation with an external
//! effect.

use std::collections::HashSet;

use diyplan_core::{
    LifecycleError, RemediationSuggestion, ScheduleError, ScheduleSink, SchedulingInputs,
    SchedulingResult,
};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::{compute_with, remediation};

/// Tracks the current draft and guards commits to a sink
#[derive(Debug)]
pub struct ScheduleManager<S: ScheduleSink> {
    sink: S,
    config: EngineConfig,
    generation: u64,
    /// Fingerprints commit-eligible in the current generation
    eligible: HashSet<u64>,
    /// (generation, fingerprint) pairs already persisted
    committed: HashSet<(u64, u64)>,
}

impl<S: ScheduleSink> ScheduleManager<S> {
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, EngineConfig::default())
    }

    pub fn with_config(sink: S, config: EngineConfig) -> Self {
        Self {
            sink,
            config,
            generation: 0,
            eligible: HashSet::new(),
            committed: HashSet::new(),
        }
    }

    /// Compute a draft and make it the current one.
    ///
    /// A failed computation leaves the current generation untouched.
    pub fn compute(&mut self, inputs: &SchedulingInputs) -> Result<SchedulingResult, ScheduleError> {
        let draft = compute_with(inputs, &self.config)?;
        self.generation += 1;
        self.eligible.clear();
        self.eligible.insert(draft.inputs_fingerprint);
        info!(
            generation = self.generation,
            fingerprint = draft.inputs_fingerprint,
            "new draft"
        );
        Ok(draft)
    }

    /// Remediations for the current draft; their previews become eligible too
    pub fn suggest_remediations(
        &mut self,
        inputs: &SchedulingInputs,
        draft: &SchedulingResult,
    ) -> Result<Vec<RemediationSuggestion>, LifecycleError> {
        if !self.eligible.contains(&draft.inputs_fingerprint)
            || inputs.fingerprint() != draft.inputs_fingerprint
        {
            return Err(LifecycleError::StaleDraft(draft.inputs_fingerprint));
        }

        let suggestions = remediation::suggest_with(inputs, draft, &self.config);
        self.eligible
            .extend(suggestions.iter().map(|s| s.preview.inputs_fingerprint));
        Ok(suggestions)
    }

    /// Persist an eligible result through the sink, at most once
    pub fn commit(&mut self, result: &SchedulingResult) -> Result<(), LifecycleError> {
        let fingerprint = result.inputs_fingerprint;
        if !self.eligible.contains(&fingerprint) {
            warn!(fingerprint, generation = self.generation, "rejected stale commit");
            return Err(LifecycleError::StaleDraft(fingerprint));
        }
        if self.committed.contains(&(self.generation, fingerprint)) {
            warn!(fingerprint, generation = self.generation, "rejected repeated commit");
            return Err(LifecycleError::AlreadyCommitted(fingerprint));
        }

        self.sink.save(result)?;
        self.committed.insert((self.generation, fingerprint));
        info!(fingerprint, generation = self.generation, "schedule committed");
        Ok(())
    }

    pub fn is_committed(&self, result: &SchedulingResult) -> bool {
        self.committed
            .contains(&(self.generation, result.inputs_fingerprint))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use diyplan_core::{MemorySink, SinkError, Task, Worker};

    fn inputs(hours: f64) -> SchedulingInputs {
        let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let mut inputs = SchedulingInputs::new(
            day.and_hms_opt(8, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
        );
        inputs.workers.push(Worker::new("sam"));
        inputs.tasks.push(Task::new("paint").hours(hours));
        inputs
    }

    #[test]
    fn commit_once_then_reject() {
        let mut manager = ScheduleManager::new(MemorySink::new());
        let draft = manager.compute(&inputs(2.0)).unwrap();

        manager.commit(&draft).unwrap();
        assert!(manager.is_committed(&draft));
        assert!(matches!(
            manager.commit(&draft),
            Err(LifecycleError::AlreadyCommitted(_))
        ));
        assert_eq!(manager.sink().saved.len(), 1);
    }

    #[test]
    fn recompute_makes_old_draft_stale() {
        let mut manager = ScheduleManager::new(MemorySink::new());
        let old = manager.compute(&inputs(2.0)).unwrap();
        let new = manager.compute(&inputs(3.0)).unwrap();
        assert_eq!(manager.generation(), 2);

        assert!(matches!(manager.commit(&old), Err(LifecycleError::StaleDraft(_))));
        manager.commit(&new).unwrap();
        assert_eq!(manager.into_sink().saved.len(), 1);
    }

    #[test]
    fn failed_compute_keeps_current_draft() {
        let mut manager = ScheduleManager::new(MemorySink::new());
        let draft = manager.compute(&inputs(2.0)).unwrap();

        let mut broken = inputs(2.0);
        broken.workers.clear();
        assert!(manager.compute(&broken).is_err());
        assert_eq!(manager.generation(), 1);
        manager.commit(&draft).unwrap();
    }

    struct FailingSink;

    impl ScheduleSink for FailingSink {
        fn save(&mut self, _: &SchedulingResult) -> Result<(), SinkError> {
            Err(SinkError::Rejected("disk full".into()))
        }
    }

    #[test]
    fn sink_failure_leaves_draft_committable() {
        let mut manager = ScheduleManager::new(FailingSink);
        let draft = manager.compute(&inputs(2.0)).unwrap();
        assert!(matches!(manager.commit(&draft), Err(LifecycleError::Sink(_))));
        assert!(!manager.is_committed(&draft));
    }

    #[test]
    fn remediation_requires_current_draft() {
        let mut manager = ScheduleManager::new(MemorySink::new());
        let req = inputs(2.0);
        let draft = manager.compute(&req).unwrap();
        manager.compute(&inputs(3.0)).unwrap();
        assert!(matches!(
            manager.suggest_remediations(&req, &draft),
            Err(LifecycleError::StaleDraft(_))
        ));
    }
}
