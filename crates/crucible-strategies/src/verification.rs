//! Simulation-purpose verification.
//!
//! Checks an externally defined purpose against the simulation's
//! transition system by handing both, plus the simulator connector, to a
//! verification algorithm. On success the strategy's group is marked
//! finished so sibling strategies addressing the same question stop
//! early.

use tracing::info;

use crucible_engine::{SimulationRunner, SimulatorConnector, VerificationAlgorithm};
use crucible_protocol::{SimulationPurpose, SyncRecord, Verdict};
use crucible_types::{ExecutionMode, StorageMode};

use crate::strategy::{Chronometer, SharedGroups, Strategy, StrategyError};

/// Verifies one simulation purpose with one algorithm.
pub struct PurposeVerification {
    /// The purpose to verify; consumed by execution.
    purpose: Option<Box<dyn SimulationPurpose>>,
    /// The algorithm to use; consumed by execution.
    algorithm: Option<Box<dyn VerificationAlgorithm>>,
    group: String,
    verdict: Verdict,
    trace: Vec<SyncRecord>,
    found_solution: bool,
    skipped: bool,
    chronometer: Chronometer,
}

impl core::fmt::Debug for PurposeVerification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PurposeVerification")
            .field("group", &self.group)
            .field("verdict", &self.verdict)
            .field("found_solution", &self.found_solution)
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

impl PurposeVerification {
    /// Create the strategy.
    pub fn new(
        purpose: Box<dyn SimulationPurpose>,
        algorithm: Box<dyn VerificationAlgorithm>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            purpose: Some(purpose),
            algorithm: Some(algorithm),
            group: group.into(),
            verdict: Verdict::Inconclusive,
            trace: Vec::new(),
            found_solution: false,
            skipped: false,
            chronometer: Chronometer::new(),
        }
    }

    /// The verdict of the last execution.
    pub const fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Whether this strategy was the one that found the solution for its
    /// group.
    pub const fn found_solution(&self) -> bool {
        self.found_solution
    }

    /// The synchronization trace found, if any.
    pub fn trace(&self) -> &[SyncRecord] {
        &self.trace
    }
}

impl Strategy for PurposeVerification {
    fn name(&self) -> &str {
        "Simulation Purpose Verification"
    }

    fn execute(
        &mut self,
        runner: &mut SimulationRunner,
        groups: &SharedGroups,
    ) -> Result<(), StrategyError> {
        // The strategy only takes place if the group is not finished yet.
        if groups.is_finished(&self.group) {
            info!(group = %self.group, "Group already finished; skipping verification");
            self.skipped = true;
            return Ok(());
        }

        // Set up the runner for verification, with no simulation trace
        // storage; the algorithm keeps the states it needs.
        runner.setup_run(StorageMode::None, ExecutionMode::Verification)?;

        let ts = runner
            .initial_state()
            .environment()
            .transition_system()
            .ok_or_else(|| StrategyError::InvalidEnvironment {
                reason: String::from(
                    "purpose verification requires a transition-system coordinated environment",
                ),
            })?;

        let (Some(mut algorithm), Some(purpose)) = (self.algorithm.take(), self.purpose.take())
        else {
            return Err(StrategyError::AlreadyExecuted {
                strategy: "purpose verification",
            });
        };

        let mut connector = SimulatorConnector::new(runner);
        self.verdict = algorithm.verify(purpose.as_ref(), &ts, &mut connector)?;
        self.trace = algorithm.trace_found();

        info!(group = %self.group, verdict = %self.verdict, "Verification finished");

        // If the algorithm was successful, the whole group of strategies
        // is finished.
        if self.verdict == Verdict::Success {
            groups.mark_finished(self.group.clone());
            self.found_solution = true;
        }

        Ok(())
    }

    fn report(&self) -> String {
        let mut s = format!(
            "Simulation Purpose Verification strategy (group = {})\n",
            self.group
        );
        s.push_str("======================================================\n");

        if self.skipped {
            s.push_str("Skipped: the group was already finished.\n");
            return s;
        }

        s.push_str(&format!("Result = {}\n", self.verdict));
        s.push_str(&format!("Running time = {}\n\n", self.chronometer));

        if !self.trace.is_empty() {
            s.push_str("Run found:\n");
            for record in &self.trace {
                s.push_str(&format!("    {record}\n"));
            }
        }

        s
    }

    fn chronometer(&self) -> &Chronometer {
        &self.chronometer
    }

    fn chronometer_mut(&mut self) -> &mut Chronometer {
        &mut self.chronometer
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crucible_engine::SimulatorHarness;
    use crucible_model::{
        AgentBody, AgentControl, AgentRoster, CoordinatedEnvironment, InertBehavior,
        SimulationSnapshot,
    };
    use crucible_protocol::{
        AgentTransitionSystem, ProtocolError, RawLabel, TransitionSource, TsStateId, channel,
    };
    use crucible_types::AgentId;

    use super::*;

    struct CommitOnlySource;

    impl TransitionSource for CommitOnlySource {
        fn initial_state(&self) -> TsStateId {
            TsStateId::new(0)
        }

        fn raw_successors(
            &self,
            _state: TsStateId,
        ) -> Result<Vec<(RawLabel, TsStateId)>, ProtocolError> {
            Ok(vec![(RawLabel::new(channel::COMMIT), TsStateId::new(0))])
        }
    }

    struct NamedPurpose;

    impl SimulationPurpose for NamedPurpose {
        fn name(&self) -> &str {
            "eventually-stimulated"
        }
    }

    /// Steps the simulator a few times and returns a fixed verdict.
    struct FixedVerdict {
        verdict: Verdict,
        invocations: Arc<AtomicU32>,
    }

    impl VerificationAlgorithm for FixedVerdict {
        fn name(&self) -> &str {
            "fixed"
        }

        fn verify(
            &mut self,
            _purpose: &dyn SimulationPurpose,
            _ts: &AgentTransitionSystem,
            harness: &mut dyn SimulatorHarness,
        ) -> Result<Verdict, crucible_engine::InvalidRequest> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            harness.step()?;
            Ok(self.verdict)
        }
    }

    fn coordinated_runner() -> SimulationRunner {
        let agent_id = AgentId::new();
        let mut roster = AgentRoster::new();
        roster
            .push(AgentControl::new(
                AgentBody::new(agent_id, "alpha", BTreeSet::new(), BTreeSet::new()),
                Box::new(InertBehavior),
            ))
            .unwrap();

        let ts = AgentTransitionSystem::new(Arc::new(CommitOnlySource));
        SimulationRunner::new(SimulationSnapshot::new(
            Box::new(CoordinatedEnvironment::new("env", ts)),
            roster,
            Vec::new(),
            Vec::new(),
            Vec::new(),
        ))
    }

    fn strategy(verdict: Verdict, invocations: &Arc<AtomicU32>) -> PurposeVerification {
        PurposeVerification::new(
            Box::new(NamedPurpose),
            Box::new(FixedVerdict {
                verdict,
                invocations: Arc::clone(invocations),
            }),
            "g1",
        )
    }

    #[test]
    fn success_marks_the_group_finished() {
        let mut runner = coordinated_runner();
        let groups = SharedGroups::new();
        let invocations = Arc::new(AtomicU32::new(0));

        let mut first = strategy(Verdict::Success, &invocations);
        first.execute(&mut runner, &groups).unwrap();

        assert_eq!(first.verdict(), Verdict::Success);
        assert!(first.found_solution());
        assert!(groups.is_finished("g1"));
    }

    #[test]
    fn sibling_in_finished_group_is_a_no_op() {
        let mut runner = coordinated_runner();
        let groups = SharedGroups::new();
        let invocations = Arc::new(AtomicU32::new(0));

        let mut first = strategy(Verdict::Success, &invocations);
        first.execute(&mut runner, &groups).unwrap();
        assert_eq!(invocations.load(Ordering::SeqCst), 1);

        let mut second = strategy(Verdict::Success, &invocations);
        second.execute(&mut runner, &groups).unwrap();

        // The second strategy never ran its algorithm.
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
        assert!(!second.found_solution());
        assert!(second.report().contains("Skipped"));
    }

    #[test]
    fn failure_leaves_the_group_open() {
        let mut runner = coordinated_runner();
        let groups = SharedGroups::new();
        let invocations = Arc::new(AtomicU32::new(0));

        let mut first = strategy(Verdict::Failure, &invocations);
        first.execute(&mut runner, &groups).unwrap();

        assert_eq!(first.verdict(), Verdict::Failure);
        assert!(!groups.is_finished("g1"));

        let mut second = strategy(Verdict::Inconclusive, &invocations);
        second.execute(&mut runner, &groups).unwrap();
        assert_eq!(invocations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn executing_twice_is_an_error() {
        let mut runner = coordinated_runner();
        let groups = SharedGroups::new();
        let invocations = Arc::new(AtomicU32::new(0));

        let mut strategy = strategy(Verdict::Failure, &invocations);
        strategy.execute(&mut runner, &groups).unwrap();
        assert!(matches!(
            strategy.execute(&mut runner, &groups),
            Err(StrategyError::AlreadyExecuted { .. })
        ));
    }
}
