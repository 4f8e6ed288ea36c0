//! End-to-end experiment flows over a small scripted scenario.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crucible_engine::{
    InvalidRequest, SimulationRunner, SimulatorHarness, VerificationAlgorithm,
};
use crucible_model::{
    AgentBody, AgentControl, AgentRoster, BearerKind, ComponentRegistry, CoordinatedEnvironment,
    InstantiationError, Property, PropertyBearer, Relation, Scenario, SimulationSnapshot,
};
use crucible_protocol::{
    AgentTransitionSystem, ProtocolError, RawLabel, SimulationPurpose, TransitionSource,
    TsStateId, Verdict, channel,
};
use crucible_strategies::{Experiment, StimulusDeliveryOptimization, TargetSampling};
use crucible_types::{AgentId, ExecutionMode, PropertyId, StimulationStatus, Stimulus,
    StorageMode};

/// Begin light stimulation on the chosen agent, then commit, forever.
struct LoopSource {
    agent: AgentId,
}

impl TransitionSource for LoopSource {
    fn initial_state(&self) -> TsStateId {
        TsStateId::new(0)
    }

    fn raw_successors(&self, state: TsStateId) -> Result<Vec<(RawLabel, TsStateId)>, ProtocolError> {
        if state == TsStateId::new(0) {
            Ok(vec![(
                RawLabel::new(channel::BEGINNING)
                    .with_agent(self.agent)
                    .with_stimulus(Stimulus::new("light")),
                TsStateId::new(1),
            )])
        } else {
            Ok(vec![(RawLabel::new(channel::COMMIT), TsStateId::new(0))])
        }
    }
}

/// Two inert agents under a coordinated environment; `alpha` carries a
/// numeric stimulation-count property.
struct LabScenario;

/// The ids the scenario hands out, fixed so tests can refer to them.
struct LabIds {
    alpha: AgentId,
    beta: AgentId,
    stimulated: PropertyId,
}

impl LabScenario {
    fn build(
        registry: &ComponentRegistry,
    ) -> Result<(SimulationSnapshot, LabIds), InstantiationError> {
        let ids = LabIds {
            alpha: AgentId::new(),
            beta: AgentId::new(),
            stimulated: PropertyId::new(),
        };

        let mut roster = AgentRoster::new();
        for (id, name) in [(ids.alpha, "alpha"), (ids.beta, "beta")] {
            let behavior = registry.create_behavior("inert", &BTreeMap::new())?;
            roster.push(AgentControl::new(
                AgentBody::new(
                    id,
                    name,
                    BTreeSet::new(),
                    BTreeSet::from([Stimulus::new("light")]),
                ),
                behavior,
            ))?;
        }

        let mut params = BTreeMap::new();
        params.insert(String::from("phase"), String::from("beginning"));
        let counting = registry.create_property("stimulation-phase-count", &params)?;

        let mut knows = Relation::new(crucible_types::RelationId::new(), "knows", "acquaintance");
        knows.add(ids.alpha, ids.beta);

        let ts = AgentTransitionSystem::new(Arc::new(LoopSource { agent: ids.alpha }));
        let snapshot = SimulationSnapshot::new(
            Box::new(CoordinatedEnvironment::new("lab", ts)),
            roster,
            vec![knows],
            vec![Property::new(ids.stimulated, "stimulated", counting)],
            vec![PropertyBearer::new(
                "alpha",
                BearerKind::Agent(ids.alpha),
                vec![ids.stimulated],
            )],
        );
        Ok((snapshot, ids))
    }
}

impl Scenario for LabScenario {
    fn name(&self) -> &str {
        "lab"
    }

    fn create_initial_state(
        &self,
        registry: &ComponentRegistry,
    ) -> Result<SimulationSnapshot, InstantiationError> {
        Self::build(registry).map(|(snapshot, _)| snapshot)
    }
}

struct NamedPurpose;

impl SimulationPurpose for NamedPurpose {
    fn name(&self) -> &str {
        "eventually-stimulated"
    }
}

/// Synchronizes a couple of rounds against the loop source, then reports
/// success iff the light stimulation arrived.
struct ReachStimulation {
    invocations: Arc<AtomicU32>,
    target: AgentId,
}

impl VerificationAlgorithm for ReachStimulation {
    fn name(&self) -> &str {
        "reach-stimulation"
    }

    fn verify(
        &mut self,
        _purpose: &dyn SimulationPurpose,
        ts: &AgentTransitionSystem,
        harness: &mut dyn SimulatorHarness,
    ) -> Result<Verdict, InvalidRequest> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        harness.setup()?;

        let mut state = ts.initial_state();
        let mut safeguards = crucible_protocol::TraceSafeguards::new();
        struct NoContext;
        impl crucible_protocol::ContextView for NoContext {
            fn action_status(
                &self,
                _agent: AgentId,
                _action: &crucible_types::AgentAction,
            ) -> Option<crucible_types::ActionStatus> {
                None
            }
        }

        for _ in 0..4 {
            let successors = ts
                .successors(state, &NoContext, &safeguards)
                .map_err(|e| InvalidRequest::new(e.to_string()))?;
            let Some((event, target)) = successors.into_iter().next() else {
                break;
            };
            ts.event_scheduled(&event, &mut safeguards);
            harness.schedule_step(&event)?;
            if event.is_commit() {
                harness.step()?;
            }
            state = target;
        }

        let stimulated = harness
            .current_state()
            .agent(self.target)
            .is_some_and(|agent| {
                agent.body().stimulation_status(&Stimulus::new("light"))
                    == StimulationStatus::Beginning
            });
        Ok(if stimulated {
            Verdict::Success
        } else {
            Verdict::Failure
        })
    }
}

fn lab() -> (SimulationRunner, LabIds) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let registry = ComponentRegistry::with_builtins();
    let (snapshot, ids) = LabScenario::build(&registry).unwrap();
    (SimulationRunner::new(snapshot), ids)
}

#[test]
fn scenario_builds_through_the_registry() {
    let registry = ComponentRegistry::with_builtins();
    let snapshot = LabScenario.create_initial_state(&registry).unwrap();
    assert_eq!(snapshot.agents().len(), 2);
    assert_eq!(snapshot.properties().len(), 1);
    assert_eq!(snapshot.relations().len(), 1);
}

#[test]
fn relations_survive_stepping_untouched() {
    let (mut runner, ids) = lab();
    runner
        .setup_run(StorageMode::Full, ExecutionMode::Verification)
        .unwrap();
    runner.run_steps(2).unwrap();

    let relation = runner.current_state().relations().first().unwrap();
    assert!(relation.contains(ids.alpha, ids.beta));
    assert!(!relation.contains(ids.beta, ids.alpha));
}

#[test]
fn full_storage_run_keeps_every_position() {
    let (mut runner, _) = lab();
    runner
        .setup_run(StorageMode::Full, ExecutionMode::Exploration)
        .unwrap();
    let run = runner.run_steps(3).unwrap();

    assert_eq!(run.len(), 4);
    assert_eq!(run.fossilized_trace().unwrap().len(), 4);
}

#[test]
fn experiment_short_circuits_verification_groups() {
    let (mut runner, ids) = lab();
    let invocations = Arc::new(AtomicU32::new(0));

    let mut experiment = Experiment::new("lab-verification", "two algorithms, one question");
    experiment.add_purpose_verification(
        Box::new(NamedPurpose),
        Box::new(ReachStimulation {
            invocations: Arc::clone(&invocations),
            target: ids.alpha,
        }),
        "q1",
    );
    experiment.add_purpose_verification(
        Box::new(NamedPurpose),
        Box::new(ReachStimulation {
            invocations: Arc::clone(&invocations),
            target: ids.alpha,
        }),
        "q1",
    );

    let report = experiment.run(&mut runner);

    assert!(report.is_success());
    // The loop source stimulates alpha within two rounds, so the first
    // algorithm succeeds and the second never runs.
    assert!(experiment.groups().is_finished("q1"));
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert!(report.outcomes.get(1).unwrap().report.contains("Skipped"));
}

#[test]
fn experiment_mixes_standard_exploration_and_optimization() {
    let (mut runner, ids) = lab();

    let mut experiment = Experiment::new("lab-mixed", "everything at once");
    experiment.add_standard_simulation(1, 3).unwrap();
    experiment.add_random_exploration(1, 6, "walk").unwrap();
    experiment.add_strategy(Box::new(
        StimulusDeliveryOptimization::new(
            1,
            2,
            Stimulus::new("light"),
            ids.stimulated,
            "alpha",
            1,
        )
        .unwrap()
        .with_sampling(TargetSampling::Random { trials: 4 }),
    ));

    let report = experiment.run(&mut runner);

    assert!(report.is_success(), "report: {report}");
    assert_eq!(report.outcomes.len(), 3);
    for outcome in &report.outcomes {
        assert!(outcome.error.is_none());
    }
}

#[test]
fn exploration_mode_chooses_paths_on_its_own() {
    let (mut runner, ids) = lab();
    runner
        .setup_run(StorageMode::Fossilized, ExecutionMode::Exploration)
        .unwrap();
    runner.run_steps(2).unwrap();

    // The coordinated environment walked its transition system and
    // delivered the stimulation alpha was waiting for.
    assert_eq!(
        runner
            .current_state()
            .agent(ids.alpha)
            .unwrap()
            .body()
            .stimulation_status(&Stimulus::new("light")),
        StimulationStatus::Beginning
    );

    // The fossilized trace recorded the observation.
    let fossils = runner.run().fossilized_trace().unwrap();
    assert_eq!(fossils.last().unwrap().get("stimulated@alpha"), Some("1"));
}
