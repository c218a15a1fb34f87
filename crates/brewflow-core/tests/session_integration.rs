//! Integration tests for the session state machine.
//!
//! These drive whole sessions against a manual clock: the default V60 plan
//! end to end, the kind-table entry behavior for a mixed step sequence,
//! restart from every phase, and total closure of the intent set.

use std::sync::Arc;

use brewflow_core::config::MethodProfile;
use brewflow_core::events::SessionEvent;
use brewflow_core::plan::{BrewPlan, BrewPlanBuilder, ScaledStep};
use brewflow_core::recipe::{RecipeSnapshot, StepKind};
use brewflow_core::scaling::{scale, EditedField, ScaledInputs};
use brewflow_core::session::{ManualClock, SessionEngine, SessionPhase};
use uuid::Uuid;

fn v60_engine() -> (SessionEngine, ManualClock) {
    let recipe = RecipeSnapshot::default_v60();
    let inputs = ScaledInputs {
        dose_g: Some(20.0),
        last_edited: EditedField::Dose,
        ..ScaledInputs::unchanged()
    };
    let scaled = scale(&recipe, &inputs, &MethodProfile::v60());
    let plan = BrewPlanBuilder::build(&recipe, &scaled).unwrap();
    let clock = ManualClock::new(500_000);
    (SessionEngine::new(plan, Arc::new(clock.clone())), clock)
}

fn raw_step(index: usize, kind: StepKind, duration: Option<u64>, milestone: Option<u64>) -> ScaledStep {
    ScaledStep {
        index,
        kind,
        label: format!("{kind:?}"),
        instruction: format!("{kind:?}"),
        water_g: None,
        cumulative_g: None,
        duration_secs: duration,
        target_elapsed_secs: milestone,
    }
}

fn raw_plan(steps: Vec<ScaledStep>) -> BrewPlan {
    BrewPlan {
        recipe_id: Uuid::new_v4(),
        recipe_name: "test plan".into(),
        method: "v60".into(),
        steps,
        total_water_g: 0,
    }
}

/// Preparation advances straight into the bloom's confirmation gate;
/// confirming starts the countdown and the session clock at the same
/// instant.
#[test]
fn preparation_then_bloom_confirmation_flow() {
    let plan = raw_plan(vec![
        raw_step(0, StepKind::Preparation, None, None),
        raw_step(1, StepKind::Bloom, Some(30), None),
        raw_step(2, StepKind::Pour, None, Some(90)),
        raw_step(3, StepKind::Wait, Some(45), None),
    ]);
    let clock = ManualClock::new(0);
    let mut engine = SessionEngine::new(plan, Arc::new(clock.clone()));

    engine.start();
    assert_eq!(engine.phase(), SessionPhase::StepReady);

    engine.next();
    assert_eq!(engine.phase(), SessionPhase::AwaitingPour);
    assert!(!engine.session_clock_running());
    assert_eq!(engine.elapsed_ms(), None);

    engine.confirm_pour();
    assert_eq!(engine.phase(), SessionPhase::Active);
    assert_eq!(engine.remaining_ms(), Some(30_000));
    assert_eq!(engine.elapsed_ms(), Some(0));
}

#[test]
fn full_v60_session_end_to_end() {
    let (mut engine, clock) = v60_engine();

    engine.start(); // preparation
    engine.next(); // bloom
    engine.confirm_pour();
    clock.advance(45_000);
    assert!(matches!(
        engine.tick(),
        Some(SessionEvent::StepCompleted { step_index: 1, .. })
    ));

    engine.next(); // agitate
    assert_eq!(engine.phase(), SessionPhase::StepReady);
    engine.next(); // first pour
    assert_eq!(engine.phase(), SessionPhase::Active);

    clock.advance(50_000);
    assert!(engine.milestone_passed()); // 95 s elapsed vs 90 s milestone
    engine.next(); // second pour

    clock.advance(60_000);
    engine.next(); // drawdown wait
    assert_eq!(engine.phase(), SessionPhase::Active);
    assert_eq!(engine.remaining_ms(), Some(45_000));

    clock.advance(45_000);
    engine.tick();
    assert_eq!(engine.phase(), SessionPhase::StepReady);

    let event = engine.next().unwrap();
    match event {
        SessionEvent::SessionCompleted { elapsed_ms, .. } => {
            assert_eq!(elapsed_ms, Some(200_000));
        }
        other => panic!("expected SessionCompleted, got {other:?}"),
    }
}

/// On the final step, `next` from StepReady completes the session and the
/// elapsed clock freezes at its last value.
#[test]
fn completion_freezes_elapsed_clock() {
    let plan = raw_plan(vec![raw_step(0, StepKind::Wait, Some(10), None)]);
    let clock = ManualClock::new(0);
    let mut engine = SessionEngine::new(plan, Arc::new(clock.clone()));

    engine.start();
    clock.advance(10_000);
    engine.tick();
    engine.next();
    assert!(engine.is_completed());
    assert_eq!(engine.elapsed_ms(), Some(10_000));

    clock.advance(500_000);
    assert_eq!(engine.elapsed_ms(), Some(10_000));
}

#[test]
fn elapsed_clock_is_monotonic_across_reads() {
    let (mut engine, clock) = v60_engine();
    engine.start();
    engine.next();
    engine.confirm_pour();

    let mut previous = engine.elapsed_ms().unwrap();
    for advance in [50, 130, 999, 10_000, 1] {
        clock.advance(advance);
        let now = engine.elapsed_ms().unwrap();
        assert!(now >= previous);
        previous = now;
    }
}

/// Drive a fresh engine into the named phase.
fn engine_in_phase(phase: SessionPhase) -> (SessionEngine, ManualClock) {
    let (mut engine, clock) = v60_engine();
    match phase {
        SessionPhase::NotStarted => {}
        SessionPhase::StepReady => {
            engine.start();
        }
        SessionPhase::AwaitingPour => {
            engine.start();
            engine.next();
        }
        SessionPhase::Active => {
            engine.start();
            engine.next();
            engine.confirm_pour();
        }
        SessionPhase::Completed => {
            engine.start();
            engine.next();
            engine.confirm_pour();
            clock.advance(45_000);
            engine.tick();
            engine.next(); // agitate
            engine.next(); // pour 1
            engine.next(); // pour 2
            engine.next(); // wait
            clock.advance(45_000);
            engine.tick();
            engine.next();
            assert!(engine.is_completed());
        }
    }
    assert_eq!(engine.phase(), phase);
    (engine, clock)
}

const ALL_PHASES: [SessionPhase; 5] = [
    SessionPhase::NotStarted,
    SessionPhase::AwaitingPour,
    SessionPhase::Active,
    SessionPhase::StepReady,
    SessionPhase::Completed,
];

/// Every intent has defined behavior in every phase: a transition from the
/// kind table or a no-op. Nothing panics, and the phase afterwards is
/// always a legal member of the enum's reachable set.
#[test]
fn intent_table_is_total() {
    for phase in ALL_PHASES {
        for intent in 0..6 {
            let (mut engine, clock) = engine_in_phase(phase);
            clock.advance(1_000);
            match intent {
                0 => {
                    engine.start();
                }
                1 => {
                    engine.confirm_pour();
                }
                2 => {
                    engine.next();
                }
                3 => {
                    engine.pause();
                    engine.resume();
                }
                4 => {
                    engine.restart();
                    assert_eq!(engine.phase(), SessionPhase::NotStarted);
                }
                5 => {
                    engine.tick();
                }
                _ => unreachable!(),
            }
            // The countdown invariant holds after every intent: remaining
            // time is set only while the step is actively counting down.
            if engine.remaining_ms().is_some() {
                assert_eq!(engine.phase(), SessionPhase::Active);
            }
        }
    }
}

#[test]
fn restart_resets_state_from_every_phase() {
    for phase in ALL_PHASES {
        let (mut engine, _clock) = engine_in_phase(phase);
        engine.restart();
        assert_eq!(engine.phase(), SessionPhase::NotStarted, "from {phase:?}");
        assert_eq!(engine.step_index(), 0);
        assert_eq!(engine.remaining_ms(), None);
        assert_eq!(engine.elapsed_ms(), None);
        assert!(!engine.session_clock_running());

        // The session is fully reusable after restart.
        engine.start();
        assert_eq!(engine.phase(), SessionPhase::StepReady);
    }
}
