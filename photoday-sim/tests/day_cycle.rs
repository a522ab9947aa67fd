use photoday_sim::{
    ConfigError, DayPlan, EndReason, EventKind, LeafVariant, LightState, ManualClock,
    RecordingSink, RenderCall, SimConfig, SimulationController, SimulationPhase, TrialStore,
};

type Sim = SimulationController<RecordingSink, ManualClock>;

fn session(config: SimConfig) -> (Sim, ManualClock, TrialStore) {
    let clock = ManualClock::new();
    let store = TrialStore::new();
    let sim = SimulationController::new(
        config,
        store.clone(),
        RecordingSink::default(),
        clock.clone(),
    )
    .unwrap();
    (sim, clock, store)
}

fn run(sim: &mut Sim, clock: &ManualClock, ms: f64) {
    let mut elapsed = 0.0;
    while elapsed < ms {
        clock.advance(50.0);
        elapsed += 50.0;
        sim.tick();
    }
}

fn day_ms(light: LightState, stored: bool) -> f64 {
    DayPlan::build(light, stored)
        .steps
        .iter()
        .map(|step| step.duration_ms)
        .sum()
}

#[test]
fn full_light_days_accumulate_glucose() {
    let (mut sim, clock, store) = session(SimConfig::default());
    sim.start();
    let days = 5_u32;
    run(&mut sim, &clock, f64::from(days) * day_ms(LightState::On, false));

    let trial = store.current().unwrap();
    let created = i32::try_from(days).unwrap() * 4;
    let used = i32::try_from(days).unwrap() * 2;
    assert_eq!(trial.created_on(days), Some(created));
    assert_eq!(trial.used_on(days), Some(used));
    assert_eq!(trial.stored_on(days), Some(created - used));
    assert_eq!(sim.phase(), SimulationPhase::Running);
    assert!(!trial.has_event(EventKind::PlantDied));
}

#[test]
fn stored_series_is_always_created_minus_used() {
    let (mut sim, clock, store) = session(SimConfig::default());
    sim.start();
    run(&mut sim, &clock, 2.0 * day_ms(LightState::On, false) + 100.0);
    sim.request_light_change(0);
    run(&mut sim, &clock, 20_000.0);

    let trial = store.current().unwrap();
    for day in 0..=trial.last_day() {
        let created = trial.created_on(day).unwrap();
        let used = trial.used_on(day).unwrap();
        assert_eq!(trial.stored_on(day), Some(created - used), "day {day}");
    }
}

#[test]
fn darkness_without_storage_kills_on_day_one() {
    let config = SimConfig {
        initial_light: LightState::Off,
        ..SimConfig::default()
    };
    let (mut sim, clock, store) = session(config);
    sim.start();
    run(&mut sim, &clock, day_ms(LightState::Off, false));
    assert_eq!(sim.phase(), SimulationPhase::Ended(EndReason::PlantDied));
    assert_eq!(sim.day(), 1);

    let before = store.current().unwrap();
    assert_eq!(before.last_day(), 1);
    assert_eq!(before.created_on(1), Some(0));
    assert_eq!(before.used_on(1), Some(0));
    assert!(before.has_event(EventKind::PlantDied));
    assert_eq!(
        sim.sink().leaves(),
        vec![
            LeafVariant::Healthy,
            LeafVariant::Yellowing,
            LeafVariant::Browning,
            LeafVariant::Dead
        ]
    );
    assert_eq!(sim.sink().count(|call| *call == RenderCall::PlantDied), 1);

    run(&mut sim, &clock, 10_000.0);
    sim.fast_forward_day();
    assert_eq!(store.current().unwrap(), before);
}

#[test]
fn max_days_ends_the_simulation() {
    let config = SimConfig {
        max_days: 3,
        ..SimConfig::default()
    };
    let (mut sim, clock, store) = session(config);
    sim.start();
    run(&mut sim, &clock, 3.0 * day_ms(LightState::On, false));
    assert_eq!(sim.phase(), SimulationPhase::Ended(EndReason::MaxDaysReached));
    assert_eq!(sim.day(), 3);
    let trial = store.current().unwrap();
    assert_eq!(trial.last_day(), 3);
    assert!(trial.has_event(EventKind::SimulationEnded));
    assert_eq!(sim.sink().count(|call| *call == RenderCall::SimulationEnded), 1);
}

#[test]
fn pause_and_resume_match_an_uninterrupted_run() {
    let (mut steady, steady_clock, steady_store) = session(SimConfig::default());
    let (mut paused, paused_clock, paused_store) = session(SimConfig::default());
    let animated = 2.0 * day_ms(LightState::On, false) + 3_000.0;

    steady.start();
    run(&mut steady, &steady_clock, animated);

    paused.start();
    run(&mut paused, &paused_clock, 2_550.0);
    paused.pause();
    assert_eq!(paused.phase(), SimulationPhase::Paused);
    run(&mut paused, &paused_clock, 5_000.0);
    paused.resume();
    run(&mut paused, &paused_clock, animated - 2_550.0);

    assert!((steady.energy_level() - paused.energy_level()).abs() < 1e-9);
    assert_eq!(steady.day(), paused.day());
    assert_eq!(steady.active_step(), paused.active_step());
    let (steady_trial, paused_trial) = (
        steady_store.current().unwrap(),
        paused_store.current().unwrap(),
    );
    assert_eq!(steady_trial.created(), paused_trial.created());
    assert_eq!(steady_trial.used(), paused_trial.used());
    assert_eq!(steady_trial.stored(), paused_trial.stored());
}

#[test]
fn reset_opens_a_fresh_trial_and_freezes_the_old_one() {
    let config = SimConfig {
        initial_stored_glucose: 6,
        ..SimConfig::default()
    };
    let (mut sim, clock, store) = session(config);
    sim.start();
    run(&mut sim, &clock, day_ms(LightState::On, false) + 3_000.0);
    sim.reset();

    assert_eq!(store.len(), 2);
    assert_eq!(sim.phase(), SimulationPhase::Stopped);
    assert_eq!(sim.day(), 0);
    assert!((sim.energy_level() - 100.0).abs() < f64::EPSILON);
    assert_eq!(sim.ledger().stored_total(), 6);

    let fresh = store.current().unwrap();
    assert!(fresh.events().is_empty());
    assert_eq!(fresh.created(), &[(0, 6)]);
    assert_eq!(fresh.used(), &[(0, 0)]);
    assert_eq!(fresh.stored(), &[(0, 6)]);

    let outgoing = store.snapshot()[0].clone();
    assert_eq!(
        outgoing.events().last().map(|event| event.kind),
        Some(EventKind::ResetClicked)
    );
    assert_eq!(outgoing.last_day(), 1);

    sim.start();
    run(&mut sim, &clock, 2.0 * day_ms(LightState::On, false));
    sim.request_light_change(0);
    assert_eq!(store.snapshot()[0], outgoing);
}

#[test]
fn queued_light_applies_on_reset() {
    let (mut sim, clock, _store) = session(SimConfig::default());
    sim.start();
    run(&mut sim, &clock, 500.0);
    sim.request_light_change(0);
    assert_eq!(sim.light(), LightState::On);
    sim.reset();
    assert_eq!(sim.light(), LightState::Off);
    assert_eq!(sim.queued_light(), None);
}

#[test]
fn energy_stays_in_range_through_every_day_kind() {
    let (mut sim, clock, _store) = session(SimConfig::default());
    sim.start();
    run(&mut sim, &clock, day_ms(LightState::On, false));
    sim.request_light_change(0);
    run(&mut sim, &clock, 30_000.0);
    assert_eq!(sim.phase(), SimulationPhase::Ended(EndReason::PlantDied));

    let readings = sim.sink().energy_readings();
    assert!(readings.len() > 20);
    assert!(readings.iter().all(|level| (0.0..=100.0).contains(level)));
    assert!(readings.iter().any(|level| *level <= 5.0));
}

#[test]
fn coarse_ticks_keep_the_same_schedule() {
    let (mut fine, fine_clock, fine_store) = session(SimConfig::default());
    let (mut coarse, coarse_clock, coarse_store) = session(SimConfig::default());
    let total = 3.0 * day_ms(LightState::On, false);

    fine.start();
    run(&mut fine, &fine_clock, total);

    coarse.start();
    coarse_clock.advance(total);
    coarse.tick();

    assert_eq!(fine.day(), coarse.day());
    assert_eq!(
        fine_store.current().unwrap().created(),
        coarse_store.current().unwrap().created()
    );
}

#[test]
fn json_config_drives_a_session_and_exports_its_trials() -> anyhow::Result<()> {
    let config =
        SimConfig::from_json(r#"{ "initial_light": "off", "initial_stored_glucose": 2 }"#)?;
    let clock = ManualClock::new();
    let (mut sim, store) =
        photoday_sim::new_session(config, RecordingSink::default(), clock.clone())?;
    sim.start();
    run(
        &mut sim,
        &clock,
        day_ms(LightState::Off, true) + day_ms(LightState::Off, false),
    );
    assert_eq!(sim.phase(), SimulationPhase::Ended(EndReason::PlantDied));

    let exported: serde_json::Value = serde_json::from_str(&store.to_json()?)?;
    let trial = &exported[0];
    assert_eq!(
        trial["glucoseStoredData"],
        serde_json::json!([[0, 2], [1, 0], [2, 0]])
    );
    assert_eq!(trial["events"][0]["name"], "startClicked");
    assert_eq!(trial["events"][1]["name"], "plantDied");
    Ok(())
}

#[test]
fn plants_only_starve_once_storage_is_empty() -> anyhow::Result<()> {
    let odd = SimConfig::from_json(r#"{ "initial_light": "off", "initial_stored_glucose": 3 }"#);
    assert!(matches!(odd, Err(ConfigError::PartialDayStored { value: 3, per_day: 2 })));

    let config =
        SimConfig::from_json(r#"{ "initial_light": "off", "initial_stored_glucose": 4 }"#)?;
    let clock = ManualClock::new();
    let (mut sim, store) =
        photoday_sim::new_session(config, RecordingSink::default(), clock.clone())?;
    sim.start();
    while !sim.phase().is_ended() {
        clock.advance(100.0);
        sim.tick();
    }
    assert_eq!(sim.phase(), SimulationPhase::Ended(EndReason::PlantDied));

    let trial = store.current().ok_or_else(|| anyhow::anyhow!("no trial"))?;
    assert_eq!(trial.last_day(), 3);
    assert_eq!(trial.stored(), &[(0, 4), (1, 2), (2, 0), (3, 0)]);
    Ok(())
}
