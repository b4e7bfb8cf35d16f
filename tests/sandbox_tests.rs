use parkour::app::{SandboxApp, TransitionRecord};
use parkour::movement::presets::{default_graph, AIRBORNE, GROUNDED, WALL_GRABBING, WALL_RUNNING};
use parkour::movement::OptionRegistry;
use parkour::script::Scenario;
use parkour::settings::{MovementSettings, SandboxSettings};

fn app_for(scenario: Scenario) -> SandboxApp {
    let machine = default_graph(OptionRegistry::builtin(), MovementSettings::default()).unwrap();
    SandboxApp::new(machine, scenario.script(), SandboxSettings::default()).unwrap()
}

fn record(from: Option<&str>, to: &str) -> TransitionRecord {
    TransitionRecord {
        from: from.map(str::to_string),
        to: to.to_string(),
    }
}

fn entered(records: &[TransitionRecord], from: &str, to: &str) -> bool {
    records.contains(&record(Some(from), to))
}

#[test]
fn hop_leaves_the_ground_and_lands_again() {
    let mut app = app_for(Scenario::Hop);
    let report = app.run(3.0, 60.0).unwrap();

    assert_eq!(
        report.transitions,
        vec![
            record(None, GROUNDED),
            record(Some(GROUNDED), AIRBORNE),
            record(Some(AIRBORNE), GROUNDED),
        ]
    );
    assert_eq!(report.final_state.as_deref(), Some(GROUNDED));
    assert!((report.final_position.y - 0.5).abs() < 1e-2);
}

#[test]
fn hop_peaks_near_the_configured_height() {
    let mut app = app_for(Scenario::Hop);
    let mut peak: f32 = 0.0;
    for _ in 0..180 {
        app.frame(1.0 / 60.0).unwrap();
        peak = peak.max(app.player_position().y);
    }
    // Rest height 0.5 plus a 1.5 m jump, within integration error
    assert!((peak - 2.0).abs() < 0.15, "peak {peak}");
}

#[test]
fn idle_never_changes_state() {
    let mut app = app_for(Scenario::Idle);
    let report = app.run(2.0, 60.0).unwrap();
    assert_eq!(report.transitions, vec![record(None, GROUNDED)]);
}

#[test]
fn drifting_into_the_wall_starts_a_wall_run() {
    let mut app = app_for(Scenario::WallRun);
    let report = app.run(2.5, 60.0).unwrap();
    assert!(entered(&report.transitions, AIRBORNE, WALL_RUNNING), "{:?}", report.transitions);
    assert!(!entered(&report.transitions, AIRBORNE, WALL_GRABBING));
}

#[test]
fn holding_grab_prefers_the_wall_grab() {
    let mut app = app_for(Scenario::WallGrab);
    let report = app.run(2.5, 60.0).unwrap();
    assert!(entered(&report.transitions, AIRBORNE, WALL_GRABBING), "{:?}", report.transitions);
    assert!(!entered(&report.transitions, AIRBORNE, WALL_RUNNING));
}

#[test]
fn frame_rate_does_not_change_physics_tick_count() {
    let mut fast = app_for(Scenario::Idle);
    let mut slow = app_for(Scenario::Idle);
    let a = fast.run(1.0, 120.0).unwrap();
    let b = slow.run(1.0, 30.0).unwrap();
    assert!((a.physics_ticks as i32 - 60).abs() <= 1);
    assert!((b.physics_ticks as i32 - 60).abs() <= 1);
}
