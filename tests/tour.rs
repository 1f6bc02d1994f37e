use kestrel_scale::cli::{parse_tour, DEFAULT_TOUR};
use kestrel_scale::config::EngineConfig;
use kestrel_scale::ecs::ScaleWorld;
use kestrel_scale::input::ScaleCommand;
use kestrel_scale::tour::run_tour;
use kestrel_scale::{ScaleEngine, ScaleLevel};

const FRAME: f32 = 1.0 / 60.0;

#[test]
fn default_tour_visits_every_step() {
    let mut engine = ScaleEngine::new(&EngineConfig::default());
    let tour = parse_tour(DEFAULT_TOUR).expect("default tour parses");
    let report = run_tour(&mut engine, &tour, FRAME, 600);

    let visited: Vec<_> = report.steps.iter().map(|step| step.scale).collect();
    assert_eq!(
        visited,
        vec![
            ScaleLevel::Planetary,
            ScaleLevel::Stellar,
            ScaleLevel::Planetary,
            ScaleLevel::Stellar,
            ScaleLevel::Galactic,
            ScaleLevel::Atomic,
        ]
    );
    assert_eq!(report.transitions_completed, 6);
    assert!(report.steps.iter().all(|step| step.frames > 0 && step.frames < 600));
    assert_eq!(report.final_state.current_scale, ScaleLevel::Atomic);
    assert!(!report.final_state.is_transitioning);
    assert_eq!(engine.navigator().events().len(), 0, "tour unsubscribes its listener");
}

#[test]
fn frame_cap_leaves_transition_in_flight() {
    let mut engine = ScaleEngine::with_initial_scale(ScaleLevel::Human);
    let report = run_tour(&mut engine, &[ScaleCommand::JumpTo(ScaleLevel::Universe)], FRAME, 5);
    assert_eq!(report.steps[0].frames, 5);
    assert_eq!(report.transitions_completed, 0);
    assert!(report.final_state.is_transitioning);
    assert_eq!(report.final_state.target_scale, Some(ScaleLevel::Universe));
}

#[test]
fn world_schedule_drives_queued_commands() {
    let mut world = ScaleWorld::new(ScaleEngine::with_initial_scale(ScaleLevel::Cellular));
    world.push_command(ScaleCommand::ScaleDown);
    world.push_command(ScaleCommand::ScaleUp);
    for _ in 0..120 {
        world.update(FRAME);
    }
    let engine = world.engine();
    assert_eq!(engine.state().current(), ScaleLevel::Molecular, "second command hit a busy navigator");
    assert_eq!(engine.current_camera_distance(), 15.0);
}
