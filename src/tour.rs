use crate::engine::{CommandOutcome, ScaleEngine};
use crate::events::ScaleEventKind;
use crate::input::ScaleCommand;
use crate::navigator::ScaleSnapshot;
use crate::scale::ScaleLevel;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct TourStep {
    pub command: String,
    pub outcome: String,
    pub scale: ScaleLevel,
    pub frames: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TourReport {
    pub steps: Vec<TourStep>,
    pub transitions_completed: u32,
    pub total_frames: u64,
    pub final_state: ScaleSnapshot,
}

/// Replays `commands` against `engine` with synthetic fixed-step frames, waiting for each
/// transition to settle (or `max_frames_per_step` to run out) before the next command.
pub fn run_tour(
    engine: &mut ScaleEngine,
    commands: &[ScaleCommand],
    frame_dt: f32,
    max_frames_per_step: u32,
) -> TourReport {
    let completed = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&completed);
    let subscription = engine.subscribe("tour", move |event, _| {
        if event.kind == ScaleEventKind::Complete {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        log::info!(target: "scale::tour", "[tour] {event}");
        Ok(())
    });

    let mut steps = Vec::with_capacity(commands.len());
    let mut total_frames = 0u64;
    for command in commands {
        let outcome = engine.execute(*command);
        let mut frames = 0;
        while engine.state().is_transitioning() && frames < max_frames_per_step {
            engine.frame(frame_dt);
            frames += 1;
        }
        total_frames += frames as u64;
        steps.push(TourStep {
            command: format!("{command:?}"),
            outcome: describe(outcome),
            scale: engine.state().current(),
            frames,
        });
    }
    engine.unsubscribe(subscription);

    TourReport {
        steps,
        transitions_completed: completed.load(Ordering::Relaxed),
        total_frames,
        final_state: engine.snapshot(),
    }
}

fn describe(outcome: CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Navigation(nav) => format!("{nav:?}"),
        CommandOutcome::Quality { tier, changed: true } => format!("quality -> {tier}"),
        CommandOutcome::Quality { tier, changed: false } => format!("quality unchanged ({tier})"),
    }
}
