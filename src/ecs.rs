//! Glue for hosts that keep the engine inside a `bevy_ecs` world.

use crate::engine::ScaleEngine;
use crate::input::ScaleCommand;
use bevy_ecs::prelude::*;

#[derive(Resource, Clone, Copy, Default)]
pub struct TimeDelta(pub f32);

/// Commands queued by UI code this frame, applied before the transition advances.
#[derive(Debug, Default, Resource)]
pub struct PendingScaleCommands {
    commands: Vec<ScaleCommand>,
}

impl PendingScaleCommands {
    pub fn push(&mut self, command: ScaleCommand) {
        self.commands.push(command);
    }

    pub fn drain(&mut self) -> Vec<ScaleCommand> {
        self.commands.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

pub fn sys_apply_scale_commands(mut engine: ResMut<ScaleEngine>, mut pending: ResMut<PendingScaleCommands>) {
    for command in pending.drain() {
        engine.execute(command);
    }
}

pub fn sys_advance_scale_engine(mut engine: ResMut<ScaleEngine>, dt: Res<TimeDelta>) {
    engine.frame(dt.0);
}

/// A world holding the engine as a resource plus the per-frame schedule that drives it.
pub struct ScaleWorld {
    pub world: World,
    schedule: Schedule,
}

impl ScaleWorld {
    pub fn new(engine: ScaleEngine) -> Self {
        let mut world = World::new();
        world.insert_resource(engine);
        world.insert_resource(TimeDelta(0.0));
        world.insert_resource(PendingScaleCommands::default());

        let mut schedule = Schedule::default();
        schedule.add_systems((sys_apply_scale_commands, sys_advance_scale_engine).chain());

        Self { world, schedule }
    }

    pub fn push_command(&mut self, command: ScaleCommand) {
        self.world.resource_mut::<PendingScaleCommands>().push(command);
    }

    pub fn update(&mut self, dt: f32) {
        self.world.resource_mut::<TimeDelta>().0 = dt;
        self.schedule.run(&mut self.world);
    }

    pub fn engine(&self) -> &ScaleEngine {
        self.world.resource::<ScaleEngine>()
    }

    pub fn engine_mut(&mut self) -> Mut<'_, ScaleEngine> {
        self.world.resource_mut::<ScaleEngine>()
    }
}
