use crate::camera::ScaleCamera;
use crate::config::EngineConfig;
use crate::events::{ScaleEvent, SubscriptionId};
use crate::governor::{PerformanceGovernor, PerformanceSample, QualityChange};
use crate::input::ScaleCommand;
use crate::navigator::{NavigationOutcome, NavigatorSettings, ScaleNavigator, ScaleSnapshot, ScaleState};
use crate::quality::{camera_bounds_for, camera_distance_for, lod_for, QualityTier};
use crate::render_params::RenderParams;
use crate::scale::{ScaleInfo, ScaleLevel};
use anyhow::Result;
use bevy_ecs::prelude::Resource;

/// Who last wrote the shared quality slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualitySource {
    Config,
    Manual,
    Governor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Navigation(NavigationOutcome),
    Quality { tier: QualityTier, changed: bool },
}

impl CommandOutcome {
    pub fn started(self) -> bool {
        matches!(self, CommandOutcome::Navigation(outcome) if outcome.started())
    }
}

/// The one navigation engine instance a host application holds.
///
/// Owns the scale navigator, the performance governor and the quality slot they
/// share with the render-detail selector. Driven by [`ScaleEngine::frame`] once per
/// rendered frame on the render thread.
#[derive(Debug, Resource)]
pub struct ScaleEngine {
    navigator: ScaleNavigator,
    governor: PerformanceGovernor,
    camera: ScaleCamera,
    quality: QualityTier,
    quality_source: QualitySource,
    auto_quality: bool,
}

impl ScaleEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let nav = &config.navigation;
        let settings = NavigatorSettings {
            transition_duration: nav.transition_duration_secs.max(0.0),
            easing: nav.easing,
            max_history: nav.max_history,
        };
        let navigator = ScaleNavigator::with_settings(nav.initial_scale, settings);
        let camera = ScaleCamera::new(
            navigator.current_info(),
            config.camera.fov_degrees.to_radians(),
            config.camera.zoom_sensitivity,
        );
        log::info!(
            target: "scale::engine",
            "[engine] starting at {} (quality {}, auto {})",
            nav.initial_scale,
            config.quality.tier,
            config.quality.auto_adjust
        );
        Self {
            navigator,
            governor: PerformanceGovernor::new(config.governor.to_settings()),
            camera,
            quality: config.quality.tier,
            quality_source: QualitySource::Config,
            auto_quality: config.quality.auto_adjust,
        }
    }

    pub fn with_initial_scale(initial: ScaleLevel) -> Self {
        let mut config = EngineConfig::default();
        config.navigation.initial_scale = initial;
        Self::new(&config)
    }

    /// Per-frame entry point: drives the transition, samples frame time and keeps the
    /// camera in step. Returns true when a transition committed during this frame.
    pub fn frame(&mut self, dt: f32) -> bool {
        let committed = self.navigator.advance(dt);
        if let Some(change) = self.governor.record_frame(dt, self.quality, self.auto_quality) {
            self.apply_governor_change(change);
        }
        self.camera.follow(&self.navigator);
        committed
    }

    /// Feeds an externally measured sample to the governor.
    pub fn record_performance(&mut self, sample: PerformanceSample) -> Option<QualityChange> {
        let change = self.governor.record_sample(sample, self.quality, self.auto_quality)?;
        self.apply_governor_change(change);
        Some(change)
    }

    pub fn report_memory(&mut self, used_bytes: u64, budget_bytes: u64) {
        self.governor.report_memory(used_bytes, budget_bytes);
    }

    fn apply_governor_change(&mut self, change: QualityChange) {
        self.quality = change.to;
        self.quality_source = QualitySource::Governor;
    }

    pub fn transition_to_scale(&mut self, level: ScaleLevel) -> NavigationOutcome {
        self.navigator.transition_to(level)
    }

    pub fn scale_up(&mut self) -> NavigationOutcome {
        self.navigator.scale_up()
    }

    pub fn scale_down(&mut self) -> NavigationOutcome {
        self.navigator.scale_down()
    }

    pub fn jump_to_magnitude(&mut self, magnitude: i32) -> NavigationOutcome {
        self.navigator.jump_to_magnitude(magnitude)
    }

    pub fn go_back(&mut self) -> NavigationOutcome {
        self.navigator.go_back()
    }

    pub fn can_transition_to(&self, level: ScaleLevel) -> bool {
        self.navigator.can_transition_to(level)
    }

    /// Applies one input command. Quality commands count as manual overrides.
    pub fn execute(&mut self, command: ScaleCommand) -> CommandOutcome {
        let outcome = match command {
            ScaleCommand::ScaleUp => self.scale_up(),
            ScaleCommand::ScaleDown => self.scale_down(),
            ScaleCommand::GoBack => self.go_back(),
            ScaleCommand::JumpTo(level) => self.transition_to_scale(level),
            ScaleCommand::JumpToMagnitude(magnitude) => self.jump_to_magnitude(magnitude),
            ScaleCommand::QualityUp => return self.step_quality(self.quality.higher()),
            ScaleCommand::QualityDown => return self.step_quality(self.quality.lower()),
        };
        CommandOutcome::Navigation(outcome)
    }

    fn step_quality(&mut self, next: Option<QualityTier>) -> CommandOutcome {
        match next {
            Some(tier) => {
                self.set_quality(tier);
                CommandOutcome::Quality { tier, changed: true }
            }
            None => CommandOutcome::Quality { tier: self.quality, changed: false },
        }
    }

    pub fn state(&self) -> &ScaleState {
        self.navigator.state()
    }

    pub fn snapshot(&self) -> ScaleSnapshot {
        self.navigator.snapshot()
    }

    pub fn scale_info(&self, level: Option<ScaleLevel>) -> &'static ScaleInfo {
        self.navigator.scale_info(level)
    }

    pub fn navigator(&self) -> &ScaleNavigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut ScaleNavigator {
        &mut self.navigator
    }

    pub fn governor(&self) -> &PerformanceGovernor {
        &self.governor
    }

    pub fn camera(&self) -> &ScaleCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut ScaleCamera {
        &mut self.camera
    }

    pub fn subscribe<F>(&mut self, label: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: FnMut(&ScaleEvent, &ScaleState) -> Result<()> + Send + Sync + 'static,
    {
        self.navigator.subscribe(label, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.navigator.unsubscribe(id)
    }

    pub fn quality(&self) -> QualityTier {
        self.quality
    }

    pub fn quality_source(&self) -> QualitySource {
        self.quality_source
    }

    /// Manual override of the shared quality slot. The governor may overwrite it later
    /// unless auto adjustment is disabled.
    pub fn set_quality(&mut self, tier: QualityTier) {
        if tier != self.quality {
            log::info!(target: "scale::engine", "[engine] quality set to {tier} by user");
        }
        self.quality = tier;
        self.quality_source = QualitySource::Manual;
    }

    pub fn auto_quality(&self) -> bool {
        self.auto_quality
    }

    pub fn set_auto_quality(&mut self, enabled: bool) {
        self.auto_quality = enabled;
    }

    pub fn current_camera_distance(&self) -> f32 {
        camera_distance_for(self.navigator.registry(), self.state().current())
    }

    pub fn target_camera_distance(&self) -> Option<f32> {
        self.state().target().map(|level| camera_distance_for(self.navigator.registry(), level))
    }

    pub fn camera_bounds(&self) -> (f32, f32) {
        camera_bounds_for(self.navigator.registry(), self.state().current())
    }

    pub fn current_lod(&self) -> u32 {
        lod_for(self.navigator.registry(), self.state().current(), self.quality)
    }

    pub fn render_params(&self) -> RenderParams {
        RenderParams::derive(self.navigator.registry(), self.state(), self.quality)
    }
}

impl Default for ScaleEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
