use crate::easing::Easing;
use crate::events::{ScaleEvent, ScaleEventChannel, SubscriptionId};
use crate::scale::{ScaleInfo, ScaleLevel, ScaleRegistry};
use crate::transition::{ActiveTransition, TransitionOrigin};
use anyhow::Result;
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_MAX_HISTORY: usize = 10;
pub const DEFAULT_TRANSITION_SECS: f32 = 1.0;

/// Mutable navigation record. One writer (the navigator), any number of readers.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleState {
    current: ScaleLevel,
    target: Option<ScaleLevel>,
    progress: f32,
    history: VecDeque<ScaleLevel>,
    max_history: usize,
}

impl ScaleState {
    pub fn new(initial: ScaleLevel, max_history: usize) -> Self {
        let max_history = max_history.max(1);
        let mut history = VecDeque::with_capacity(max_history);
        history.push_back(initial);
        Self { current: initial, target: None, progress: 0.0, history, max_history }
    }

    pub fn current(&self) -> ScaleLevel {
        self.current
    }

    pub fn target(&self) -> Option<ScaleLevel> {
        self.target
    }

    pub fn is_transitioning(&self) -> bool {
        self.target.is_some()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn history(&self) -> impl Iterator<Item = ScaleLevel> + '_ {
        self.history.iter().copied()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// The entry visited before the current one, if any.
    pub fn previous(&self) -> Option<ScaleLevel> {
        let len = self.history.len();
        if len < 2 {
            return None;
        }
        self.history.get(len - 2).copied()
    }

    fn push_history(&mut self, level: ScaleLevel) {
        self.history.push_back(level);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    pub fn snapshot(&self) -> ScaleSnapshot {
        ScaleSnapshot {
            current_scale: self.current,
            target_scale: self.target,
            is_transitioning: self.is_transitioning(),
            transition_progress: self.progress,
            scale_history: self.history.iter().copied().collect(),
            available_scales: ScaleLevel::ALL.to_vec(),
        }
    }
}

/// Owned copy of the navigation state, valid until the next tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleSnapshot {
    pub current_scale: ScaleLevel,
    pub target_scale: Option<ScaleLevel>,
    pub is_transitioning: bool,
    pub transition_progress: f32,
    pub scale_history: Vec<ScaleLevel>,
    pub available_scales: Vec<ScaleLevel>,
}

/// Result of a navigation command. Nothing but `Started` changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Started { from: ScaleLevel, to: ScaleLevel },
    AlreadyAtScale,
    Busy,
    NoNeighbor,
    UnknownMagnitude,
    NoHistory,
}

impl NavigationOutcome {
    pub fn started(self) -> bool {
        matches!(self, NavigationOutcome::Started { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigatorSettings {
    pub transition_duration: f32,
    pub easing: Easing,
    pub max_history: usize,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self { transition_duration: DEFAULT_TRANSITION_SECS, easing: Easing::default(), max_history: DEFAULT_MAX_HISTORY }
    }
}

/// Scale state machine: `Idle(current)` or `Transitioning(current, target, progress)`.
///
/// The navigator owns no clock. The host calls [`ScaleNavigator::advance`] with the
/// frame delta, or [`ScaleNavigator::tick`] with the time elapsed since the
/// transition started.
#[derive(Debug)]
pub struct ScaleNavigator {
    registry: ScaleRegistry,
    settings: NavigatorSettings,
    state: ScaleState,
    active: Option<ActiveTransition>,
    channel: ScaleEventChannel,
    clock: f64,
}

impl ScaleNavigator {
    pub fn new(initial: ScaleLevel) -> Self {
        Self::with_settings(initial, NavigatorSettings::default())
    }

    pub fn with_settings(initial: ScaleLevel, settings: NavigatorSettings) -> Self {
        let registry = ScaleRegistry::standard();
        Self {
            registry,
            settings,
            state: ScaleState::new(initial, settings.max_history),
            active: None,
            channel: ScaleEventChannel::new(),
            clock: 0.0,
        }
    }

    pub fn registry(&self) -> &ScaleRegistry {
        &self.registry
    }

    pub fn settings(&self) -> NavigatorSettings {
        self.settings
    }

    pub fn set_transition_duration(&mut self, seconds: f32) {
        if seconds.is_finite() && seconds >= 0.0 {
            self.settings.transition_duration = seconds;
        }
    }

    pub fn set_easing(&mut self, easing: Easing) {
        self.settings.easing = easing;
    }

    pub fn state(&self) -> &ScaleState {
        &self.state
    }

    pub fn snapshot(&self) -> ScaleSnapshot {
        self.state.snapshot()
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn active_transition(&self) -> Option<&ActiveTransition> {
        self.active.as_ref()
    }

    pub fn current_info(&self) -> &'static ScaleInfo {
        self.registry.lookup(self.state.current)
    }

    /// Metadata for `level`, or for the current level when `None`.
    pub fn scale_info(&self, level: Option<ScaleLevel>) -> &'static ScaleInfo {
        self.registry.lookup(level.unwrap_or(self.state.current))
    }

    /// False while a transition is in flight, and also for the current level since
    /// requesting it is a no-op.
    pub fn can_transition_to(&self, level: ScaleLevel) -> bool {
        !self.state.is_transitioning() && level != self.state.current
    }

    pub fn subscribe<F>(&mut self, label: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: FnMut(&ScaleEvent, &ScaleState) -> Result<()> + Send + Sync + 'static,
    {
        self.channel.subscribe(label, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id)
    }

    pub fn events(&self) -> &ScaleEventChannel {
        &self.channel
    }

    pub fn transition_to(&mut self, target: ScaleLevel) -> NavigationOutcome {
        self.request(target, TransitionOrigin::Direct)
    }

    pub fn scale_up(&mut self) -> NavigationOutcome {
        match self.registry.adjacent(self.state.current).larger {
            Some(target) => self.request(target, TransitionOrigin::ScaleUp),
            None => NavigationOutcome::NoNeighbor,
        }
    }

    pub fn scale_down(&mut self) -> NavigationOutcome {
        match self.registry.adjacent(self.state.current).smaller {
            Some(target) => self.request(target, TransitionOrigin::ScaleDown),
            None => NavigationOutcome::NoNeighbor,
        }
    }

    pub fn jump_to_magnitude(&mut self, magnitude: i32) -> NavigationOutcome {
        match self.registry.by_magnitude(magnitude) {
            Some(target) => self.request(target, TransitionOrigin::Magnitude),
            None => {
                log::debug!(target: "scale::nav", "[nav] no scale with magnitude {magnitude}");
                NavigationOutcome::UnknownMagnitude
            }
        }
    }

    /// Jumps to the level whose magnitude is closest to `magnitude`.
    pub fn jump_to_nearest_magnitude(&mut self, magnitude: f64) -> NavigationOutcome {
        match self.registry.nearest_to_magnitude(magnitude) {
            Some(target) => self.request(target, TransitionOrigin::Magnitude),
            None => NavigationOutcome::UnknownMagnitude,
        }
    }

    /// Returns to the entry visited before the current one. The revisit is appended
    /// to history like any other commit.
    pub fn go_back(&mut self) -> NavigationOutcome {
        match self.state.previous() {
            Some(target) => self.request(target, TransitionOrigin::Back),
            None => NavigationOutcome::NoHistory,
        }
    }

    fn request(&mut self, target: ScaleLevel, origin: TransitionOrigin) -> NavigationOutcome {
        if target == self.state.current {
            return NavigationOutcome::AlreadyAtScale;
        }
        if self.state.is_transitioning() {
            log::trace!(target: "scale::nav", "[nav] ignoring {origin:?} to {target}: transition in flight");
            return NavigationOutcome::Busy;
        }
        let from = self.state.current;
        self.active = Some(ActiveTransition::new(
            from,
            target,
            origin,
            self.clock,
            self.settings.transition_duration,
            self.settings.easing,
        ));
        self.state.target = Some(target);
        self.state.progress = 0.0;
        log::debug!(target: "scale::nav", "[nav] {origin:?} {from} -> {target}");
        self.channel.publish(&ScaleEvent::start(from, target, self.clock), &self.state);
        NavigationOutcome::Started { from, to: target }
    }

    /// Advances the engine clock by one frame and drives any in-flight transition.
    /// Returns true when a transition committed during this call.
    pub fn advance(&mut self, dt: f32) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt as f64;
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let step = active.advance(dt);
        self.apply_step(step.progress, step.finished)
    }

    /// Drives the in-flight transition with the time elapsed since it started.
    /// A no-op while idle.
    pub fn tick(&mut self, elapsed: f32) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let step = active.tick(elapsed);
        self.clock = self.clock.max(active.started_at + active.elapsed() as f64);
        self.apply_step(step.progress, step.finished)
    }

    fn apply_step(&mut self, progress: f32, finished: bool) -> bool {
        let Some(active) = self.active.as_ref() else {
            return false;
        };
        let (from, to) = (active.from, active.to);
        self.state.progress = progress;
        self.channel.publish(&ScaleEvent::progress(from, to, progress, self.clock), &self.state);
        if !finished {
            return false;
        }
        self.commit(from, to);
        true
    }

    fn commit(&mut self, from: ScaleLevel, to: ScaleLevel) {
        self.active = None;
        self.state.current = to;
        self.state.target = None;
        self.state.progress = 1.0;
        self.state.push_history(to);
        log::info!(target: "scale::nav", "[nav] arrived at {to} (from {from})");
        self.channel.publish(&ScaleEvent::complete(from, to, self.clock), &self.state);
        self.state.progress = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ScaleEventKind;
    use std::sync::{Arc, Mutex};

    fn recorder(navigator: &mut ScaleNavigator) -> Arc<Mutex<Vec<ScaleEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        navigator.subscribe("recorder", move |event, _| {
            sink.lock().unwrap().push(*event);
            Ok(())
        });
        log
    }

    #[test]
    fn request_to_current_scale_leaves_state_untouched() {
        let mut navigator = ScaleNavigator::new(ScaleLevel::Human);
        let before = navigator.state().clone();
        assert_eq!(navigator.transition_to(ScaleLevel::Human), NavigationOutcome::AlreadyAtScale);
        assert_eq!(navigator.state(), &before);
        assert!(navigator.active_transition().is_none());
    }

    #[test]
    fn overlapping_request_is_ignored() {
        let mut navigator = ScaleNavigator::new(ScaleLevel::Human);
        assert!(navigator.transition_to(ScaleLevel::Galactic).started());
        navigator.advance(0.4);
        let progress = navigator.state().progress();
        assert_eq!(navigator.transition_to(ScaleLevel::Atomic), NavigationOutcome::Busy);
        assert_eq!(navigator.scale_down(), NavigationOutcome::Busy);
        assert_eq!(navigator.state().target(), Some(ScaleLevel::Galactic));
        assert_eq!(navigator.state().progress(), progress);
        assert!(!navigator.can_transition_to(ScaleLevel::Atomic));
    }

    #[test]
    fn complete_handler_sees_committed_state() {
        let mut navigator = ScaleNavigator::new(ScaleLevel::Human);
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        navigator.subscribe("complete-probe", move |event, state| {
            if event.kind == ScaleEventKind::Complete {
                *sink.lock().unwrap() = Some((state.current(), state.is_transitioning(), state.progress()));
            }
            Ok(())
        });
        navigator.scale_up();
        navigator.tick(DEFAULT_TRANSITION_SECS);
        assert_eq!(*observed.lock().unwrap(), Some((ScaleLevel::Planetary, false, 1.0)));
        assert_eq!(navigator.state().progress(), 0.0);
    }

    #[test]
    fn event_stream_is_ordered() {
        let mut navigator = ScaleNavigator::new(ScaleLevel::Cellular);
        let log = recorder(&mut navigator);
        navigator.scale_down();
        for _ in 0..90 {
            navigator.advance(1.0 / 60.0);
        }
        let events = log.lock().unwrap();
        assert_eq!(events.first().map(|e| e.kind), Some(ScaleEventKind::Start));
        assert_eq!(events.last().map(|e| e.kind), Some(ScaleEventKind::Complete));
        assert_eq!(events.iter().filter(|e| e.kind == ScaleEventKind::Complete).count(), 1);
        let progress: Vec<f32> =
            events.iter().filter(|e| e.kind == ScaleEventKind::Progress).filter_map(|e| e.progress).collect();
        assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]), "progress must not decrease");
        assert!(progress[0] > 0.0);
        assert_eq!(*progress.last().unwrap(), 1.0);
        assert!(events.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
    }

    #[test]
    fn tick_while_idle_is_inert() {
        let mut navigator = ScaleNavigator::new(ScaleLevel::Human);
        let log = recorder(&mut navigator);
        assert!(!navigator.tick(5.0));
        assert!(!navigator.advance(1.0));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(navigator.clock(), 1.0);
    }

    #[test]
    fn history_drops_oldest_past_capacity() {
        let settings = NavigatorSettings { max_history: 3, transition_duration: 0.0, ..Default::default() };
        let mut navigator = ScaleNavigator::with_settings(ScaleLevel::Subatomic, settings);
        for _ in 0..5 {
            assert!(navigator.scale_up().started());
            assert!(navigator.advance(0.0));
        }
        let history: Vec<_> = navigator.state().history().collect();
        assert_eq!(history, vec![ScaleLevel::Cellular, ScaleLevel::Human, ScaleLevel::Planetary]);
    }

    #[test]
    fn go_back_revisits_previous_entry() {
        let mut navigator = ScaleNavigator::new(ScaleLevel::Human);
        assert_eq!(navigator.go_back(), NavigationOutcome::NoHistory);
        navigator.transition_to(ScaleLevel::Stellar);
        navigator.tick(10.0);
        assert_eq!(
            navigator.go_back(),
            NavigationOutcome::Started { from: ScaleLevel::Stellar, to: ScaleLevel::Human }
        );
        navigator.tick(10.0);
        let history: Vec<_> = navigator.state().history().collect();
        assert_eq!(history, vec![ScaleLevel::Human, ScaleLevel::Stellar, ScaleLevel::Human]);
    }

    #[test]
    fn scale_info_defaults_to_current() {
        let navigator = ScaleNavigator::new(ScaleLevel::Galactic);
        assert_eq!(navigator.scale_info(None).magnitude, 21);
        assert_eq!(navigator.scale_info(Some(ScaleLevel::Atomic)).magnitude, -10);
        assert!(!navigator.can_transition_to(ScaleLevel::Galactic));
        assert!(navigator.can_transition_to(ScaleLevel::Atomic));
    }

    #[test]
    fn invalid_duration_settings_are_ignored() {
        let mut navigator = ScaleNavigator::new(ScaleLevel::Human);
        navigator.set_transition_duration(-1.0);
        navigator.set_transition_duration(f32::INFINITY);
        assert_eq!(navigator.settings().transition_duration, DEFAULT_TRANSITION_SECS);
        navigator.set_transition_duration(2.5);
        assert_eq!(navigator.settings().transition_duration, 2.5);
    }
}
