use crate::easing::Easing;
use crate::scale::ScaleLevel;

/// Why a transition was requested. Only affects logging and UI labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOrigin {
    Direct,
    ScaleUp,
    ScaleDown,
    Magnitude,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionStep {
    pub progress: f32,
    pub finished: bool,
}

/// An in-flight move from one level to another, driven by elapsed time since its start.
#[derive(Debug, Clone)]
pub struct ActiveTransition {
    pub from: ScaleLevel,
    pub to: ScaleLevel,
    pub origin: TransitionOrigin,
    /// Engine clock reading when the transition was armed.
    pub started_at: f64,
    duration: f32,
    easing: Easing,
    elapsed: f32,
    progress: f32,
}

impl ActiveTransition {
    pub fn new(
        from: ScaleLevel,
        to: ScaleLevel,
        origin: TransitionOrigin,
        started_at: f64,
        duration: f32,
        easing: Easing,
    ) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Self { from, to, origin, started_at, duration, easing, elapsed: 0.0, progress: 0.0 }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn raw_progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }

    /// Sets the elapsed time since start and recomputes eased progress.
    ///
    /// Elapsed time never moves backwards, so progress is non-decreasing even if
    /// the host feeds a stale reading.
    pub fn tick(&mut self, elapsed: f32) -> TransitionStep {
        let elapsed = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };
        self.elapsed = self.elapsed.max(elapsed);
        let raw = self.raw_progress();
        let finished = raw >= 1.0;
        self.progress = if finished { 1.0 } else { self.progress.max(self.easing.apply(raw)) };
        TransitionStep { progress: self.progress, finished }
    }

    pub fn advance(&mut self, dt: f32) -> TransitionStep {
        let dt = if dt.is_nan() { 0.0 } else { dt.max(0.0) };
        self.tick(self.elapsed + dt)
    }
}
