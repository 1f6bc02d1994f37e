use crate::quality::QualityTier;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GovernorSettings {
    pub target_fps: f32,
    /// Seconds of frames folded into one sample.
    pub report_interval: f32,
    /// Fraction of target below which a sample counts as slow.
    pub downgrade_ratio: f32,
    /// Fraction of target above which a sample counts as comfortable.
    pub upgrade_ratio: f32,
    /// Consecutive slow (or comfortable) samples required before acting.
    pub sustain_samples: u32,
    /// Minimum seconds between two adjustments.
    pub cooldown: f32,
    /// Memory use ratio below which there is headroom to step up.
    pub memory_headroom_ratio: f32,
    pub history_capacity: usize,
}

impl Default for GovernorSettings {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            report_interval: 1.0,
            downgrade_ratio: 0.8,
            upgrade_ratio: 1.2,
            sustain_samples: 3,
            cooldown: 5.0,
            memory_headroom_ratio: 0.8,
            history_capacity: 120,
        }
    }
}

impl GovernorSettings {
    /// Replaces non-finite or non-positive values with the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |value: f32, fallback: f32| if value.is_finite() && value > 0.0 { value } else { fallback };
        Self {
            target_fps: positive(self.target_fps, defaults.target_fps),
            report_interval: positive(self.report_interval, defaults.report_interval),
            downgrade_ratio: positive(self.downgrade_ratio, defaults.downgrade_ratio),
            upgrade_ratio: positive(self.upgrade_ratio, defaults.upgrade_ratio),
            sustain_samples: self.sustain_samples.max(1),
            cooldown: if self.cooldown.is_finite() { self.cooldown.max(0.0) } else { defaults.cooldown },
            memory_headroom_ratio: positive(self.memory_headroom_ratio, defaults.memory_headroom_ratio),
            history_capacity: self.history_capacity.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MemoryReading {
    pub used_bytes: u64,
    pub budget_bytes: u64,
}

impl MemoryReading {
    pub fn usage_ratio(&self) -> Option<f32> {
        if self.budget_bytes == 0 {
            return None;
        }
        Some(self.used_bytes as f32 / self.budget_bytes as f32)
    }
}

/// One reporting interval worth of measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSample {
    pub fps: f32,
    pub memory: Option<MemoryReading>,
}

impl PerformanceSample {
    pub fn fps(fps: f32) -> Self {
        Self { fps, memory: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityChange {
    pub from: QualityTier,
    pub to: QualityTier,
}

/// Steps the quality tier one notch at a time based on sustained frame rate.
///
/// The governor never stores the tier itself: callers pass the current value in and
/// write any returned change back to the shared quality slot.
#[derive(Debug, Clone)]
pub struct PerformanceGovernor {
    settings: GovernorSettings,
    clock: f64,
    last_adjustment: Option<f64>,
    slow_streak: u32,
    fast_streak: u32,
    frame_accum: f32,
    frame_count: u32,
    memory: Option<MemoryReading>,
    fps_history: VecDeque<f32>,
}

impl PerformanceGovernor {
    pub fn new(settings: GovernorSettings) -> Self {
        let settings = settings.sanitized();
        let history_capacity = settings.history_capacity;
        Self {
            settings,
            clock: 0.0,
            last_adjustment: None,
            slow_streak: 0,
            fast_streak: 0,
            frame_accum: 0.0,
            frame_count: 0,
            memory: None,
            fps_history: VecDeque::with_capacity(history_capacity.min(1_024)),
        }
    }

    pub fn settings(&self) -> &GovernorSettings {
        &self.settings
    }

    pub fn set_target_fps(&mut self, fps: f32) {
        if fps.is_finite() && fps > 0.0 {
            self.settings.target_fps = fps;
        }
    }

    pub fn report_memory(&mut self, used_bytes: u64, budget_bytes: u64) {
        self.memory = Some(MemoryReading { used_bytes, budget_bytes });
    }

    pub fn fps_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.fps_history.iter().copied()
    }

    pub fn average_fps(&self) -> Option<f32> {
        if self.fps_history.is_empty() {
            return None;
        }
        Some(self.fps_history.iter().sum::<f32>() / self.fps_history.len() as f32)
    }

    pub fn clear_history(&mut self) {
        self.fps_history.clear();
        self.slow_streak = 0;
        self.fast_streak = 0;
    }

    /// Feeds one rendered frame. Once a reporting interval has accumulated, a sample is
    /// built from the frames seen and evaluated against `current`.
    pub fn record_frame(&mut self, dt: f32, current: QualityTier, auto_adjust: bool) -> Option<QualityChange> {
        if !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        self.frame_accum += dt;
        self.frame_count += 1;
        if self.frame_accum < self.settings.report_interval {
            return None;
        }
        let fps = self.frame_count as f32 / self.frame_accum;
        let elapsed = self.frame_accum;
        self.frame_accum = 0.0;
        self.frame_count = 0;
        self.evaluate(PerformanceSample { fps, memory: self.memory }, elapsed, current, auto_adjust)
    }

    /// Records an externally measured sample spanning one reporting interval. A sample
    /// without a memory reading uses the last one passed to `report_memory`.
    pub fn record_sample(
        &mut self,
        sample: PerformanceSample,
        current: QualityTier,
        auto_adjust: bool,
    ) -> Option<QualityChange> {
        let sample = PerformanceSample { memory: sample.memory.or(self.memory), ..sample };
        let interval = self.settings.report_interval;
        self.evaluate(sample, interval, current, auto_adjust)
    }

    fn evaluate(
        &mut self,
        sample: PerformanceSample,
        elapsed: f32,
        current: QualityTier,
        auto_adjust: bool,
    ) -> Option<QualityChange> {
        self.clock += elapsed.max(0.0) as f64;
        if !sample.fps.is_finite() || sample.fps < 0.0 {
            return None;
        }
        if self.fps_history.len() == self.settings.history_capacity {
            self.fps_history.pop_front();
        }
        self.fps_history.push_back(sample.fps);

        let target = self.settings.target_fps;
        if sample.fps < target * self.settings.downgrade_ratio {
            self.slow_streak += 1;
            self.fast_streak = 0;
        } else if sample.fps > target * self.settings.upgrade_ratio && self.has_memory_headroom(sample.memory) {
            self.fast_streak += 1;
            self.slow_streak = 0;
        } else {
            self.slow_streak = 0;
            self.fast_streak = 0;
        }

        if !auto_adjust || self.cooling_down() {
            return None;
        }
        let sustain = self.settings.sustain_samples.max(1);
        let next = if self.slow_streak >= sustain {
            current.lower()
        } else if self.fast_streak >= sustain {
            current.higher()
        } else {
            None
        };
        let next = next?;
        self.last_adjustment = Some(self.clock);
        self.slow_streak = 0;
        self.fast_streak = 0;
        log::info!(
            target: "scale::governor",
            "[governor] quality {current} -> {next} (sample {:.1} fps, target {:.1})",
            sample.fps,
            target
        );
        Some(QualityChange { from: current, to: next })
    }

    fn cooling_down(&self) -> bool {
        match self.last_adjustment {
            Some(at) => self.clock - at < self.settings.cooldown as f64,
            None => false,
        }
    }

    fn has_memory_headroom(&self, memory: Option<MemoryReading>) -> bool {
        match memory.and_then(|reading| reading.usage_ratio()) {
            Some(ratio) => ratio < self.settings.memory_headroom_ratio,
            None => true,
        }
    }
}

impl Default for PerformanceGovernor {
    fn default() -> Self {
        Self::new(GovernorSettings::default())
    }
}
