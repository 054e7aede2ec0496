use instant::Instant;

/// Which phase of the frame is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SystemPhase {
    Windows = 0,
    Monitors = 1,
    Palette = 2,
    Mouse = 3,
    Actions = 4,
    Physics = 5,
    Icons = 6,
    Animation = 7,
}

impl SystemPhase {
    pub const ALL: [SystemPhase; 8] = [
        Self::Windows,
        Self::Monitors,
        Self::Palette,
        Self::Mouse,
        Self::Actions,
        Self::Physics,
        Self::Icons,
        Self::Animation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Monitors => "Monitors",
            Self::Palette => "Palette",
            Self::Mouse => "Mouse",
            Self::Actions => "Actions",
            Self::Physics => "Physics",
            Self::Icons => "Icons",
            Self::Animation => "Animation",
        }
    }
}

/// Per-phase timing with exponential moving average smoothing.
pub struct SystemTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; 8],
    /// Timestamp when `begin()` was called.
    start: Instant,
}

const EMA_ALPHA: f64 = 0.1;

impl SystemTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; 8],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes. Records elapsed time for `phase`.
    pub fn end(&mut self, phase: SystemPhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    fn record(&mut self, phase: SystemPhase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    pub fn get(&self, phase: SystemPhase) -> f64 {
        self.durations_us[phase as usize]
    }

    /// Sum of all phase durations (microseconds).
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }
}

impl Default for SystemTimers {
    fn default() -> Self {
        Self::new()
    }
}
