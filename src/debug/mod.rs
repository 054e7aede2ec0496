pub mod timer;

use std::collections::VecDeque;

use self::timer::{SystemPhase, SystemTimers};

use crate::desktop::platforms::PlatformSet;

/// Number of frame times to keep for the rolling stats.
const FRAME_HISTORY_LEN: usize = 300;
/// Seconds between periodic reports.
const REPORT_INTERVAL: f64 = 5.0;

/// Log-based debug overlay, toggled with F3 when enabled in settings.
///
/// Frame stats are always collected and logged every few seconds. While
/// visible, the per-phase timings and the current platform list join them.
pub struct DebugOverlay {
    /// Whether F3 may toggle the overlay at all.
    pub enabled: bool,
    pub visible: bool,
    f3_was_down: bool,

    /// Rolling window of frame times (seconds).
    pub frame_times: VecDeque<f64>,
    pub fps: f64,
    pub frame_time_avg: f64,
    pub frame_time_min: f64,
    pub frame_time_max: f64,

    /// Per-phase timers, written by the app and `systems::tick`.
    pub system_timers: SystemTimers,

    frame_count: u64,
    log_timer: f64,
}

impl DebugOverlay {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            visible: false,
            f3_was_down: false,
            frame_times: VecDeque::with_capacity(FRAME_HISTORY_LEN),
            fps: 0.0,
            frame_time_avg: 0.0,
            frame_time_min: 0.0,
            frame_time_max: 0.0,
            system_timers: SystemTimers::new(),
            frame_count: 0,
            log_timer: 0.0,
        }
    }

    /// Record a frame time and update rolling stats. Returns true when a
    /// periodic report is due.
    pub fn record_frame(&mut self, dt: f64) -> bool {
        self.frame_count += 1;
        if self.frame_times.len() == FRAME_HISTORY_LEN {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(dt);

        let len = self.frame_times.len();
        if len > 0 {
            let mut sum = 0.0;
            let mut min = f64::MAX;
            let mut max = 0.0f64;
            for &t in self.frame_times.iter() {
                sum += t;
                min = min.min(t);
                max = max.max(t);
            }
            self.frame_time_avg = sum / len as f64;
            self.frame_time_min = min;
            self.frame_time_max = max;
            self.fps = if self.frame_time_avg > 0.0 {
                1.0 / self.frame_time_avg
            } else {
                0.0
            };
        }

        self.log_timer += dt;
        if self.log_timer >= REPORT_INTERVAL {
            self.log_timer = 0.0;
            true
        } else {
            false
        }
    }

    /// Handle the F3 toggle. Returns true if visibility changed.
    pub fn poll_toggle(&mut self, f3_down: bool) -> bool {
        // Edge-detect: trigger on press, not hold.
        let pressed = f3_down && !self.f3_was_down;
        self.f3_was_down = f3_down;
        if pressed && self.enabled {
            self.visible = !self.visible;
            log::info!("Debug overlay {}", if self.visible { "shown" } else { "hidden" });
            return true;
        }
        false
    }

    /// Log frame stats, plus phase timings and platforms while visible.
    pub fn report(&self, platforms: &PlatformSet, cat_count: usize) {
        log::info!(
            "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {} | cats: {}",
            self.fps,
            self.frame_time_avg * 1000.0,
            self.frame_time_min * 1000.0,
            self.frame_time_max * 1000.0,
            self.frame_count,
            cat_count,
        );

        if !self.visible {
            return;
        }

        let timings: Vec<String> = SystemPhase::ALL
            .iter()
            .map(|&p| format!("{} {:.1}us", p.label(), self.system_timers.get(p)))
            .collect();
        log::info!(
            "Timings: {} | total {:.1}us",
            timings.join(", "),
            self.system_timers.total_us()
        );

        log::info!(
            "Platforms: {} across {} windows",
            platforms.platforms().len(),
            platforms.window_count()
        );
        for p in platforms.platforms() {
            log::debug!(
                "  {:?}: x {}..{} at y {}",
                p.window,
                p.left,
                p.right,
                p.height
            );
        }
    }
}
