//! OS layer: desktop enumeration, global input polling and overlay styling.
//!
//! The overlay is click-through almost all the time, so keyboard and mouse
//! state is polled globally instead of read from window events. Builds
//! without Win32 fall back to winit's monitor list and whatever the overlay
//! window itself receives.

#[cfg(windows)]
pub mod win32;

use glam::Vec2;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::desktop::{MonitorSource, WindowSource};

/// Keys the app reacts to, level-triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keys {
    pub escape: bool,
    pub f3: bool,
    pub duplicate: bool,
    pub delete: bool,
    pub save: bool,
}

/// One frame's worth of global input, cursor in desktop coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub cursor: Vec2,
    pub left: bool,
    pub right: bool,
    pub keys: Keys,
}

/// Poll the cursor, mouse buttons and hotkeys.
///
/// `from_events` is what the overlay's own window events reported this frame;
/// it is used as-is where global polling is unavailable.
#[cfg(windows)]
pub fn poll_input(_from_events: &InputSnapshot) -> InputSnapshot {
    win32::poll_input()
}

#[cfg(not(windows))]
pub fn poll_input(from_events: &InputSnapshot) -> InputSnapshot {
    *from_events
}

#[cfg(windows)]
pub fn monitor_source(_event_loop: &ActiveEventLoop) -> Box<dyn MonitorSource> {
    Box::new(win32::Win32Monitors)
}

#[cfg(not(windows))]
pub fn monitor_source(event_loop: &ActiveEventLoop) -> Box<dyn MonitorSource> {
    Box::new(fallback::desktop(event_loop))
}

/// Window enumerator that skips the overlay itself.
#[cfg(windows)]
pub fn window_source(window: &Window, overlay_title: &str) -> Box<dyn WindowSource> {
    let own = win32::get_hwnd(window).map_or(0, |hwnd| hwnd.0 as isize);
    Box::new(win32::Win32Windows::new(own, overlay_title))
}

#[cfg(not(windows))]
pub fn window_source(_window: &Window, _overlay_title: &str) -> Box<dyn WindowSource> {
    log::warn!("No window enumeration on this platform, cats only see the floor");
    Box::new(crate::desktop::StaticDesktop::default())
}

/// Turn a freshly created winit window into a click-through overlay.
pub fn setup_overlay(window: &Window) {
    if let Err(e) = window.set_cursor_hittest(false) {
        log::warn!("Overlay cannot be made click-through: {e}");
    }

    #[cfg(windows)]
    match win32::get_hwnd(window) {
        Some(hwnd) => unsafe { win32::make_overlay(hwnd) },
        None => log::warn!("No Win32 handle for the overlay, taskbar entry stays"),
    }

    log::info!("Overlay setup complete");
}

#[cfg(not(windows))]
mod fallback {
    use winit::event_loop::ActiveEventLoop;

    use crate::desktop::{MonitorId, RawMonitor, Rect, StaticDesktop};

    const FALLBACK_SIZE: (i32, i32) = (1920, 1080);

    /// Monitors as winit reports them. No work-area information is available,
    /// so the work area is the full monitor.
    pub fn desktop(event_loop: &ActiveEventLoop) -> StaticDesktop {
        let monitors: Vec<RawMonitor> = event_loop
            .available_monitors()
            .enumerate()
            .map(|(i, handle)| {
                let pos = handle.position();
                let size = handle.size();
                let full = Rect::new(
                    pos.x,
                    pos.y,
                    pos.x + size.width as i32,
                    pos.y + size.height as i32,
                );
                RawMonitor {
                    id: MonitorId(i as isize + 1),
                    full,
                    work: full,
                }
            })
            .collect();

        if monitors.is_empty() {
            log::warn!("winit reported no monitors, assuming one {}x{}", FALLBACK_SIZE.0, FALLBACK_SIZE.1);
            return StaticDesktop::single_monitor(FALLBACK_SIZE.0, FALLBACK_SIZE.1);
        }

        StaticDesktop {
            windows: Vec::new(),
            monitors,
        }
    }
}
