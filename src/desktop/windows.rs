use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use glam::IVec2;

use super::platforms::{Platform, PlatformSet};
use super::{Rect, WindowId, WindowInfo, WindowSource};

/// Cadence of the background enumerator.
const ENUMERATION_INTERVAL: Duration = Duration::from_micros(16_667);

/// Where fresh window lists come from.
pub enum WindowFeed {
    /// Enumerate on the calling thread every update.
    Inline(Box<dyn WindowSource>),
    /// A helper thread enumerates at ~60 Hz and hands over whole lists. At
    /// most one list waits in the channel; newer lists are dropped until the
    /// main thread takes it.
    Background {
        rx: Receiver<Vec<WindowInfo>>,
        stop: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
    },
}

impl WindowFeed {
    pub fn inline(source: impl WindowSource + 'static) -> Self {
        Self::Inline(Box::new(source))
    }

    /// Move `source` onto a helper thread.
    pub fn background(mut source: impl WindowSource + 'static) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::sync_channel(1);
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();

        let handle = thread::Builder::new()
            .name("window-enumerator".into())
            .spawn(move || {
                while !thread_stop.load(Ordering::Relaxed) {
                    match tx.try_send(source.enumerate()) {
                        Ok(()) | Err(TrySendError::Full(_)) => {}
                        Err(TrySendError::Disconnected(_)) => break,
                    }
                    thread::sleep(ENUMERATION_INTERVAL);
                }
                log::debug!("Window enumerator stopped");
            })?;

        Ok(Self::Background {
            rx,
            stop,
            handle: Some(handle),
        })
    }

    /// Newest window list, if one arrived since the last poll.
    fn poll(&mut self) -> Option<Vec<WindowInfo>> {
        match self {
            Self::Inline(source) => Some(source.enumerate()),
            Self::Background { rx, .. } => rx.try_iter().last(),
        }
    }
}

impl Drop for WindowFeed {
    fn drop(&mut self) {
        if let Self::Background { stop, handle, .. } = self {
            stop.store(true, Ordering::Relaxed);
            if let Some(handle) = handle.take() {
                if handle.join().is_err() {
                    log::warn!("Window enumerator thread panicked");
                }
            }
        }
    }
}

/// Owns the window feed and the per-frame platform snapshot.
pub struct WindowsManager {
    feed: WindowFeed,
    windows: Vec<WindowInfo>,
    snapshot: PlatformSet,
}

impl WindowsManager {
    pub fn new(feed: WindowFeed) -> Self {
        Self {
            feed,
            windows: Vec::new(),
            snapshot: PlatformSet::default(),
        }
    }

    /// Pull the newest window list and rebuild platforms for this frame.
    ///
    /// With a background feed and nothing new, the previous list is reused
    /// but platforms are still rebuilt against the current `origin`.
    pub fn update(&mut self, origin: IVec2) {
        if let Some(windows) = self.feed.poll() {
            self.windows = windows;
        }
        self.snapshot = PlatformSet::build(&self.windows, origin);
    }

    /// Read-only snapshot for the rest of the frame.
    pub fn snapshot(&self) -> &PlatformSet {
        &self.snapshot
    }

    pub fn platforms(&self) -> &[Platform] {
        self.snapshot.platforms()
    }

    pub fn platforms_of(&self, window: WindowId) -> Option<&[Platform]> {
        let found = self.snapshot.platforms_of(window);
        if found.is_none() {
            log::debug!("No platforms for window {:?}", window);
        }
        found
    }

    pub fn window_bounds(&self, window: WindowId) -> Option<Rect> {
        self.snapshot.bounds_desktop(window)
    }

    pub fn window_bounds_local(&self, window: WindowId) -> Option<Rect> {
        self.snapshot.bounds_local(window)
    }

    pub fn window_title(&self, window: WindowId) -> Option<&str> {
        self.windows
            .iter()
            .find(|w| w.id == window)
            .map(|w| w.title.as_str())
    }

    pub fn windows(&self) -> &[WindowInfo] {
        &self.windows
    }
}
