//! Live desktop state: window rectangles, derived platforms, monitors.
//!
//! Everything in here is rebuilt wholesale each frame from OS polls and
//! treated as read-only by the cats for the rest of that frame.

pub mod monitors;
pub mod platforms;
pub mod windows;

use glam::{IVec2, Vec2};

/// Opaque top-level window handle (the raw HWND value on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub isize);

/// Opaque monitor handle (the raw HMONITOR value on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorId(pub isize);

/// Integer pixel rectangle, right/bottom exclusive like a Win32 `RECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn top_left(&self) -> IVec2 {
        IVec2::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> IVec2 {
        IVec2::new(self.right, self.bottom)
    }

    /// Overlapping area of two rectangles, `None` when they only touch or miss.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        (!r.is_empty()).then_some(r)
    }

    /// Smallest rectangle covering both. An empty side is ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left as f32
            && p.x < self.right as f32
            && p.y >= self.top as f32
            && p.y < self.bottom as f32
    }

    pub fn translate(&self, by: IVec2) -> Rect {
        Rect {
            left: self.left + by.x,
            top: self.top + by.y,
            right: self.right + by.x,
            bottom: self.bottom + by.y,
        }
    }
}

/// One enumerated top-level window, in desktop coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub rect: Rect,
    pub title: String,
}

/// One enumerated display, in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMonitor {
    pub id: MonitorId,
    pub full: Rect,
    pub work: Rect,
}

/// Produces the current top-level windows, front-most first.
pub trait WindowSource: Send {
    fn enumerate(&mut self) -> Vec<WindowInfo>;
}

/// Produces the currently attached displays in OS enumeration order.
pub trait MonitorSource {
    fn enumerate(&mut self) -> Vec<RawMonitor>;
}

impl<T: WindowSource + ?Sized> WindowSource for Box<T> {
    fn enumerate(&mut self) -> Vec<WindowInfo> {
        (**self).enumerate()
    }
}

impl<T: MonitorSource + ?Sized> MonitorSource for Box<T> {
    fn enumerate(&mut self) -> Vec<RawMonitor> {
        (**self).enumerate()
    }
}

/// Fixed desktop used where no OS enumeration exists (non-Windows builds, tests).
#[derive(Debug, Clone, Default)]
pub struct StaticDesktop {
    pub windows: Vec<WindowInfo>,
    pub monitors: Vec<RawMonitor>,
}

impl StaticDesktop {
    /// A single monitor of the given size with no taskbar and no windows.
    pub fn single_monitor(width: i32, height: i32) -> Self {
        let full = Rect::new(0, 0, width, height);
        Self {
            windows: Vec::new(),
            monitors: vec![RawMonitor {
                id: MonitorId(1),
                full,
                work: full,
            }],
        }
    }
}

impl WindowSource for StaticDesktop {
    fn enumerate(&mut self) -> Vec<WindowInfo> {
        self.windows.clone()
    }
}

impl MonitorSource for StaticDesktop {
    fn enumerate(&mut self) -> Vec<RawMonitor> {
        self.monitors.clone()
    }
}
