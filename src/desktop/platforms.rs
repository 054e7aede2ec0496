use std::collections::HashMap;

use glam::IVec2;

use super::{Rect, WindowId, WindowInfo};

/// A walkable ledge along the visible part of a window's top edge,
/// in overlay-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub left: f32,
    pub right: f32,
    pub height: f32,
    pub window: WindowId,
}

impl Platform {
    /// Whether a body spanning `[x - half_width, x + half_width]` overlaps this ledge.
    pub fn overlaps(&self, x: f32, half_width: f32) -> bool {
        x + half_width > self.left && x - half_width < self.right
    }
}

/// Horizontal span in desktop pixels, before conversion to local space.
#[derive(Debug, Clone, Copy)]
struct Span {
    left: i32,
    right: i32,
    height: i32,
}

/// Platforms and window bounds for one frame.
#[derive(Debug, Clone, Default)]
pub struct PlatformSet {
    platforms: Vec<Platform>,
    by_window: HashMap<WindowId, Vec<Platform>>,
    bounds: HashMap<WindowId, Rect>,
    origin: IVec2,
}

impl PlatformSet {
    /// Derive platforms from windows listed front-most first.
    ///
    /// Each window's top edge is carved by every window listed before it, so
    /// foreground windows cut ledges out of the windows beneath them.
    /// `origin` is the desktop position of the overlay's top-left corner.
    pub fn build(windows: &[WindowInfo], origin: IVec2) -> Self {
        let mut set = PlatformSet {
            platforms: Vec::with_capacity(windows.len()),
            by_window: HashMap::with_capacity(windows.len()),
            bounds: HashMap::with_capacity(windows.len()),
            origin,
        };
        let mut occluders: Vec<Rect> = Vec::with_capacity(windows.len());
        let mut spans = Vec::new();

        for window in windows {
            let r = window.rect;
            spans.clear();
            carve(
                Span {
                    left: r.left,
                    right: r.right,
                    height: r.top,
                },
                &occluders,
                &mut spans,
            );

            for span in &spans {
                let platform = Platform {
                    left: (span.left - origin.x) as f32,
                    right: (span.right - origin.x) as f32,
                    height: (span.height - origin.y) as f32,
                    window: window.id,
                };
                set.platforms.push(platform);
                set.by_window.entry(window.id).or_default().push(platform);
            }

            set.bounds.insert(window.id, r);
            occluders.push(r);
        }

        set
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Platforms derived from `window`, `None` if it has no visible ledge
    /// or is gone.
    pub fn platforms_of(&self, window: WindowId) -> Option<&[Platform]> {
        self.by_window.get(&window).map(Vec::as_slice)
    }

    pub fn bounds_desktop(&self, window: WindowId) -> Option<Rect> {
        self.bounds.get(&window).copied()
    }

    pub fn bounds_local(&self, window: WindowId) -> Option<Rect> {
        self.bounds_desktop(window).map(|r| r.translate(-self.origin))
    }

    pub fn contains_window(&self, window: WindowId) -> bool {
        self.bounds.contains_key(&window)
    }

    pub fn window_count(&self) -> usize {
        self.bounds.len()
    }
}

/// Subtract every occluder straddling the span's height from the span.
///
/// After a split, each half is only tested against the occluders that come
/// after the splitting one.
fn carve(mut span: Span, occluders: &[Rect], out: &mut Vec<Span>) {
    for (i, b) in occluders.iter().enumerate() {
        if !(b.top < span.height && b.bottom > span.height) {
            continue;
        }
        if b.right <= span.left || b.left >= span.right {
            continue;
        }

        if b.left <= span.left && b.right >= span.right {
            return;
        }

        if b.left > span.left && b.right < span.right {
            let rest = &occluders[i + 1..];
            carve(Span { right: b.left, ..span }, rest, out);
            carve(Span { left: b.right, ..span }, rest, out);
            return;
        }

        if b.left <= span.left {
            span.left = b.right;
        } else {
            span.right = b.left;
        }
    }

    if span.right > span.left {
        out.push(span);
    }
}
