use glam::Vec2;

use super::Frame;
use crate::desktop::monitors::MonitorManager;
use crate::desktop::platforms::PlatformSet;
use crate::desktop::Rect;
use crate::ecs::components::{Body, CatState};

/// Ground friction when not walking, pixels/second².
const FRICTION: f32 = 2000.0;

/// Integrate, land on window ledges and keep every cat on a monitor.
pub fn update(world: &mut hecs::World, frame: &Frame) {
    for (_, body) in world.query_mut::<&mut Body>() {
        step(body, frame.platforms, frame.monitors, frame.dt);
    }
}

/// One physics step for a single body.
pub fn step(body: &mut Body, platforms: &PlatformSet, monitors: &MonitorManager, dt: f32) {
    body.velocity += body.acceleration * dt;

    if body.state == CatState::Carried {
        body.velocity.y = 0.0;
        body.location += body.velocity * dt;
        return;
    }

    body.location += body.velocity * dt;
    let unresolved = body.location;

    window_collision(body, platforms);
    confine_to_monitors(body, monitors);

    // Anything the resolvers moved stops moving on that axis.
    let resolved = round_tenths(body.location);
    let unresolved = round_tenths(unresolved);
    if resolved.x != unresolved.x {
        body.velocity.x = 0.0;
    }
    if resolved.y != unresolved.y {
        body.velocity.y = 0.0;
    }

    if body.velocity.y == 0.0 && body.state != CatState::Walking {
        apply_friction(&mut body.velocity, FRICTION, dt);
    }
}

fn round_tenths(v: Vec2) -> Vec2 {
    (v * 10.0).round() / 10.0
}

/// Decelerate toward zero without overshooting, keeping each axis' sign.
fn apply_friction(velocity: &mut Vec2, friction: f32, dt: f32) {
    let magnitude = velocity.abs();
    let reduced = (magnitude - magnitude.normalize_or_zero() * friction * dt).max(Vec2::ZERO);
    *velocity = velocity.signum() * reduced;
}

/// Land on window ledges while falling.
///
/// A cat standing on a window follows that window's ledge as long as it still
/// overlaps it and the ledge has not dropped away beneath it. Otherwise the
/// cat lands on the highest ledge it crossed this step.
pub fn window_collision(body: &mut Body, platforms: &PlatformSet) {
    if body.velocity.y <= 0.0 {
        return;
    }
    let half = body.half_width();
    let x = body.location.x;

    if let Some(current) = body.current_window {
        let support = platforms.platforms_of(current).and_then(|ledges| {
            ledges
                .iter()
                .find(|p| p.overlaps(x, half) && body.location.y >= p.height)
        });
        if let Some(ledge) = support {
            body.location.y = ledge.height;
            return;
        }
        body.current_window = None;
    }

    let (old_y, y) = (body.old_location.y, body.location.y);
    let landing = platforms
        .platforms()
        .iter()
        .filter(|p| old_y <= p.height && y > p.height && p.overlaps(x, half))
        .min_by(|a, b| a.height.total_cmp(&b.height));

    if let Some(ledge) = landing {
        body.location.y = ledge.height;
        body.velocity.y = 0.0;
        body.current_window = Some(ledge.window);
    }
}

/// How much of the body's edges the monitors' work areas cover, split into
/// the four corners of the body.
#[derive(Debug, Default)]
struct Coverage {
    top_left: Vec2,
    top_right: Vec2,
    bottom_left: Vec2,
    bottom_right: Vec2,
}

impl Coverage {
    fn measure(bounds: &Rect, intersections: &[Rect]) -> Self {
        let mut c = Coverage::default();
        let full = Vec2::new(bounds.width() as f32, bounds.height() as f32);

        for part in intersections {
            let size = Vec2::new(part.width() as f32, part.height() as f32);
            let left = part.left == bounds.left;
            let right = part.right == bounds.right;
            let top = part.top == bounds.top;
            let bottom = part.bottom == bounds.bottom;

            if left && right {
                // A horizontal band across the whole body.
                let band = Vec2::new(size.x, size.y);
                let rest = Vec2::new(full.x - size.x, size.y);
                if top {
                    c.top_left = band;
                    c.top_right = rest;
                } else {
                    c.bottom_left = band;
                    c.bottom_right = rest;
                }
            } else if top && bottom {
                // A vertical band down the whole body.
                let band = Vec2::new(size.x, size.y);
                let rest = Vec2::new(size.x, full.y - size.y);
                if left {
                    c.top_left = band;
                    c.bottom_left = rest;
                } else {
                    c.top_right = band;
                    c.bottom_right = rest;
                }
            } else {
                match (left, right, top, bottom) {
                    (true, _, true, _) => c.top_left = size,
                    (true, _, _, true) => c.bottom_left = size,
                    _ => {}
                }
                match (left, right, top, bottom) {
                    (_, true, true, _) => c.top_right = size,
                    (_, true, _, true) => c.bottom_right = size,
                    _ => {}
                }
            }
        }
        c
    }

    fn combined(&self) -> Vec2 {
        Vec2::new(
            (self.top_left.x + self.top_right.x).min(self.bottom_left.x + self.bottom_right.x),
            (self.top_left.y + self.bottom_left.y).min(self.top_right.y + self.bottom_right.y),
        )
    }

    fn covers(&self, bounds: &Rect) -> bool {
        self.combined() == Vec2::new(bounds.width() as f32, bounds.height() as f32)
    }
}

fn work_intersections(bounds: &Rect, monitors: &MonitorManager) -> Vec<Rect> {
    monitors
        .infos()
        .filter_map(|info| info.work.intersect(bounds))
        .collect()
}

/// Pull the body back onto the nearest monitor work area.
///
/// Clears `current_window` whenever a correction is applied.
pub fn confine_to_monitors(body: &mut Body, monitors: &MonitorManager) {
    let feet = monitors.local_to_desktop(body.location);
    let bounds = body.bounds_at(feet);
    // Feet positions that keep the whole body inside a work area.
    let min_offset = Vec2::new(body.half_width(), body.height());
    let max_offset = Vec2::new(-body.half_width(), 0.0);

    let mut best: Option<(f32, Vec2)> = None;
    let consider = |candidate: Vec2, best: &mut Option<(f32, Vec2)>| {
        let distance = (candidate - feet).length();
        if best.map_or(true, |(d, _)| distance < d) {
            *best = Some((distance, candidate));
        }
    };

    for info in monitors.infos() {
        let lo = info.work.top_left().as_vec2() + min_offset;
        let hi = info.work.bottom_right().as_vec2() + max_offset;
        consider(feet.max(lo).min(hi), &mut best);
        if best.is_some_and(|(d, _)| d == 0.0) {
            return;
        }
    }
    if best.is_none() {
        return;
    }

    let coverage = Coverage::measure(&bounds, &work_intersections(&bounds, monitors));
    if coverage.covers(&bounds) {
        return;
    }

    let size = Vec2::new(bounds.width() as f32, bounds.height() as f32);
    let c = &coverage;
    if c.top_left.y == c.top_right.y && c.top_right.y != 0.0 {
        consider(Vec2::new(feet.x, (feet.y - (size.y - c.top_left.y)).ceil()), &mut best);
    }
    if c.bottom_left.y == c.bottom_right.y && c.bottom_right.y != 0.0 {
        consider(Vec2::new(feet.x, (feet.y + (size.y - c.bottom_left.y)).floor()), &mut best);
    }
    if c.bottom_left.x == c.top_left.x && c.top_left.x != 0.0 {
        consider(Vec2::new((feet.x - (size.x - c.bottom_left.x)).ceil(), feet.y), &mut best);
    }
    if c.bottom_right.x == c.top_right.x && c.top_right.x != 0.0 {
        consider(Vec2::new((feet.x + (size.x - c.bottom_right.x)).floor(), feet.y), &mut best);
    }

    if let Some((_, confined)) = best {
        body.location = monitors.desktop_to_local(confined);
        body.current_window = None;
    }
}

/// Whether a body with its feet at `location` (overlay-local) would sit
/// entirely on monitor work areas.
pub fn is_location_valid(body: &Body, location: Vec2, monitors: &MonitorManager) -> bool {
    let bounds = body.bounds_at(monitors.local_to_desktop(location));
    let intersections = work_intersections(&bounds, monitors);

    if intersections.iter().any(|r| *r == bounds) {
        return true;
    }
    if intersections.is_empty() {
        return false;
    }
    Coverage::measure(&bounds, &intersections).covers(&bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::monitors::MonitorSelection;
    use crate::desktop::{MonitorId, RawMonitor, StaticDesktop, WindowId, WindowInfo};
    use crate::input::MouseInput;
    use glam::IVec2;

    const DT: f32 = 1.0 / 60.0;

    fn monitors(raw: Vec<RawMonitor>) -> MonitorManager {
        let mut desktop = StaticDesktop {
            windows: Vec::new(),
            monitors: raw,
        };
        let mut mm = MonitorManager::new(MonitorSelection::Auto);
        mm.update(&mut desktop, &mut MouseInput::new());
        mm
    }

    /// 1920x1080 with a 40px taskbar, plus a taskbar-less twin to the right.
    fn dual() -> MonitorManager {
        monitors(vec![
            RawMonitor {
                id: MonitorId(1),
                full: Rect::new(0, 0, 1920, 1080),
                work: Rect::new(0, 0, 1920, 1040),
            },
            RawMonitor {
                id: MonitorId(2),
                full: Rect::new(1920, 0, 3840, 1080),
                work: Rect::new(1920, 0, 3840, 1080),
            },
        ])
    }

    fn cat_at(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), 2.0, 35.0, 400.0)
    }

    fn window(id: isize, rect: Rect) -> WindowInfo {
        WindowInfo {
            id: WindowId(id),
            rect,
            title: format!("window {id}"),
        }
    }

    #[test]
    fn falling_cat_lands_on_the_ledge_it_crosses() {
        let mm = dual();
        let set = PlatformSet::build(&[window(7, Rect::new(100, 500, 600, 900))], IVec2::ZERO);
        let mut body = cat_at(300.0, 490.0);
        body.velocity.y = 1200.0;

        for _ in 0..10 {
            body.old_location = body.location;
            step(&mut body, &set, &mm, DT);
        }

        assert_eq!(body.location.y, 500.0);
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(body.current_window, Some(WindowId(7)));
    }

    #[test]
    fn highest_crossed_ledge_wins() {
        let set = PlatformSet::build(
            &[
                window(1, Rect::new(100, 520, 600, 900)),
                window(2, Rect::new(700, 505, 900, 900)),
                window(3, Rect::new(100, 510, 250, 515)),
            ],
            IVec2::ZERO,
        );
        let mut body = cat_at(200.0, 500.0);
        body.old_location = body.location;
        body.location.y = 530.0;
        body.velocity.y = 100.0;

        window_collision(&mut body, &set);
        assert_eq!(body.location.y, 510.0);
        assert_eq!(body.current_window, Some(WindowId(3)));
    }

    #[test]
    fn standing_cat_rides_a_rising_window_and_drops_off_a_sinking_one() {
        let mm = dual();
        let mut body = cat_at(300.0, 500.0);
        body.current_window = Some(WindowId(7));

        let raised = PlatformSet::build(&[window(7, Rect::new(100, 480, 600, 900))], IVec2::ZERO);
        body.old_location = body.location;
        step(&mut body, &raised, &mm, DT);
        assert_eq!(body.location.y, 480.0);
        assert_eq!(body.current_window, Some(WindowId(7)));

        let lowered = PlatformSet::build(&[window(7, Rect::new(100, 600, 600, 900))], IVec2::ZERO);
        body.old_location = body.location;
        step(&mut body, &lowered, &mm, DT);
        assert_eq!(body.current_window, None);
        assert!(body.location.y > 480.0);
    }

    #[test]
    fn cat_below_the_taskbar_is_pushed_onto_the_work_area() {
        let mm = dual();
        let set = PlatformSet::default();
        let mut body = cat_at(100.0, 1050.0);
        body.current_window = Some(WindowId(3));
        body.velocity = Vec2::new(0.0, 100.0);

        body.old_location = body.location;
        step(&mut body, &set, &mm, DT);
        assert_eq!(body.location, Vec2::new(100.0, 1040.0));
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(body.current_window, None);

        // Confining an already confined cat changes nothing.
        let settled = body.location;
        confine_to_monitors(&mut body, &mm);
        assert_eq!(body.location, settled);
    }

    #[test]
    fn cat_entirely_off_screen_snaps_to_nearest_monitor() {
        let mm = dual();
        let mut body = cat_at(-200.0, 300.0);
        confine_to_monitors(&mut body, &mm);
        assert_eq!(body.location, Vec2::new(20.0, 300.0));
    }

    #[test]
    fn cat_straddling_two_monitors_is_left_alone() {
        let mm = dual();
        let mut body = cat_at(1920.0, 1040.0);
        confine_to_monitors(&mut body, &mm);
        assert_eq!(body.location, Vec2::new(1920.0, 1040.0));
        assert!(is_location_valid(&body, body.location, &mm));
    }

    #[test]
    fn cat_hanging_into_the_taskbar_gap_slides_onto_the_other_monitor() {
        let mm = dual();
        let mut body = cat_at(1920.0, 1060.0);
        assert!(!is_location_valid(&body, body.location, &mm));

        confine_to_monitors(&mut body, &mm);
        assert_eq!(body.location, Vec2::new(1940.0, 1060.0));
        assert!(is_location_valid(&body, body.location, &mm));
    }

    #[test]
    fn location_validity() {
        let mm = dual();
        let body = cat_at(0.0, 0.0);
        assert!(is_location_valid(&body, Vec2::new(500.0, 500.0), &mm));
        assert!(!is_location_valid(&body, Vec2::new(-500.0, 500.0), &mm));
        assert!(!is_location_valid(&body, Vec2::new(5.0, 500.0), &mm));
        assert!(!is_location_valid(&body, Vec2::new(500.0, 10.0), &mm));
    }

    #[test]
    fn friction_stops_without_reversing() {
        let mut v = Vec2::new(-50.0, 0.0);
        apply_friction(&mut v, FRICTION, DT);
        assert!(v.x > -50.0 && v.x < 0.0);
        apply_friction(&mut v, FRICTION, DT);
        assert_eq!(v, Vec2::ZERO);

        let mut still = Vec2::ZERO;
        apply_friction(&mut still, FRICTION, DT);
        assert_eq!(still, Vec2::ZERO);
    }

    #[test]
    fn carried_cat_ignores_gravity() {
        let mm = dual();
        let mut body = cat_at(300.0, 300.0);
        body.state = CatState::Carried;
        step(&mut body, &PlatformSet::default(), &mm, DT);
        assert_eq!(body.location, Vec2::new(300.0, 300.0));
        assert_eq!(body.velocity.y, 0.0);
    }
}
