use crate::desktop::WindowId;
use crate::ecs::components::CatState;

use super::ActionCx;

/// How close, in pixels, counts as having arrived.
const ARRIVAL_TOLERANCE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Direction from `from` toward `to`, right when they are equal.
    pub fn toward(from: f32, to: f32) -> Self {
        if to >= from {
            Self::Right
        } else {
            Self::Left
        }
    }

    pub fn random(rng: &mut fastrand::Rng) -> Self {
        if rng.bool() {
            Self::Right
        } else {
            Self::Left
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    pub fn walking_clip(self) -> &'static str {
        match self {
            Self::Left => "Walking Left",
            Self::Right => "Walking Right",
        }
    }
}

fn start_walking(cx: &mut ActionCx<'_>, direction: Direction) {
    cx.body.velocity.x = direction.sign() * cx.body.walk_speed;
    cx.body.set_animation(direction.walking_clip());
    cx.body.state = CatState::Walking;
}

/// Walk one way for a fixed time. Bumping into something ends the walk and
/// whatever was planned after it.
#[derive(Debug, Clone)]
pub struct WalkTimed {
    direction: Direction,
    seconds: f32,
    started: f64,
}

impl WalkTimed {
    pub fn new(direction: Direction, seconds: f32) -> Self {
        Self {
            direction,
            seconds,
            started: 0.0,
        }
    }

    pub(super) fn start(&mut self, cx: &mut ActionCx<'_>) -> bool {
        self.started = cx.frame.now;
        start_walking(cx, self.direction);
        false
    }

    pub(super) fn update(&mut self, cx: &mut ActionCx<'_>) -> bool {
        if cx.frame.now - self.started >= f64::from(self.seconds) {
            cx.body.velocity.x = 0.0;
            true
        } else if cx.body.velocity.x == 0.0 {
            cx.clear_subsequent();
            true
        } else {
            false
        }
    }
}

/// Walk to an x coordinate.
#[derive(Debug, Clone)]
pub struct WalkTarget {
    target_x: f32,
}

impl WalkTarget {
    pub fn new(target_x: f32) -> Self {
        Self { target_x }
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    pub(super) fn start(&mut self, cx: &mut ActionCx<'_>) -> bool {
        start_walking(cx, Direction::toward(cx.body.location.x, self.target_x));
        false
    }

    pub(super) fn update(&mut self, cx: &mut ActionCx<'_>) -> bool {
        if (cx.body.location.x - self.target_x).abs() <= ARRIVAL_TOLERANCE {
            cx.body.location.x = self.target_x;
            cx.body.velocity.x = 0.0;
            true
        } else if cx.body.velocity.x == 0.0 {
            cx.clear_subsequent();
            true
        } else {
            false
        }
    }
}

/// Walk underneath the nearest reachable part of a window's ledge, ready to
/// jump. Gives up, dropping the jump queued behind it, when the window moves
/// out of reach.
#[derive(Debug, Clone)]
pub struct WalkToWindow {
    target: WindowId,
}

impl WalkToWindow {
    pub fn new(target: WindowId) -> Self {
        Self { target }
    }

    pub fn target(&self) -> WindowId {
        self.target
    }

    pub(super) fn start(&mut self, cx: &mut ActionCx<'_>) -> bool {
        cx.body.state = CatState::Walking;
        cx.body.set_animation("Idle");
        cx.body.velocity.x = 1.0;
        self.update(cx)
    }

    pub(super) fn update(&mut self, cx: &mut ActionCx<'_>) -> bool {
        let Some(ledges) = cx.frame.platforms.platforms_of(self.target) else {
            cx.clear_subsequent();
            return true;
        };
        let Some(first) = ledges.first() else {
            cx.clear_subsequent();
            return true;
        };

        let x = cx.body.location.x;
        let rise = cx.body.location.y - first.height;
        if rise <= 0.0 || rise > cx.body.jump_height {
            cx.clear_subsequent();
            return true;
        }

        let target_x = ledges
            .iter()
            .map(|p| x.clamp(p.left, p.right))
            .min_by(|a, b| (x - a).abs().total_cmp(&(x - b).abs()))
            .unwrap_or(x);

        // The approach has to stay on the window the cat is standing on.
        let standing_on = cx
            .body
            .current_window
            .and_then(|w| cx.frame.platforms.bounds_local(w));
        if let Some(bounds) = standing_on {
            if target_x <= bounds.left as f32 || target_x >= bounds.right as f32 {
                cx.clear_subsequent();
                return true;
            }
        }

        let direction = Direction::toward(x, target_x);
        if !cx.body.animator.is_playing(direction.walking_clip()) {
            cx.body.velocity.x = direction.sign() * cx.body.walk_speed;
            cx.body.set_animation(direction.walking_clip());
        }

        if (x - target_x).abs() <= ARRIVAL_TOLERANCE {
            cx.body.location.x = target_x;
            cx.body.velocity.x = 0.0;
            true
        } else if cx.body.velocity.x == 0.0 {
            cx.clear_subsequent();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{cat, Scene};
    use super::super::{Action, ActionQueue};
    use super::*;
    use crate::desktop::{Rect, WindowInfo};

    fn window(id: isize, rect: Rect) -> WindowInfo {
        WindowInfo {
            id: WindowId(id),
            rect,
            title: String::new(),
        }
    }

    #[test]
    fn timed_walk_stops_after_its_duration() {
        let mut scene = Scene::new(&[]);
        let mut body = cat(500.0, 1080.0);
        let mut queue = ActionQueue::default();
        queue.push(Action::walk_timed(Direction::Left, 4.0));
        queue.push(Action::Sitting);

        queue.process(&mut body, scene.frame());
        assert_eq!(body.velocity.x, -35.0);
        assert!(body.animator.is_playing("Walking Left"));
        assert_eq!(body.state, CatState::Walking);

        scene.now = 4.0;
        queue.process(&mut body, scene.frame());
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.state, CatState::Sitting);
    }

    #[test]
    fn blocked_walk_drops_the_rest_of_the_plan() {
        let scene = Scene::new(&[]);
        let mut body = cat(500.0, 1080.0);
        let mut queue = ActionQueue::default();
        queue.push(Action::walk_target(900.0));
        queue.push(Action::Sitting);

        queue.process(&mut body, scene.frame());
        assert_eq!(body.velocity.x, 35.0);

        body.velocity.x = 0.0;
        queue.process(&mut body, scene.frame());
        assert!(queue.is_idle());
        assert_eq!(body.state, CatState::Walking);
    }

    #[test]
    fn target_walk_snaps_on_arrival() {
        let scene = Scene::new(&[]);
        let mut body = cat(500.0, 1080.0);
        let mut queue = ActionQueue::default();
        queue.push(Action::walk_target(480.0));

        queue.process(&mut body, scene.frame());
        assert!(body.animator.is_playing("Walking Left"));

        body.location.x = 481.5;
        queue.process(&mut body, scene.frame());
        assert_eq!(body.location.x, 480.0);
        assert_eq!(body.velocity.x, 0.0);
        assert!(queue.is_idle());
    }

    #[test]
    fn walks_under_the_nearest_part_of_the_ledge() {
        let scene = Scene::new(&[window(9, Rect::new(800, 900, 1200, 1000))]);
        let mut body = cat(500.0, 1080.0);
        let mut queue = ActionQueue::default();
        queue.push(Action::walk_to_window(WindowId(9)));
        queue.push(Action::Sitting);

        queue.process(&mut body, scene.frame());
        assert_eq!(body.velocity.x, 35.0);
        assert!(body.animator.is_playing("Walking Right"));

        body.location.x = 799.0;
        queue.process(&mut body, scene.frame());
        assert_eq!(body.location.x, 800.0);
        assert_eq!(body.state, CatState::Sitting);
    }

    #[test]
    fn gives_up_when_the_window_is_out_of_reach() {
        let scene = Scene::new(&[window(9, Rect::new(800, 100, 1200, 1000))]);
        let mut body = cat(500.0, 1080.0);
        let mut queue = ActionQueue::default();
        queue.push(Action::walk_to_window(WindowId(9)));
        queue.push(Action::Sitting);

        queue.process(&mut body, scene.frame());
        assert!(queue.is_idle());
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.state, CatState::Walking);
    }
}
