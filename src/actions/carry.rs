use glam::Vec2;

use crate::cat::animation;
use crate::ecs::components::CatState;
use crate::input::ButtonState;

use super::{sign, Action, ActionCx};

/// Swing gained per pixel of horizontal cursor movement.
const SWING_FROM_MOVEMENT: f32 = 70.0;
/// Pull back toward hanging straight down.
const PENDULUM_PULL: f32 = 100.0;
/// Extra damping while swinging back toward the centre.
const SWING_DAMPING: f32 = 10.0;
/// Maximum tilt either way, degrees.
const MAX_TILT: f32 = 90.0;

/// Speeds at or below this (pixels/second) do not bounce back.
const BOUNCE_THRESHOLD: f32 = 1.0;
/// Fraction of speed kept after a bounce.
const RESTITUTION: f32 = 0.5;
/// Tumble rate while airborne, degrees/second.
const TUMBLE_SPEED: f32 = 600.0;
/// A sliding cat only turns around above this speed.
const TURN_AROUND_SPEED: f32 = 50.0;
/// Safety wait queued behind every bounce.
const BOUNCE_SETTLE: f32 = 2.0;

/// Dangling from the cursor.
#[derive(Debug, Clone, Default)]
pub struct Carried {
    swing: f32,
}

impl Carried {
    pub(super) fn start(&mut self, cx: &mut ActionCx<'_>) -> bool {
        cx.body.state = CatState::Carried;
        cx.body.set_animation("Carried");
        false
    }

    pub(super) fn update(&mut self, cx: &mut ActionCx<'_>) -> bool {
        let input = cx.frame.input;
        let dt = cx.frame.dt;
        cx.body.location = input.location();
        self.swing_with(input.delta().x, &mut cx.body.rotation, dt);

        if !matches!(input.left, ButtonState::UpFirst | ButtonState::Up) {
            return false;
        }

        cx.body.velocity = input.delta() / dt;
        cx.queue(Action::Bounce(Bounce::default()));
        true
    }

    /// Pendulum driven by the cursor's horizontal motion.
    fn swing_with(&mut self, dx: f32, rotation: &mut f32, dt: f32) {
        self.swing += dx * SWING_FROM_MOVEMENT * dt;
        self.swing -= *rotation * PENDULUM_PULL * dt;
        if sign(self.swing) != sign(*rotation) {
            self.swing *= 1.0 - dt * SWING_DAMPING;
        }
        *rotation = (*rotation + self.swing * dt).clamp(-MAX_TILT, MAX_TILT);
    }
}

/// Tumbling after being thrown, losing half the speed on every impact.
#[derive(Debug, Clone, Default)]
pub struct Bounce {
    previous: Vec2,
}

impl Bounce {
    fn lift(cx: &mut ActionCx<'_>) {
        let frame_height = animation::clip("Bouncing").map_or(0.0, |c| c.frame_height);
        cx.body.offset.y = frame_height * cx.body.scale * -0.5;
    }

    pub(super) fn start(&mut self, cx: &mut ActionCx<'_>) -> bool {
        cx.body.state = CatState::Falling;
        cx.body.set_animation("Bouncing");
        cx.queue(Action::wait(BOUNCE_SETTLE));
        self.previous = cx.body.velocity;
        Self::lift(cx);
        false
    }

    pub(super) fn update(&mut self, cx: &mut ActionCx<'_>) -> bool {
        let v = &mut cx.body.velocity;
        if v.x == 0.0 && self.previous.x.abs() > BOUNCE_THRESHOLD {
            v.x = -self.previous.x * RESTITUTION;
        }
        if v.y == 0.0 && self.previous.y.abs() > BOUNCE_THRESHOLD {
            v.y = -self.previous.y * RESTITUTION;
        }

        let settled = *v == Vec2::ZERO && self.previous == Vec2::ZERO;
        self.previous = *v;
        let v = *v;

        if v.y == 0.0 {
            // On the ground: slide, facing away from the motion.
            let sliding = if v.x > 0.0 { "Sliding Left" } else { "Sliding Right" };
            let already_sliding = cx.body.animator.clip_name().starts_with("Sliding");
            if !already_sliding || v.x.abs() > TURN_AROUND_SPEED {
                cx.body.set_animation(sliding);
            }
            cx.body.rotation = 0.0;
            cx.body.offset = Vec2::ZERO;
        } else if !settled {
            let spin = if v.x > 0.0 { 1.0 } else { -1.0 };
            cx.body.rotation += TUMBLE_SPEED * cx.frame.dt * spin;
            Self::lift(cx);
            cx.body.set_animation("Bouncing");
        }

        settled
    }
}

/// Dropping straight down.
#[derive(Debug, Clone, Default)]
pub struct Falling {
    previous: f32,
}

impl Falling {
    pub(super) fn start(&mut self, cx: &mut ActionCx<'_>) -> bool {
        self.previous = cx.body.velocity.y;
        cx.body.state = CatState::Falling;
        cx.body.set_animation("Falling");
        false
    }

    pub(super) fn update(&mut self, cx: &mut ActionCx<'_>) -> bool {
        let landed = cx.body.velocity.y == 0.0 && self.previous == 0.0;
        self.previous = cx.body.velocity.y;
        landed
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{cat, Scene};
    use super::super::ActionQueue;
    use super::*;

    #[test]
    fn carried_cat_follows_the_cursor_and_swings() {
        let mut scene = Scene::new(&[]);
        let mut body = cat(100.0, 1080.0);
        let mut queue = ActionQueue::default();
        queue.push(Action::Carried(Carried::default()));

        scene.input.update(Vec2::new(300.0, 400.0), true, false);
        queue.process(&mut body, scene.frame());
        assert_eq!(body.state, CatState::Carried);

        scene.input.update(Vec2::new(320.0, 400.0), true, false);
        queue.process(&mut body, scene.frame());
        assert_eq!(body.location, Vec2::new(320.0, 400.0));
        assert!(body.rotation > 0.0);
        assert!(body.rotation <= MAX_TILT);
    }

    #[test]
    fn swing_is_clamped() {
        let mut carried = Carried::default();
        let mut rotation = 0.0;
        for _ in 0..120 {
            carried.swing_with(400.0, &mut rotation, 1.0 / 60.0);
        }
        assert!(rotation <= MAX_TILT);
        assert!(rotation > 0.0);
    }

    #[test]
    fn release_always_bounces_with_the_cursor_speed() {
        let mut scene = Scene::new(&[]);
        let mut body = cat(100.0, 1080.0);
        let mut queue = ActionQueue::default();
        queue.push(Action::Carried(Carried::default()));
        scene.input.update(Vec2::new(300.0, 400.0), true, false);
        queue.process(&mut body, scene.frame());

        scene.input.update(Vec2::new(310.0, 395.0), false, false);
        queue.process(&mut body, scene.frame());
        assert!((body.velocity - Vec2::new(600.0, -300.0)).length() < 0.01);
        assert_eq!(body.rotation, 0.0);
        assert_eq!(queue.current().map(Action::kind), Some("Bounce"));
        assert_eq!(queue.pending().front().map(Action::kind), Some("Wait"));
        assert!(body.offset.y < 0.0);

        let mut body = cat(100.0, 1080.0);
        let mut queue = ActionQueue::default();
        queue.push(Action::Carried(Carried::default()));
        scene.input.update(Vec2::new(310.0, 395.0), true, false);
        queue.process(&mut body, scene.frame());
        scene.input.update(Vec2::new(310.0, 395.0), false, false);
        queue.process(&mut body, scene.frame());
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(queue.current().map(Action::kind), Some("Bounce"));
    }

    #[test]
    fn bounce_reflects_then_settles_into_a_slide() {
        let scene = Scene::new(&[]);
        let mut body = cat(100.0, 1080.0);
        body.velocity = Vec2::new(200.0, 800.0);
        let mut queue = ActionQueue::default();
        queue.push(Action::Bounce(Bounce::default()));
        queue.process(&mut body, scene.frame());

        // Hit the floor.
        body.velocity.y = 0.0;
        queue.process(&mut body, scene.frame());
        assert_eq!(body.velocity.y, -400.0);
        assert!(body.animator.is_playing("Bouncing"));

        // Barely airborne, then down for good while still moving right.
        body.velocity = Vec2::new(150.0, 0.5);
        queue.process(&mut body, scene.frame());
        body.velocity.y = 0.0;
        queue.process(&mut body, scene.frame());
        assert!(body.animator.is_playing("Sliding Left"));
        assert_eq!(body.rotation, 0.0);
        assert_eq!(body.offset, Vec2::ZERO);

        // Slowed right down: no turning around.
        body.velocity = Vec2::new(-20.0, 0.0);
        queue.process(&mut body, scene.frame());
        assert!(body.animator.is_playing("Sliding Left"));

        body.velocity = Vec2::new(-0.5, 0.0);
        queue.process(&mut body, scene.frame());
        body.velocity = Vec2::ZERO;
        queue.process(&mut body, scene.frame());
        assert_eq!(queue.current().map(Action::kind), Some("Bounce"));

        queue.process(&mut body, scene.frame());
        assert_eq!(body.state, CatState::Sliding);
        assert_eq!(queue.current().map(Action::kind), Some("Wait"));
    }

    #[test]
    fn falling_needs_two_still_frames() {
        let scene = Scene::new(&[]);
        let mut body = cat(100.0, 500.0);
        body.velocity.y = 300.0;
        let mut queue = ActionQueue::default();
        queue.push(Action::Falling(Falling::default()));
        queue.process(&mut body, scene.frame());

        body.velocity.y = 0.0;
        queue.process(&mut body, scene.frame());
        assert_eq!(queue.current().map(Action::kind), Some("Falling"));

        queue.process(&mut body, scene.frame());
        assert!(body.animator.is_playing("Standing"));
        assert_eq!(body.state, CatState::Sliding);
        assert_eq!(queue.current().map(Action::kind), Some("Wait"));
    }
}
