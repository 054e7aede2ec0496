use glam::Vec2;

use crate::desktop::WindowId;
use crate::ecs::components::{Body, CatState};
use crate::ecs::systems::physics::is_location_valid;

use super::{Action, ActionCx};

/// Extra height added when jumping onto a window so the cat clears the ledge.
pub const OVER_JUMP: f32 = 35.0;
/// The apex wait ends once the feet are this close to the target height.
const APEX_TOLERANCE: f32 = 10.0;

/// Upward launch speed that peaks exactly `height` pixels up under `gravity`.
pub fn launch_velocity(height: f32, gravity: f32) -> f32 {
    -(2.0 * gravity * height).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpTarget {
    /// Straight up by this many pixels.
    Height(f32),
    /// Onto the top edge of a window.
    Window(WindowId),
}

/// Launch. Completes as soon as it starts.
#[derive(Debug, Clone)]
pub struct Jumping {
    target: JumpTarget,
}

impl Jumping {
    pub fn new(target: JumpTarget) -> Self {
        Self { target }
    }

    pub(super) fn start(&mut self, cx: &mut ActionCx<'_>) -> bool {
        let height = match self.target {
            JumpTarget::Height(height) => height,
            JumpTarget::Window(window) => {
                let Some(bounds) = cx.frame.platforms.bounds_local(window) else {
                    cx.clear_subsequent();
                    return true;
                };
                let rise = cx.body.location.y - bounds.top as f32;
                if rise > cx.body.jump_height || rise <= 0.0 {
                    cx.clear_subsequent();
                    return true;
                }
                rise + OVER_JUMP
            }
        };

        launch(cx.body, height);
        true
    }
}

fn launch(body: &mut Body, height: f32) {
    body.jump_apex = body.location.y - height;
    body.velocity.y = launch_velocity(height, body.acceleration.y);
    body.state = CatState::Jumping;
}

/// Crouch, launch, hang in the air and land on top of `window`.
pub fn jump_to_window(window: WindowId) -> [Action; 7] {
    [
        Action::function(move |cx| {
            let top = cx.frame.platforms.bounds_local(window).map(|b| b.top as f32);
            let clear = top.map_or(true, |top| {
                let spot = Vec2::new(cx.body.location.x, top);
                !is_location_valid(cx.body, spot, cx.frame.monitors)
            });
            if clear {
                cx.clear_subsequent();
            }
        }),
        Action::set_state(CatState::Jumping),
        Action::play("Jumping Start"),
        Action::Jumping(Jumping::new(JumpTarget::Window(window))),
        Action::play("Jumping Middle"),
        Action::wait_until(move |cx| {
            let top = match cx.frame.platforms.bounds_local(window) {
                Some(bounds) if cx.body.velocity.y < 0.0 => bounds.top as f32,
                _ => {
                    cx.clear_subsequent();
                    return true;
                }
            };
            cx.body.location.y - top < APEX_TOLERANCE
        }),
        Action::play("Jumping End"),
    ]
}

/// Jump straight up by `height` pixels.
pub fn jump_up(height: f32) -> [Action; 7] {
    [
        Action::function(move |cx| {
            let spot = Vec2::new(cx.body.location.x, cx.body.location.y - height);
            if !is_location_valid(cx.body, spot, cx.frame.monitors) {
                cx.clear_subsequent();
            }
        }),
        Action::set_state(CatState::Jumping),
        Action::play("Jumping Start"),
        Action::Jumping(Jumping::new(JumpTarget::Height(height))),
        Action::play("Jumping Middle"),
        // A fixed step undershoots the apex slightly, so turning back also counts.
        Action::wait_until(|cx| {
            cx.body.location.y - cx.body.jump_apex < APEX_TOLERANCE || cx.body.velocity.y >= 0.0
        }),
        Action::play("Jumping End"),
    ]
}
