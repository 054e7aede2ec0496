use glam::Vec2;

use super::physics::is_location_valid;
use super::Frame;
use crate::actions::carry::Bounce;
use crate::actions::walk::Direction;
use crate::actions::{jump, sitting, Action, ActionQueue};
use crate::ecs::components::{Body, CatState};

/// Chance, in percent, that an idle sitting cat looks for a window to jump on.
const JUMP_CHANCE: f32 = 70.0;
/// Chance, in percent, of a nap after a walk.
const NAP_CHANCE: f32 = 10.0;
/// Sitting budget range, seconds.
const SIT_BUDGET: (f32, f32) = (10.0, 60.0);
/// Timed walk range, seconds.
const WALK_TIME: (f32, f32) = (4.0, 10.0);
/// Distance range of a walk along a window, pixels.
const WALK_DISTANCE: (f32, f32) = (100.0, 400.0);
/// Nap length range, seconds.
const NAP_TIME: (f32, f32) = (300.0, 600.0);
/// The landing spot is checked this far above the ledge.
const LANDING_CLEARANCE: f32 = 10.0;

fn random_range(rng: &mut fastrand::Rng, (lo, hi): (f32, f32)) -> f32 {
    lo + rng.f32() * (hi - lo)
}

/// Drive every cat's action queue, planning something new for idle cats.
pub fn update(world: &mut hecs::World, frame: &Frame, rng: &mut fastrand::Rng) {
    for (_, (body, queue)) in world.query_mut::<(&mut Body, &mut ActionQueue)>() {
        process_actions(body, queue, frame, rng);
    }
}

pub fn process_actions(
    body: &mut Body,
    queue: &mut ActionQueue,
    frame: &Frame,
    rng: &mut fastrand::Rng,
) {
    // Anything moving vertically that isn't meant to be is falling.
    if body.velocity.y != 0.0 && !matches!(body.state, CatState::Falling | CatState::Jumping) {
        queue.clear(body, *frame);
        queue.push(Action::Bounce(Bounce::default()));
    }

    if !queue.process(body, *frame) {
        plan_idle(body, queue, frame, rng);
    }
}

/// Queue the next bit of autonomous behaviour for a cat with nothing to do.
fn plan_idle(body: &Body, queue: &mut ActionQueue, frame: &Frame, rng: &mut fastrand::Rng) {
    if body.state != CatState::Sitting {
        queue.extend(sitting::sit_for(random_range(rng, SIT_BUDGET), rng));
        return;
    }

    if rng.f32() * 100.0 <= JUMP_CHANCE && try_jump_to_window(body, queue, frame, rng) {
        return;
    }

    let standing_on = body
        .current_window
        .and_then(|w| frame.platforms.bounds_local(w));
    match standing_on {
        Some(bounds) => {
            let half = body.half_width();
            let target = random_range(rng, (bounds.left as f32 + half, bounds.right as f32 - half));
            let delta = target - body.location.x;
            let direction = if delta < 0.0 { -1.0 } else { 1.0 };
            let distance = delta.abs().clamp(WALK_DISTANCE.0, WALK_DISTANCE.1);
            queue.push(Action::walk_target(body.location.x + distance * direction));
        }
        None => {
            let seconds = random_range(rng, WALK_TIME);
            queue.push(Action::walk_timed(Direction::random(rng), seconds));
        }
    }

    if rng.f32() * 100.0 <= NAP_CHANCE {
        queue.extend(sitting::nap(random_range(rng, NAP_TIME)));
    }
}

/// Look for a ledge within jumping range and queue the walk and jump to it.
pub fn try_jump_to_window(
    body: &Body,
    queue: &mut ActionQueue,
    frame: &Frame,
    rng: &mut fastrand::Rng,
) -> bool {
    let mut ledges: Vec<_> = frame.platforms.platforms().iter().collect();
    rng.shuffle(&mut ledges);

    let Vec2 { x, y } = body.location;
    let standing_on = body
        .current_window
        .and_then(|w| frame.platforms.bounds_local(w));

    for ledge in ledges {
        if Some(ledge.window) == body.current_window {
            continue;
        }
        if !(ledge.height < y && ledge.height >= y - body.jump_height) {
            continue;
        }
        // From a window, the two windows must overlap to have a way up.
        if let Some(bounds) = standing_on {
            if !((bounds.left as f32) < ledge.right && (bounds.right as f32) > ledge.left) {
                continue;
            }
        }

        let target_x = x.clamp(ledge.left, ledge.right);
        let landing = Vec2::new(target_x, ledge.height - LANDING_CLEARANCE);
        if !is_location_valid(body, landing, frame.monitors) {
            continue;
        }

        log::debug!("Jumping to window {:?} at x {target_x}", ledge.window);
        queue.push(Action::walk_to_window(ledge.window));
        queue.extend(jump::jump_to_window(ledge.window));
        return true;
    }

    false
}
