use crate::actions::ActionQueue;
use crate::ecs::components::Body;

/// Advance sprite playback and tell the running action when a one-shot clip ends.
pub fn update(world: &mut hecs::World, dt: f32) {
    for (_, (body, queue)) in world.query_mut::<(&mut Body, &mut ActionQueue)>() {
        if body.animator.update(dt) {
            queue.on_animation_end();
        }
    }
}
