pub mod animation;
pub mod behavior;
pub mod icon;
pub mod mouse;
pub mod palette;
pub mod physics;

use crate::debug::timer::{SystemPhase, SystemTimers};
use crate::desktop::monitors::MonitorManager;
use crate::desktop::platforms::PlatformSet;
use crate::ecs::components::Body;
use crate::focus::FocusManager;
use crate::input::MouseInput;
use crate::particles::ParticleSystem;

/// Read-only view of the desktop for one simulation tick.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub dt: f32,
    /// Simulation clock, seconds since start.
    pub now: f64,
    pub platforms: &'a PlatformSet,
    pub monitors: &'a MonitorManager,
    pub input: &'a MouseInput,
}

/// Services the per-cat systems write into.
pub struct Services<'a> {
    pub rng: &'a mut fastrand::Rng,
    pub focus: &'a mut FocusManager,
    pub hearts: &'a mut ParticleSystem,
    pub timers: &'a mut SystemTimers,
}

/// Run all per-cat systems for one fixed tick.
pub fn tick(world: &mut hecs::World, frame: &Frame, services: Services<'_>) {
    let Services {
        rng,
        focus,
        hearts,
        timers,
    } = services;

    for (_, body) in world.query_mut::<&mut Body>() {
        body.old_location = body.location;
    }

    // 1. Rainbow colours
    timers.begin();
    palette::update(world, frame.dt);
    timers.end(SystemPhase::Palette);

    // 2. Hover, name tags, focus requests, patting hearts
    timers.begin();
    mouse::update(world, frame, focus, hearts, rng);
    timers.end(SystemPhase::Mouse);

    // 3. Action queues and idle planning
    timers.begin();
    behavior::update(world, frame, rng);
    timers.end(SystemPhase::Actions);

    // 4. Integration, ledges, monitor confinement
    timers.begin();
    physics::update(world, frame);
    timers.end(SystemPhase::Physics);

    // 5. Dropped-file icons
    timers.begin();
    icon::update(world, frame);
    timers.end(SystemPhase::Icons);

    // 6. Sprite playback, forwarding clip ends to the running action
    timers.begin();
    animation::update(world, frame.dt);
    timers.end(SystemPhase::Animation);
}
