use glam::Vec2;

use super::Frame;
use crate::ecs::components::{Body, CatState, NameFade, Patting};
use crate::focus::FocusManager;
use crate::particles::ParticleSystem;

/// Name tag fade speed, alpha/second.
pub const NAME_FADE_RATE: f32 = 2.0;
/// Seconds between hearts while patting.
pub const HEART_INTERVAL: f64 = 0.1;

/// Hover bookkeeping: name tags, focus requests and patting hearts.
pub fn update(
    world: &mut hecs::World,
    frame: &Frame,
    focus: &mut FocusManager,
    hearts: &mut ParticleSystem,
    rng: &mut fastrand::Rng,
) {
    let cursor = frame.input.location();
    let moved = frame.input.delta() != Vec2::ZERO;

    for (_, (body, fade, patting)) in
        world.query_mut::<(&Body, &mut NameFade, Option<&mut Patting>)>()
    {
        let hovered = body.is_in_bounds(cursor);
        if body.state == CatState::Carried || hovered {
            if hovered {
                focus.request();
            }
            fade.0 = (fade.0 + NAME_FADE_RATE * frame.dt).min(1.0);
        } else {
            fade.0 = (fade.0 - NAME_FADE_RATE * frame.dt).max(0.0);
        }

        if let Some(patting) = patting {
            focus.request();
            if frame.now >= patting.next_heart {
                if moved && hovered {
                    hearts.spawn_heart(cursor, rng);
                }
                patting.next_heart = frame.now + HEART_INTERVAL;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::{cat, Scene};

    #[test]
    fn hovering_fades_the_name_in_and_requests_focus() {
        let mut scene = Scene::new(&[]);
        let mut world = hecs::World::new();
        let e = world.spawn((cat(500.0, 1080.0), NameFade(0.0)));
        let mut focus = FocusManager::new();
        let mut hearts = ParticleSystem::new();
        let mut rng = fastrand::Rng::with_seed(1);

        scene.input.update(Vec2::new(500.0, 1070.0), false, false);
        for _ in 0..15 {
            update(&mut world, &scene.frame(), &mut focus, &mut hearts, &mut rng);
        }
        assert_eq!(focus.update(), Some(true));
        let fade = world.get::<&NameFade>(e).unwrap().0;
        assert!((fade - 0.5).abs() < 0.01, "{fade}");

        scene.input.update(Vec2::new(10.0, 10.0), false, false);
        for _ in 0..60 {
            update(&mut world, &scene.frame(), &mut focus, &mut hearts, &mut rng);
        }
        assert_eq!(focus.update(), Some(false));
        assert_eq!(world.get::<&NameFade>(e).unwrap().0, 0.0);
    }

    #[test]
    fn patting_spawns_hearts_only_while_the_cursor_moves_over_the_cat() {
        let mut scene = Scene::new(&[]);
        let mut world = hecs::World::new();
        world.spawn((cat(500.0, 1080.0), NameFade(0.0), Patting { next_heart: 0.0 }));
        let mut focus = FocusManager::new();
        let mut hearts = ParticleSystem::new();
        let mut rng = fastrand::Rng::with_seed(1);

        scene.input.update(Vec2::new(500.0, 1070.0), false, true);
        scene.input.update(Vec2::new(500.0, 1070.0), false, true);
        update(&mut world, &scene.frame(), &mut focus, &mut hearts, &mut rng);
        assert_eq!(hearts.count(), 0);

        scene.now = 0.1;
        scene.input.update(Vec2::new(503.0, 1070.0), false, true);
        update(&mut world, &scene.frame(), &mut focus, &mut hearts, &mut rng);
        assert_eq!(hearts.count(), 1);

        // Too soon for another.
        scene.now = 0.15;
        scene.input.update(Vec2::new(506.0, 1070.0), false, true);
        update(&mut world, &scene.frame(), &mut focus, &mut hearts, &mut rng);
        assert_eq!(hearts.count(), 1);
    }
}
