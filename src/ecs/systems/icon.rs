use glam::Vec2;

use super::Frame;
use crate::ecs::components::{Body, CatState, IconMeal};

/// Downward pull on a tossed icon, pixels/second².
const ICON_GRAVITY: Vec2 = Vec2::new(0.0, 600.0);
/// Size the icon grows toward while it is tossed up.
const ICON_FULL_SCALE: f32 = 32.0;
/// Shrink rate while it falls into the mouth, per second.
const ICON_SHRINK_RATE: f32 = 4.0;
/// Mouth height above the feet, sprite pixels.
const MOUTH_HEIGHT: f32 = 18.0;
/// Launch velocity of a dropped file's icon.
pub const ICON_TOSS: Vec2 = Vec2::new(0.0, -375.0);

/// Toss, shrink and swallow dropped-file icons.
pub fn update(world: &mut hecs::World, frame: &Frame) {
    let dt = frame.dt;
    let mut eaten = Vec::new();

    for (entity, (body, icon)) in world.query_mut::<(&mut Body, &mut IconMeal)>() {
        match body.state {
            CatState::IconExpanding => {
                icon.velocity += ICON_GRAVITY * dt;
                icon.scale *= 1.0 + (ICON_FULL_SCALE - icon.scale) * dt;
                icon.location += icon.velocity * dt;
            }
            CatState::IconFalling => {
                icon.velocity += ICON_GRAVITY * dt;
                icon.scale *= 1.0 - ICON_SHRINK_RATE * dt;
                icon.location += icon.velocity * dt;
                if icon.location.y >= body.location.y - MOUTH_HEIGHT * body.scale {
                    body.state = CatState::IconEating;
                }
            }
            CatState::IconEating => {}
            _ => eaten.push(entity),
        }
    }

    for entity in eaten {
        if let Ok(icon) = world.remove_one::<IconMeal>(entity) {
            log::debug!("Ate {}", icon.source.display());
        }
    }
}
