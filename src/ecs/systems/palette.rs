use crate::cat::palette::Palette;

/// Rotate the hue of every rainbow colour.
pub fn update(world: &mut hecs::World, dt: f32) {
    for (_, palette) in world.query_mut::<&mut Palette>() {
        palette.update(dt);
    }
}
