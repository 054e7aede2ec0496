use crate::cat::animation;
use crate::ecs::components::CatState;

use super::Action;

/// Shortest and longest stretch of plain sitting between fidgets, seconds.
const SIT_MIN: f32 = 5.0;
const SIT_MAX: f32 = 10.0;
/// Budget left over below this is ignored.
const EPSILON: f32 = 0.001;

/// Fill `budget` seconds with sitting, broken up by random idle fidgets.
///
/// The pieces add up to at most `budget` and leave less than a millisecond
/// unused.
pub fn sit_for(budget: f32, rng: &mut fastrand::Rng) -> Vec<Action> {
    let mut actions = Vec::new();
    let mut fidgets = animation::idle_clips();
    let mut used = 0.0f32;

    while budget - used >= EPSILON {
        let wait = fit(used, SIT_MIN + rng.f32() * (SIT_MAX - SIT_MIN), budget);
        used += wait;
        actions.push(Action::Sitting);
        actions.push(Action::wait(wait));

        if budget - used >= EPSILON {
            rng.shuffle(&mut fidgets);
            if let Some(&(clip, duration)) = fidgets.iter().find(|(_, d)| used + *d <= budget) {
                actions.push(Action::play(clip));
                used += duration;
            }
        }
    }

    actions
}

/// Largest piece no longer than `wanted` that keeps `used + piece` within
/// `budget` under f32 rounding.
fn fit(used: f32, wanted: f32, budget: f32) -> f32 {
    let mut piece = wanted.min(budget - used).max(0.0);
    while piece > 0.0 && used + piece > budget {
        piece = f32::from_bits(piece.to_bits() - 1);
    }
    piece
}

/// Yawn, sleep for `seconds`, yawn again.
pub fn nap(seconds: f32) -> [Action; 4] {
    [
        Action::set_state(CatState::Sitting),
        Action::play("Idle Yawn"),
        Action::sleeping(seconds),
        Action::play("Idle Yawn"),
    ]
}
