use glam::Vec2;

/// Maximum concurrent particles.
const MAX_PARTICLES: usize = 512;

/// Random spread around the spawn point, pixels.
const HEART_LOCATION_SPREAD: f32 = 4.0;
/// Random initial velocity, pixels/second.
const HEART_VELOCITY_SPREAD: f32 = 30.0;
/// Hearts drift upward.
const HEART_ACCELERATION: Vec2 = Vec2::new(0.0, -100.0);
const HEART_ACCELERATION_SPREAD: f32 = 50.0;
const HEART_LIFETIME: f32 = 2.0;
/// Starting size, pixels. Shrinks linearly to nothing over the lifetime.
const HEART_SIZE: f32 = 18.0;

/// A single heart floating away from a patted cat.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    vel: Vec2,
    accel: Vec2,
    lifetime: f32,
    max_lifetime: f32,
    max_size: f32,
    pub size: f32,
}

/// Uniform random point within a disc.
fn random_in_radius(rng: &mut fastrand::Rng, radius: f32) -> Vec2 {
    let angle = rng.f32() * std::f32::consts::TAU;
    let r = radius * rng.f32().sqrt();
    Vec2::new(angle.cos(), angle.sin()) * r
}

/// Particle system for the hearts spawned while patting.
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
        }
    }

    /// Spawn one heart around `at`. Ignored once the cap is reached.
    pub fn spawn_heart(&mut self, at: Vec2, rng: &mut fastrand::Rng) {
        if self.particles.len() >= MAX_PARTICLES {
            return;
        }
        self.particles.push(Particle {
            pos: at + random_in_radius(rng, HEART_LOCATION_SPREAD),
            vel: random_in_radius(rng, HEART_VELOCITY_SPREAD),
            accel: HEART_ACCELERATION + random_in_radius(rng, HEART_ACCELERATION_SPREAD),
            lifetime: HEART_LIFETIME,
            max_lifetime: HEART_LIFETIME,
            max_size: HEART_SIZE,
            size: HEART_SIZE,
        });
    }

    /// Update all particles: age, move, remove dead.
    pub fn update(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            p.lifetime -= dt;

            if p.lifetime <= 0.0 {
                self.particles.swap_remove(i);
            } else {
                p.vel += p.accel * dt;
                p.pos += p.vel * dt;
                p.size = p.max_size * (p.lifetime / p.max_lifetime);
                i += 1;
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of active particles.
    pub fn count(&self) -> usize {
        self.particles.len()
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hearts_rise_shrink_and_expire() {
        let mut rng = fastrand::Rng::with_seed(4);
        let mut hearts = ParticleSystem::new();
        hearts.spawn_heart(Vec2::new(100.0, 100.0), &mut rng);
        let start = hearts.particles()[0].pos;
        assert!(start.distance(Vec2::new(100.0, 100.0)) <= HEART_LOCATION_SPREAD);

        for _ in 0..114 {
            hearts.update(1.0 / 60.0);
        }
        let heart = hearts.particles()[0];
        assert!(heart.pos.y < start.y);
        assert!((heart.size - HEART_SIZE * 0.05).abs() < 0.1);

        for _ in 0..10 {
            hearts.update(1.0 / 60.0);
        }
        assert_eq!(hearts.count(), 0);
    }

    #[test]
    fn spawning_is_capped() {
        let mut rng = fastrand::Rng::with_seed(4);
        let mut hearts = ParticleSystem::new();
        for _ in 0..MAX_PARTICLES + 20 {
            hearts.spawn_heart(Vec2::ZERO, &mut rng);
        }
        assert_eq!(hearts.count(), MAX_PARTICLES);
    }
}
