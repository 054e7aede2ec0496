use std::path::PathBuf;

use glam::Vec2;

use crate::cat::animation::Animator;
use crate::config::Configs;
use crate::desktop::monitors::MonitorManager;
use crate::desktop::{Rect, WindowId};

/// Sprite pixels per cat body, before scaling.
pub const BODY_WIDTH: f32 = 20.0;
pub const BODY_HEIGHT: f32 = 16.0;
/// Gravity in pixels/second².
pub const GRAVITY: f32 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CatState {
    Sitting,
    Sleeping,
    Walking,
    Jumping,
    Falling,
    Carried,
    Sliding,
    IconExpanding,
    IconFalling,
    IconEating,
    IconProcessing,
}

/// Kinematics, behaviour state and tunables of one cat.
///
/// `location` is the cat's feet (bottom-centre of the body) in overlay-local
/// pixels.
#[derive(Debug, Clone)]
pub struct Body {
    pub location: Vec2,
    /// Location at the start of the current tick.
    pub old_location: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub state: CatState,
    /// Window whose ledge the cat is standing on.
    pub current_window: Option<WindowId>,
    pub scale: f32,
    pub walk_speed: f32,
    pub jump_height: f32,
    /// Feet height the current jump is aiming for.
    pub jump_apex: f32,
    /// Visual tilt in degrees.
    pub rotation: f32,
    /// Visual offset from `location`.
    pub offset: Vec2,
    pub animator: Animator,
}

impl Body {
    pub fn new(location: Vec2, scale: f32, walk_speed: f32, jump_height: f32) -> Self {
        Self {
            location,
            old_location: location,
            velocity: Vec2::ZERO,
            acceleration: Vec2::new(0.0, GRAVITY),
            state: CatState::Sitting,
            current_window: None,
            scale,
            walk_speed,
            jump_height,
            jump_apex: location.y,
            rotation: 0.0,
            offset: Vec2::ZERO,
            animator: Animator::default(),
        }
    }

    pub fn width(&self) -> f32 {
        BODY_WIDTH * self.scale
    }

    pub fn height(&self) -> f32 {
        BODY_HEIGHT * self.scale
    }

    pub fn half_width(&self) -> f32 {
        self.width() * 0.5
    }

    /// Body rectangle with the feet at `feet`, rounded outwards to whole pixels.
    pub fn bounds_at(&self, feet: Vec2) -> Rect {
        let top_left = (feet - Vec2::new(self.half_width(), self.height())).ceil();
        let bottom_right = (feet + Vec2::new(self.half_width(), 0.0)).ceil();
        Rect::new(
            top_left.x as i32,
            top_left.y as i32,
            bottom_right.x as i32,
            bottom_right.y as i32,
        )
    }

    pub fn bounds(&self) -> Rect {
        self.bounds_at(self.location)
    }

    pub fn desktop_bounds_at(&self, feet: Vec2, monitors: &MonitorManager) -> Rect {
        self.bounds_at(monitors.local_to_desktop(feet))
    }

    pub fn is_in_bounds(&self, point: Vec2) -> bool {
        self.bounds().contains_point(point)
    }

    pub fn set_animation(&mut self, name: &str) {
        self.animator.set(name);
    }
}

/// Display name, upper-cased.
#[derive(Debug, Clone)]
pub struct CatName(pub String);

/// Opacity of the floating name tag, 0..1.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameFade(pub f32);

/// The cat's persisted configuration.
#[derive(Debug)]
pub struct CatConfig(pub Configs);

/// A dropped file's icon on its way into the cat's mouth.
#[derive(Debug, Clone)]
pub struct IconMeal {
    pub location: Vec2,
    pub velocity: Vec2,
    pub scale: f32,
    pub source: PathBuf,
}

/// Present while the cat is being patted (right button held on it).
#[derive(Debug, Clone, Copy)]
pub struct Patting {
    /// Simulation time of the next heart.
    pub next_heart: f64,
}
