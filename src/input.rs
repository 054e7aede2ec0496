use glam::Vec2;

/// Edge-triggered button state, advanced once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Up,
    /// Pressed this frame.
    DownFirst,
    Down,
    /// Released this frame.
    UpFirst,
}

impl ButtonState {
    /// Next state given whether the button is physically down now.
    pub fn advance(self, down: bool) -> Self {
        match (self.is_down(), down) {
            (false, true) => Self::DownFirst,
            (true, true) => Self::Down,
            (true, false) => Self::UpFirst,
            (false, false) => Self::Up,
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, Self::DownFirst | Self::Down)
    }
}

/// Per-frame mouse snapshot.
///
/// The raw cursor arrives in desktop coordinates; `location` is the same
/// point in overlay-local space and is kept current by the monitor manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseInput {
    desktop: Vec2,
    location: Vec2,
    delta: Vec2,
    pub left: ButtonState,
    pub right: ButtonState,
}

impl MouseInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the polled cursor position and button levels. Call once per frame.
    pub fn update(&mut self, desktop: Vec2, left_down: bool, right_down: bool) {
        self.delta = desktop - self.desktop;
        self.location += self.delta;
        self.desktop = desktop;
        self.left = self.left.advance(left_down);
        self.right = self.right.advance(right_down);
    }

    /// Re-anchor the local position after the desktop-to-local mapping moved.
    pub fn relocate(&mut self, local: Vec2) {
        self.location = local;
    }

    pub fn desktop_location(&self) -> Vec2 {
        self.desktop
    }

    /// Cursor in overlay-local coordinates.
    pub fn location(&self) -> Vec2 {
        self.location
    }

    /// Cursor movement since the previous frame.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_edges() {
        let mut input = MouseInput::new();
        input.update(Vec2::ZERO, true, false);
        assert_eq!(input.left, ButtonState::DownFirst);
        input.update(Vec2::ZERO, true, false);
        assert_eq!(input.left, ButtonState::Down);
        input.update(Vec2::ZERO, false, false);
        assert_eq!(input.left, ButtonState::UpFirst);
        input.update(Vec2::ZERO, false, false);
        assert_eq!(input.left, ButtonState::Up);
        assert_eq!(input.right, ButtonState::Up);
    }

    #[test]
    fn delta_tracks_desktop_motion() {
        let mut input = MouseInput::new();
        input.update(Vec2::new(100.0, 100.0), false, false);
        input.relocate(Vec2::new(10.0, 10.0));
        input.update(Vec2::new(104.0, 97.0), false, false);

        assert_eq!(input.delta(), Vec2::new(4.0, -3.0));
        assert_eq!(input.location(), Vec2::new(14.0, 7.0));
    }
}
