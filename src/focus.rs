/// Tracks whether the overlay should accept mouse input.
///
/// The overlay is click-through unless some cat asked for focus during the
/// last frame. Cats call [`FocusManager::request`] while hovered or patted,
/// and the app calls [`FocusManager::update`] once per frame and applies any
/// change to the window.
#[derive(Debug, Default)]
pub struct FocusManager {
    focused: bool,
    requested: bool,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) {
        self.requested = true;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Latch this frame's requests. Returns the new state when it changed.
    pub fn update(&mut self) -> Option<bool> {
        let requested = std::mem::take(&mut self.requested);
        if requested == self.focused {
            return None;
        }
        self.focused = requested;
        Some(requested)
    }
}
