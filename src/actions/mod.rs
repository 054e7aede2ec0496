//! Per-cat action queue.
//!
//! A cat runs at most one action at a time. When it finishes, the next queued
//! action starts in the same pass, so chains of instant actions (functions,
//! state changes, looping clips) collapse into a single frame until an action
//! that needs time is reached.

pub mod carry;
pub mod jump;
pub mod sitting;
pub mod walk;

use std::collections::VecDeque;
use std::fmt;

use crate::cat::animation::{self, ClipKind};
use crate::desktop::WindowId;
use crate::ecs::components::{Body, CatState};
use crate::ecs::systems::Frame;

use carry::{Bounce, Carried, Falling};
use jump::Jumping;
use walk::{WalkTarget, WalkTimed, WalkToWindow};

/// Polled by [`Action::WaitUntil`] every frame until it returns true.
pub type Predicate = Box<dyn FnMut(&mut ActionCx<'_>) -> bool + Send + Sync>;
/// Run once by [`Action::Function`].
pub type Callback = Box<dyn FnOnce(&mut ActionCx<'_>) + Send + Sync>;

/// What an action may touch while it runs.
pub struct ActionCx<'a> {
    pub body: &'a mut Body,
    pending: &'a mut VecDeque<Action>,
    pub frame: Frame<'a>,
}

impl ActionCx<'_> {
    /// Append to the end of the cat's queue.
    pub fn queue(&mut self, action: Action) {
        self.pending.push_back(action);
    }

    pub fn queue_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        self.pending.extend(actions);
    }

    /// Drop everything queued behind the running action.
    pub fn clear_subsequent(&mut self) {
        self.pending.clear();
    }
}

pub enum Action {
    Wait { seconds: f32, started: f64 },
    WaitUntil(Predicate),
    PlayAnimation { clip: &'static str, finished: bool },
    WalkTimed(WalkTimed),
    WalkTarget(WalkTarget),
    WalkToWindow(WalkToWindow),
    Sitting,
    Sleeping { seconds: f32, started: f64 },
    Carried(Carried),
    Bounce(Bounce),
    Falling(Falling),
    Jumping(Jumping),
    Function(Option<Callback>),
}

impl Action {
    pub fn wait(seconds: f32) -> Self {
        Self::Wait {
            seconds,
            started: 0.0,
        }
    }

    pub fn wait_until(
        predicate: impl FnMut(&mut ActionCx<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::WaitUntil(Box::new(predicate))
    }

    pub fn play(clip: &'static str) -> Self {
        Self::PlayAnimation {
            clip,
            finished: false,
        }
    }

    pub fn sleeping(seconds: f32) -> Self {
        Self::Sleeping {
            seconds,
            started: 0.0,
        }
    }

    pub fn function(f: impl FnOnce(&mut ActionCx<'_>) + Send + Sync + 'static) -> Self {
        Self::Function(Some(Box::new(f)))
    }

    /// Switch the cat's behaviour state.
    pub fn set_state(state: CatState) -> Self {
        Self::function(move |cx| cx.body.state = state)
    }

    pub fn walk_timed(direction: walk::Direction, seconds: f32) -> Self {
        Self::WalkTimed(WalkTimed::new(direction, seconds))
    }

    pub fn walk_target(target_x: f32) -> Self {
        Self::WalkTarget(WalkTarget::new(target_x))
    }

    pub fn walk_to_window(target: WindowId) -> Self {
        Self::WalkToWindow(WalkToWindow::new(target))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Wait { .. } => "Wait",
            Self::WaitUntil(_) => "WaitUntil",
            Self::PlayAnimation { .. } => "PlayAnimation",
            Self::WalkTimed(_) => "WalkTimed",
            Self::WalkTarget(_) => "WalkTarget",
            Self::WalkToWindow(_) => "WalkToWindow",
            Self::Sitting => "Sitting",
            Self::Sleeping { .. } => "Sleeping",
            Self::Carried(_) => "Carried",
            Self::Bounce(_) => "Bounce",
            Self::Falling(_) => "Falling",
            Self::Jumping(_) => "Jumping",
            Self::Function(_) => "Function",
        }
    }

    /// Called once when the action becomes current. Returns true when the
    /// action is already complete.
    fn start(&mut self, cx: &mut ActionCx<'_>) -> bool {
        match self {
            Self::Wait { started, .. } => {
                *started = cx.frame.now;
                false
            }
            Self::Sleeping { started, .. } => {
                *started = cx.frame.now;
                cx.body.set_animation("Sleeping");
                cx.body.state = CatState::Sleeping;
                false
            }
            Self::WaitUntil(_) => false,
            Self::PlayAnimation { clip, finished } => {
                cx.body.set_animation(clip);
                // Looping clips never end, so there is nothing to wait for.
                *finished = animation::clip(clip).map_or(true, |c| c.kind == ClipKind::Loop);
                *finished
            }
            Self::WalkTimed(walk) => walk.start(cx),
            Self::WalkTarget(walk) => walk.start(cx),
            Self::WalkToWindow(walk) => walk.start(cx),
            Self::Sitting => {
                cx.body.set_animation("Idle");
                cx.body.state = CatState::Sitting;
                true
            }
            Self::Carried(carried) => carried.start(cx),
            Self::Bounce(bounce) => bounce.start(cx),
            Self::Falling(falling) => falling.start(cx),
            Self::Jumping(jumping) => jumping.start(cx),
            Self::Function(f) => {
                if let Some(f) = f.take() {
                    f(cx);
                }
                true
            }
        }
    }

    /// Called every frame while current. Returns true once complete.
    fn update(&mut self, cx: &mut ActionCx<'_>) -> bool {
        match self {
            Self::Wait { seconds, started } | Self::Sleeping { seconds, started } => {
                cx.frame.now - *started >= f64::from(*seconds)
            }
            Self::WaitUntil(predicate) => predicate(cx),
            Self::PlayAnimation { finished, .. } => *finished,
            Self::WalkTimed(walk) => walk.update(cx),
            Self::WalkTarget(walk) => walk.update(cx),
            Self::WalkToWindow(walk) => walk.update(cx),
            Self::Carried(carried) => carried.update(cx),
            Self::Bounce(bounce) => bounce.update(cx),
            Self::Falling(falling) => falling.update(cx),
            Self::Sitting | Self::Jumping(_) | Self::Function(_) => true,
        }
    }

    fn on_animation_end(&mut self) {
        if let Self::PlayAnimation { finished, .. } = self {
            *finished = true;
        }
    }

    /// Undo whatever the action leaves behind. Runs when a started action
    /// completes or is cleared.
    fn finish(self, cx: &mut ActionCx<'_>) {
        match self {
            Self::WalkTimed(_) | Self::WalkTarget(_) | Self::WalkToWindow(_) => {
                cx.body.velocity.x = 0.0;
            }
            Self::Carried(_) => cx.body.rotation = 0.0,
            Self::Bounce(_) => {
                cx.body.rotation = 0.0;
                cx.body.offset = glam::Vec2::ZERO;
                cx.body.state = CatState::Sliding;
            }
            Self::Falling(_) => {
                cx.body.set_animation("Standing");
                cx.body.state = CatState::Sliding;
                cx.queue(Action::wait(1.0));
            }
            _ => {}
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wait { seconds, .. } => write!(f, "Wait({seconds}s)"),
            Self::PlayAnimation { clip, .. } => write!(f, "PlayAnimation({clip:?})"),
            Self::Sleeping { seconds, .. } => write!(f, "Sleeping({seconds}s)"),
            other => f.write_str(other.kind()),
        }
    }
}

/// The running action and everything queued behind it.
#[derive(Debug, Default)]
pub struct ActionQueue {
    current: Option<Action>,
    pending: VecDeque<Action>,
}

impl ActionQueue {
    pub fn push(&mut self, action: Action) {
        self.pending.push_back(action);
    }

    pub fn extend(&mut self, actions: impl IntoIterator<Item = Action>) {
        self.pending.extend(actions);
    }

    pub fn current(&self) -> Option<&Action> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> &VecDeque<Action> {
        &self.pending
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    /// Finish the running action, then drop everything queued.
    pub fn clear(&mut self, body: &mut Body, frame: Frame<'_>) {
        if let Some(action) = self.current.take() {
            let mut cx = ActionCx {
                body,
                pending: &mut self.pending,
                frame,
            };
            action.finish(&mut cx);
        }
        self.pending.clear();
    }

    /// Advance the queue by one frame. Returns false when there was nothing to
    /// run at all.
    pub fn process(&mut self, body: &mut Body, frame: Frame<'_>) -> bool {
        if let Some(mut action) = self.current.take() {
            let mut cx = ActionCx {
                body: &mut *body,
                pending: &mut self.pending,
                frame,
            };
            if action.update(&mut cx) {
                action.finish(&mut cx);
                self.advance(body, frame);
            } else {
                self.current = Some(action);
            }
            true
        } else if !self.pending.is_empty() {
            self.advance(body, frame);
            true
        } else {
            false
        }
    }

    /// Start queued actions until one of them needs more than this frame.
    fn advance(&mut self, body: &mut Body, frame: Frame<'_>) {
        while let Some(mut action) = self.pending.pop_front() {
            let mut cx = ActionCx {
                body: &mut *body,
                pending: &mut self.pending,
                frame,
            };
            if action.start(&mut cx) {
                action.finish(&mut cx);
            } else {
                self.current = Some(action);
                break;
            }
        }
    }

    /// Forward a one-shot clip ending to the running action.
    pub fn on_animation_end(&mut self) {
        if let Some(action) = self.current.as_mut() {
            action.on_animation_end();
        }
    }
}

/// -1, 0 or 1.
pub(crate) fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use glam::Vec2;

    use crate::desktop::monitors::{MonitorManager, MonitorSelection};
    use crate::desktop::platforms::PlatformSet;
    use crate::desktop::{StaticDesktop, WindowInfo};
    use crate::ecs::components::Body;
    use crate::ecs::systems::Frame;
    use crate::input::MouseInput;

    /// Desktop state a test frame borrows from.
    pub struct Scene {
        pub platforms: PlatformSet,
        pub monitors: MonitorManager,
        pub input: MouseInput,
        pub now: f64,
    }

    impl Scene {
        pub fn new(windows: &[WindowInfo]) -> Self {
            let mut desktop = StaticDesktop::single_monitor(1920, 1080);
            let mut monitors = MonitorManager::new(MonitorSelection::Auto);
            let mut input = MouseInput::new();
            monitors.update(&mut desktop, &mut input);
            Self {
                platforms: PlatformSet::build(windows, monitors.origin()),
                monitors,
                input,
                now: 0.0,
            }
        }

        pub fn frame(&self) -> Frame<'_> {
            Frame {
                dt: 1.0 / 60.0,
                now: self.now,
                platforms: &self.platforms,
                monitors: &self.monitors,
                input: &self.input,
            }
        }
    }

    pub fn cat(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), 2.0, 35.0, 400.0)
    }
}
