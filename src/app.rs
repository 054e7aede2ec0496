use std::path::{Path, PathBuf};
use std::sync::Arc;

use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::cat::{self, CatManager, Hotkey, CAT_DIR};
use crate::debug::timer::SystemPhase;
use crate::debug::DebugOverlay;
use crate::desktop::monitors::MonitorManager;
use crate::desktop::windows::{WindowFeed, WindowsManager};
use crate::desktop::MonitorSource;
use crate::ecs::systems::{self, Frame, Services};
use crate::focus::FocusManager;
use crate::input::MouseInput;
use crate::particles::ParticleSystem;
use crate::platform::{self, InputSnapshot, Keys};
use crate::settings::Settings;

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// Title of the overlay window, also excluded from window enumeration.
const OVERLAY_TITLE: &str = "CatCompanion";

/// Desktop state that only exists once the overlay window does.
struct Desktop {
    window: Arc<Window>,
    windows: WindowsManager,
    monitors: MonitorManager,
    monitor_source: Box<dyn MonitorSource>,
}

/// Top-level application state.
struct App {
    settings: Settings,
    desktop: Option<Desktop>,

    // ECS
    world: hecs::World,
    cats: CatManager,

    rng: fastrand::Rng,

    // Input
    input: MouseInput,
    /// What the overlay's own window events reported, for builds without
    /// global polling.
    from_events: InputSnapshot,
    last_keys: Keys,
    dropped: Vec<PathBuf>,

    focus: FocusManager,
    hearts: ParticleSystem,
    debug: DebugOverlay,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    accumulator: f64,
    clock: f64,

    /// Fatal error raised inside the event loop, returned from `run`.
    error: Option<Box<dyn std::error::Error>>,
}

impl App {
    fn new(settings: Settings) -> Self {
        let debug = DebugOverlay::new(settings.f3_debug);
        Self {
            settings,
            desktop: None,
            world: hecs::World::new(),
            cats: CatManager::new(CAT_DIR),
            rng: fastrand::Rng::new(),
            input: MouseInput::new(),
            from_events: InputSnapshot::default(),
            last_keys: Keys::default(),
            dropped: Vec::new(),
            focus: FocusManager::new(),
            hearts: ParticleSystem::new(),
            debug,
            last_frame_time: None,
            accumulator: 0.0,
            clock: 0.0,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Box<dyn std::error::Error>) {
        self.error = Some(error);
        event_loop.exit();
    }

    /// Build the overlay covering every selected monitor and load the cats.
    fn create_desktop(&mut self, event_loop: &ActiveEventLoop) -> Result<Desktop, Box<dyn std::error::Error>> {
        let mut monitor_source = platform::monitor_source(event_loop);
        let mut monitors = MonitorManager::new(self.settings.monitors.clone());
        monitors.update(monitor_source.as_mut(), &mut self.input);

        let combined = monitors.combined_rect();
        if combined.is_empty() {
            return Err("no usable monitors".into());
        }

        // Start hidden so DWM doesn't cache the window before the overlay
        // styles are applied.
        let attrs = WindowAttributes::default()
            .with_title(OVERLAY_TITLE)
            .with_decorations(false)
            .with_transparent(true)
            .with_resizable(false)
            .with_visible(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(PhysicalSize::new(
                combined.width() as u32,
                combined.height() as u32,
            ))
            .with_position(PhysicalPosition::new(combined.left, combined.top));

        let window = Arc::new(event_loop.create_window(attrs)?);
        platform::setup_overlay(&window);

        log::info!(
            "Overlay window created: {}x{} at ({}, {}) over {} monitors",
            combined.width(),
            combined.height(),
            combined.left,
            combined.top,
            monitors.monitors().len()
        );

        let source = platform::window_source(&window, OVERLAY_TITLE);
        let feed = if self.settings.window_thread {
            match WindowFeed::background(source) {
                Ok(feed) => feed,
                Err(e) => {
                    log::warn!("Window thread unavailable, enumerating inline: {e}");
                    WindowFeed::inline(platform::window_source(&window, OVERLAY_TITLE))
                }
            }
        } else {
            WindowFeed::inline(source)
        };

        let count = self.cats.load_cats(&mut self.world, &monitors, &mut self.rng)?;
        log::info!("{count} cats on the desktop");

        Ok(Desktop {
            window,
            windows: WindowsManager::new(feed),
            monitors,
            monitor_source,
        })
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, event_loop: &ActiveEventLoop, dt: f64) {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        while self.accumulator >= TICK_RATE {
            if !self.step(TICK_RATE as f32) {
                event_loop.exit();
                return;
            }
            self.accumulator -= TICK_RATE;
        }
    }

    /// One simulation step. Returns false when the app should exit.
    fn step(&mut self, dt: f32) -> bool {
        let Some(desktop) = self.desktop.as_mut() else {
            return true;
        };

        // 1. Input
        let polled = platform::poll_input(&self.from_events);
        if polled.keys.escape {
            log::info!("ESC pressed, exiting");
            return false;
        }
        self.input.update(polled.cursor, polled.left, polled.right);

        // 2. Windows
        let timers = &mut self.debug.system_timers;
        timers.begin();
        desktop.windows.update(desktop.monitors.origin());
        timers.end(SystemPhase::Windows);

        // 3. Monitors
        timers.begin();
        desktop
            .monitors
            .update(desktop.monitor_source.as_mut(), &mut self.input);
        timers.end(SystemPhase::Monitors);

        self.clock += dt as f64;
        let frame = Frame {
            dt,
            now: self.clock,
            platforms: desktop.windows.snapshot(),
            monitors: &desktop.monitors,
            input: &self.input,
        };

        // 4. Cats
        systems::tick(
            &mut self.world,
            &frame,
            Services {
                rng: &mut self.rng,
                focus: &mut self.focus,
                hearts: &mut self.hearts,
                timers: &mut self.debug.system_timers,
            },
        );

        // 5. Pointer, hotkeys and dropped files
        self.cats.dispatch_input(&mut self.world, &frame);

        let keys = polled.keys;
        let pressed = [
            (keys.duplicate && !self.last_keys.duplicate, Hotkey::Duplicate),
            (keys.delete && !self.last_keys.delete, Hotkey::Delete),
            (keys.save && !self.last_keys.save, Hotkey::Save),
        ];
        self.last_keys = keys;
        for (_, key) in pressed.into_iter().filter(|(edge, _)| *edge) {
            if !self
                .cats
                .on_hotkey(&mut self.world, key, &frame, &mut self.rng)
            {
                log::info!("Last cat deleted, exiting");
                return false;
            }
        }

        for path in self.dropped.drain(..) {
            if !cat::on_file_dropped(&mut self.world, path.clone(), &frame) {
                log::debug!("No cat wanted {}", path.display());
            }
        }

        // 6. Hearts
        self.hearts.update(dt);

        // 7. Click-through follows cat focus
        if let Some(focused) = self.focus.update() {
            if let Err(e) = desktop.window.set_cursor_hittest(focused) {
                log::warn!("Failed to toggle click-through: {e}");
            }
        }

        // 8. Debug
        self.debug.poll_toggle(keys.f3);

        true
    }

    /// Track input the overlay sees itself. Only consulted when global
    /// polling is unavailable.
    fn record_event_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let origin = self
                    .desktop
                    .as_ref()
                    .map_or(glam::Vec2::ZERO, |d| d.monitors.origin().as_vec2());
                self.from_events.cursor =
                    origin + glam::Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let down = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.from_events.left = down,
                    MouseButton::Right => self.from_events.right = down,
                    _ => {}
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let down = event.state.is_pressed();
                let keys = &mut self.from_events.keys;
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => keys.escape = down,
                    PhysicalKey::Code(KeyCode::F3) => keys.f3 = down,
                    PhysicalKey::Code(KeyCode::KeyD) => keys.duplicate = down,
                    PhysicalKey::Code(KeyCode::Delete) => keys.delete = down,
                    PhysicalKey::Code(KeyCode::KeyS) => keys.save = down,
                    _ => {}
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.desktop.is_some() {
            return;
        }

        match self.create_desktop(event_loop) {
            Ok(desktop) => {
                // Continuous game loop
                event_loop.set_control_flow(ControlFlow::Poll);
                desktop.window.set_visible(true);
                self.desktop = Some(desktop);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(desktop) = &self.desktop {
            desktop.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.record_event_input(&event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::DroppedFile(path) => {
                self.dropped.push(path);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    let dt = now.duration_since(last).as_secs_f64();

                    if self.debug.record_frame(dt) {
                        if let Some(desktop) = &self.desktop {
                            self.debug
                                .report(desktop.windows.snapshot(), self.world.len() as usize);
                        }
                    }

                    self.run_fixed_update(event_loop, dt);
                }
                self.last_frame_time = Some(now);
            }
            _ => {}
        }
    }
}

/// Entry point: load settings, create the event loop and run.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(Path::new("."))?;
    log::info!(
        "Settings: monitors {:?}, debug {}, window thread {}",
        settings.monitors,
        settings.f3_debug,
        settings.window_thread
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
