pub mod animation;
pub mod palette;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glam::Vec2;
use hecs::Entity;

use crate::actions::{sitting, Action, ActionQueue};
use crate::config::{ConfigError, ConfigSchema, Configs};
use crate::desktop::monitors::MonitorManager;
use crate::ecs::components::{Body, CatConfig, CatName, CatState, IconMeal, NameFade, Patting};
use crate::ecs::systems::icon::ICON_TOSS;
use crate::ecs::systems::Frame;
use crate::input::ButtonState;

use self::palette::Palette;

/// Where cat configs live, relative to the working directory.
pub const CAT_DIR: &str = "Resources/Cats";
/// Seconds the right button must be held on a cat before it counts as patting.
pub const MOUSE_PRESS_TIME: f64 = 0.25;
/// Speed a duplicated cat and its copy are flung apart with, pixels/second.
const FLING_SPEED: f32 = 1000.0;
/// Sitting plan queued for a freshly spawned cat, seconds.
const SPAWN_SIT: (f32, f32) = (2.0, 5.0);
/// Pause around the icon toss and after eating, seconds.
const ICON_PAUSE: f32 = 0.75;

const DEFAULT_COLOURS: [&str; 6] = ["#da6666", "#787878", "#c6c6c6", "#5a5a5a", "#1f1f1f", "#f7cede"];

/// Defaults written to every new cat config.
pub fn cat_schema(dir: impl Into<PathBuf>) -> ConfigSchema {
    let schema = ConfigSchema::new(dir, "")
        .with_float("max-jump-height", 400.0)
        .with_float("walk-speed", 35.0)
        .with_float("scale", 2.0)
        .with_string("name", "");
    DEFAULT_COLOURS
        .iter()
        .enumerate()
        .fold(schema, |schema, (i, hex)| {
            schema.with_string(&format!("colours[{}]", i + 1), hex)
        })
}

/// Keys that act on the hovered cat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    Duplicate,
    Delete,
    Save,
}

/// What the pointer is currently doing to a cat.
#[derive(Debug, Clone, Copy, PartialEq)]
enum MouseState {
    Nothing,
    Left(Entity),
    Right {
        cat: Entity,
        pressed_at: f64,
        held: bool,
    },
}

/// Owns the cat population: loading, spawning, pointer and hotkey dispatch.
pub struct CatManager {
    schema: ConfigSchema,
    mouse: MouseState,
}

impl CatManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            schema: cat_schema(dir),
            mouse: MouseState::Nothing,
        }
    }

    pub fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    /// Spawn one cat per config file, spread evenly along the first monitor's
    /// work-area floor. With no configs a default cat is created.
    pub fn load_cats(
        &self,
        world: &mut hecs::World,
        monitors: &MonitorManager,
        rng: &mut fastrand::Rng,
    ) -> Result<usize, ConfigError> {
        let stems = config_stems(self.schema.location()).map_err(|source| ConfigError::Read {
            path: self.schema.location().to_path_buf(),
            source,
        })?;

        let floor = |fraction: f32| match monitors.primary() {
            Some(info) => monitors.desktop_to_local(Vec2::new(
                info.full.left as f32 + info.width as f32 * fraction,
                info.work.bottom as f32,
            )),
            None => Vec2::ZERO,
        };

        if stems.is_empty() {
            log::info!("No cats in {}, creating one", self.schema.location().display());
            let configs = Configs::create(&self.schema)?;
            spawn(world, configs, floor(0.5), rng);
            return Ok(1);
        }

        let count = stems.len();
        for (i, stem) in stems.iter().enumerate() {
            let fraction = (i as f32 + 0.5) / count as f32;
            match Configs::load(&self.schema, stem) {
                Ok(configs) => {
                    spawn(world, configs, floor(fraction), rng);
                }
                Err(e) => log::error!("Skipping cat {stem}: {e}"),
            }
        }
        log::info!("Loaded {count} cats");
        Ok(count)
    }

    /// Route this frame's button edges to the cat under the cursor.
    pub fn dispatch_input(&mut self, world: &mut hecs::World, frame: &Frame) {
        let input = frame.input;
        self.mouse = match self.mouse {
            MouseState::Nothing => {
                if input.left == ButtonState::DownFirst {
                    match hovered(world, input.location()) {
                        Some(cat) => {
                            on_lmb_down(world, cat, frame);
                            MouseState::Left(cat)
                        }
                        None => MouseState::Nothing,
                    }
                } else if input.right == ButtonState::DownFirst {
                    match hovered(world, input.location()) {
                        Some(cat) => MouseState::Right {
                            cat,
                            pressed_at: frame.now,
                            held: false,
                        },
                        None => MouseState::Nothing,
                    }
                } else {
                    MouseState::Nothing
                }
            }
            MouseState::Left(cat) => {
                if input.left == ButtonState::UpFirst || !world.contains(cat) {
                    MouseState::Nothing
                } else {
                    MouseState::Left(cat)
                }
            }
            MouseState::Right {
                cat,
                pressed_at,
                held,
            } => {
                if !world.contains(cat) {
                    MouseState::Nothing
                } else if input.right == ButtonState::UpFirst {
                    let _ = world.remove_one::<Patting>(cat);
                    if !held {
                        on_rmb_pressed(world, cat);
                    }
                    MouseState::Nothing
                } else if !held && frame.now - pressed_at >= MOUSE_PRESS_TIME {
                    log::debug!("Patting {cat:?}");
                    let _ = world.insert_one(cat, Patting { next_heart: frame.now });
                    MouseState::Right {
                        cat,
                        pressed_at,
                        held: true,
                    }
                } else {
                    MouseState::Right {
                        cat,
                        pressed_at,
                        held,
                    }
                }
            }
        };
    }

    /// Apply a hotkey to the hovered cat. Returns false once no cats remain.
    pub fn on_hotkey(
        &mut self,
        world: &mut hecs::World,
        key: Hotkey,
        frame: &Frame,
        rng: &mut fastrand::Rng,
    ) -> bool {
        let Some(cat) = hovered(world, frame.input.location()) else {
            return true;
        };

        match key {
            Hotkey::Duplicate => {
                if let Err(e) = duplicate(world, cat, frame, rng) {
                    log::error!("Failed to duplicate cat: {e}");
                }
                true
            }
            Hotkey::Delete => {
                self.mouse = MouseState::Nothing;
                delete(world, cat)
            }
            Hotkey::Save => {
                if let Err(e) = save(world, cat) {
                    log::error!("Failed to save cat: {e}");
                }
                true
            }
        }
    }
}

/// File stems in `dir`, sorted. A missing directory holds no cats.
fn config_stems(dir: &Path) -> io::Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut stems = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            stems.push(stem.to_string());
        }
    }
    stems.sort();
    Ok(stems)
}

/// Add a cat built from `configs` with its feet at `location`.
pub fn spawn(
    world: &mut hecs::World,
    configs: Configs,
    location: Vec2,
    rng: &mut fastrand::Rng,
) -> Entity {
    let float = |key: &str, fallback: f32| {
        configs.float(key).unwrap_or_else(|| {
            log::warn!("{}: missing {key}, using {fallback}", configs.path().display());
            fallback
        })
    };

    let body = Body::new(
        location,
        float("scale", 2.0),
        float("walk-speed", 35.0),
        float("max-jump-height", 400.0),
    );
    let name = configs.string("name").unwrap_or_default().to_uppercase();
    let palette = Palette::from_config(&configs);

    let mut queue = ActionQueue::default();
    let budget = SPAWN_SIT.0 + rng.f32() * (SPAWN_SIT.1 - SPAWN_SIT.0);
    queue.extend(sitting::sit_for(budget, rng));

    log::info!("Spawned cat {:?} from {}", name, configs.path().display());
    world.spawn((
        body,
        queue,
        palette,
        CatName(name),
        NameFade(0.0),
        CatConfig(configs),
    ))
}

/// First cat whose body contains `cursor`.
pub fn hovered(world: &mut hecs::World, cursor: Vec2) -> Option<Entity> {
    world
        .query_mut::<&Body>()
        .into_iter()
        .find(|(_, body)| body.is_in_bounds(cursor))
        .map(|(e, _)| e)
}

/// Pick the cat up.
pub fn on_lmb_down(world: &mut hecs::World, cat: Entity, frame: &Frame) {
    let Ok((body, queue)) = world.query_one_mut::<(&mut Body, &mut ActionQueue)>(cat) else {
        return;
    };
    if body.state == CatState::Carried {
        return;
    }
    queue.clear(body, *frame);
    body.current_window = None;
    queue.push(Action::Carried(Default::default()));
}

/// A right click without a hold asks for the cat's properties window.
fn on_rmb_pressed(world: &mut hecs::World, cat: Entity) {
    if let Ok(name) = world.get::<&CatName>(cat) {
        log::info!("Properties requested for {:?}", name.0);
    }
}

/// Fling the cat and add a copy flying the other way.
pub fn duplicate(
    world: &mut hecs::World,
    cat: Entity,
    frame: &Frame,
    rng: &mut fastrand::Rng,
) -> Result<Option<Entity>, ConfigError> {
    let angle = rng.f32() * std::f32::consts::TAU;
    let velocity = Vec2::new(angle.cos(), angle.sin().abs()) * FLING_SPEED;

    let (location, copy) = {
        let Ok((body, queue, config)) =
            world.query_one_mut::<(&mut Body, &mut ActionQueue, &CatConfig)>(cat)
        else {
            return Ok(None);
        };
        queue.clear(body, *frame);
        body.velocity = velocity;
        (body.location, config.0.duplicate()?)
    };

    let other = spawn(world, copy, location, rng);
    if let Ok(mut body) = world.get::<&mut Body>(other) {
        body.velocity = Vec2::new(-velocity.x, velocity.y);
    }
    Ok(Some(other))
}

/// Remove the cat and its config file. Returns false when it was the last cat.
pub fn delete(world: &mut hecs::World, cat: Entity) -> bool {
    match world.remove_one::<CatConfig>(cat) {
        Ok(CatConfig(configs)) => {
            let path = configs.path().to_path_buf();
            match configs.delete() {
                Ok(()) => log::info!("Deleted {}", path.display()),
                Err(e) => log::error!("{e}"),
            }
        }
        Err(_) => log::warn!("Deleting cat {cat:?} without a config"),
    }
    let _ = world.despawn(cat);

    world.query_mut::<&Body>().into_iter().next().is_some()
}

/// Write scale and palette back to the cat's config.
pub fn save(world: &mut hecs::World, cat: Entity) -> Result<(), ConfigError> {
    let Ok((body, palette, config)) =
        world.query_one_mut::<(&Body, &Palette, &mut CatConfig)>(cat)
    else {
        return Ok(());
    };
    let configs = &mut config.0;
    configs.set_float("scale", body.scale);
    palette.store(configs);
    configs.save()?;
    log::info!("Saved {}", configs.path().display());
    Ok(())
}

/// Give the cat a new name and move its config file to match.
pub fn rename(world: &mut hecs::World, cat: Entity, name: &str) -> Result<(), ConfigError> {
    let Ok((cat_name, config)) = world.query_one_mut::<(&mut CatName, &mut CatConfig)>(cat) else {
        return Ok(());
    };
    cat_name.0 = name.to_uppercase();
    let configs = &mut config.0;
    configs.set_string("name", name);
    if !name.is_empty() && configs.name() != name {
        configs.rename(name)
    } else {
        configs.save()
    }
}

/// Feed a dropped file to the cat under the cursor. Returns whether one
/// accepted it.
pub fn on_file_dropped(world: &mut hecs::World, path: PathBuf, frame: &Frame) -> bool {
    let Some(cat) = hovered(world, frame.input.location()) else {
        return false;
    };
    if world.get::<&IconMeal>(cat).is_ok() {
        return false;
    }

    let Ok((body, queue)) = world.query_one_mut::<(&mut Body, &mut ActionQueue)>(cat) else {
        return false;
    };
    if !matches!(
        body.state,
        CatState::Sitting | CatState::Sleeping | CatState::Walking
    ) {
        return false;
    }

    queue.clear(body, *frame);
    body.state = CatState::IconExpanding;
    queue.extend([
        Action::play("Idle"),
        Action::wait(ICON_PAUSE),
        Action::set_state(CatState::IconFalling),
        Action::play("Eating Icon"),
        Action::set_state(CatState::IconProcessing),
        Action::wait(ICON_PAUSE),
    ]);
    let meal = IconMeal {
        location: body.location,
        velocity: ICON_TOSS,
        scale: 1.0,
        source: path,
    };
    log::info!("Cat eating {}", meal.source.display());
    let _ = world.insert_one(cat, meal);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::Scene;

    fn write_cat(dir: &Path, stem: &str, text: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(format!("{stem}.txt")), text).unwrap();
    }

    fn body_of(world: &hecs::World, cat: Entity) -> Body {
        (*world.get::<&Body>(cat).unwrap()).clone()
    }

    fn only_cat(world: &mut hecs::World) -> Entity {
        world.query_mut::<&Body>().into_iter().next().unwrap().0
    }

    #[test]
    fn empty_directory_creates_a_default_cat() {
        let dir = tempfile::tempdir().unwrap();
        let scene = Scene::new(&[]);
        let manager = CatManager::new(dir.path().join("Cats"));
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(1);

        assert_eq!(manager.load_cats(&mut world, &scene.monitors, &mut rng).unwrap(), 1);
        assert!(dir.path().join("Cats/DEFAULT.txt").exists());

        let cat = only_cat(&mut world);
        let body = body_of(&world, cat);
        assert_eq!(body.location, Vec2::new(960.0, 1080.0));
        assert_eq!(body.scale, 2.0);
        assert_eq!(body.walk_speed, 35.0);
        assert_eq!(body.jump_height, 400.0);
        assert_eq!(world.get::<&Palette>(cat).unwrap().swatches().len(), 7);
        assert!(!world.get::<&ActionQueue>(cat).unwrap().is_idle());
    }

    #[test]
    fn cats_are_spread_along_the_floor() {
        let dir = tempfile::tempdir().unwrap();
        write_cat(dir.path(), "ALPHA", "name: alpha\nscale: 3\n");
        write_cat(dir.path(), "BETA", "name: beta\n");
        let scene = Scene::new(&[]);
        let manager = CatManager::new(dir.path());
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(1);

        assert_eq!(manager.load_cats(&mut world, &scene.monitors, &mut rng).unwrap(), 2);

        let mut cats: Vec<(String, Body)> = world
            .query_mut::<(&CatName, &Body)>()
            .into_iter()
            .map(|(_, (n, b))| (n.0.clone(), b.clone()))
            .collect();
        cats.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(cats[0].0, "ALPHA");
        assert_eq!(cats[0].1.location, Vec2::new(480.0, 1080.0));
        assert_eq!(cats[0].1.scale, 3.0);
        assert_eq!(cats[1].0, "BETA");
        assert_eq!(cats[1].1.location, Vec2::new(1440.0, 1080.0));
    }

    #[test]
    fn left_press_picks_up_the_hovered_cat() {
        let mut scene = Scene::new(&[]);
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut manager = CatManager::new("unused");
        let configs = Configs::load(manager.schema(), "nobody").unwrap();
        let cat = spawn(&mut world, configs, Vec2::new(500.0, 1080.0), &mut rng);

        scene.input.update(Vec2::new(500.0, 1070.0), true, false);
        manager.dispatch_input(&mut world, &scene.frame());
        assert_eq!(manager.mouse, MouseState::Left(cat));

        let queue = world.get::<&ActionQueue>(cat).unwrap();
        assert_eq!(queue.pending().front().map(Action::kind), Some("Carried"));
        drop(queue);

        scene.input.update(Vec2::new(500.0, 1070.0), false, false);
        manager.dispatch_input(&mut world, &scene.frame());
        assert_eq!(manager.mouse, MouseState::Nothing);
    }

    #[test]
    fn holding_the_right_button_pats() {
        let mut scene = Scene::new(&[]);
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut manager = CatManager::new("unused");
        let configs = Configs::load(manager.schema(), "nobody").unwrap();
        let cat = spawn(&mut world, configs, Vec2::new(500.0, 1080.0), &mut rng);

        scene.input.update(Vec2::new(500.0, 1070.0), false, true);
        manager.dispatch_input(&mut world, &scene.frame());
        scene.input.update(Vec2::new(500.0, 1070.0), false, true);
        scene.now = 0.2;
        manager.dispatch_input(&mut world, &scene.frame());
        assert!(world.get::<&Patting>(cat).is_err());

        scene.now = 0.25;
        manager.dispatch_input(&mut world, &scene.frame());
        assert!(world.get::<&Patting>(cat).is_ok());

        scene.input.update(Vec2::new(500.0, 1070.0), false, false);
        manager.dispatch_input(&mut world, &scene.frame());
        assert!(world.get::<&Patting>(cat).is_err());
        assert_eq!(manager.mouse, MouseState::Nothing);
    }

    #[test]
    fn duplicate_flings_both_cats_apart() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = Scene::new(&[]);
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(9);
        let mut manager = CatManager::new(dir.path());
        let configs = Configs::create(manager.schema()).unwrap();
        let cat = spawn(&mut world, configs, Vec2::new(500.0, 1080.0), &mut rng);

        scene.input.update(Vec2::new(500.0, 1070.0), false, false);
        assert!(manager.on_hotkey(&mut world, Hotkey::Duplicate, &scene.frame(), &mut rng));

        assert!(dir.path().join("DEFAULT.txt").exists());
        assert!(dir.path().join("DEFAULT-1.txt").exists());

        let original = body_of(&world, cat);
        assert!((original.velocity.length() - FLING_SPEED).abs() < 0.1);
        assert!(original.velocity.y >= 0.0);
        assert!(world.get::<&ActionQueue>(cat).unwrap().is_idle());

        let copy = world
            .query_mut::<&Body>()
            .into_iter()
            .map(|(e, _)| e)
            .find(|e| *e != cat)
            .unwrap();
        let copy = body_of(&world, copy);
        assert_eq!(copy.velocity, Vec2::new(-original.velocity.x, original.velocity.y));
    }

    #[test]
    fn deleting_the_last_cat_reports_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = Scene::new(&[]);
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut manager = CatManager::new(dir.path());
        let first = spawn(&mut world, Configs::create(manager.schema()).unwrap(), Vec2::new(500.0, 1080.0), &mut rng);
        spawn(&mut world, Configs::create(manager.schema()).unwrap(), Vec2::new(900.0, 1080.0), &mut rng);

        scene.input.update(Vec2::new(500.0, 1070.0), false, false);
        assert!(manager.on_hotkey(&mut world, Hotkey::Delete, &scene.frame(), &mut rng));
        assert!(!world.contains(first));
        assert!(!dir.path().join("DEFAULT.txt").exists());

        scene.input.update(Vec2::new(900.0, 1070.0), false, false);
        assert!(!manager.on_hotkey(&mut world, Hotkey::Delete, &scene.frame(), &mut rng));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn save_and_rename_write_back_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let manager = CatManager::new(dir.path());
        let cat = spawn(&mut world, Configs::create(manager.schema()).unwrap(), Vec2::new(500.0, 1080.0), &mut rng);

        world.get::<&mut Body>(cat).unwrap().scale = 3.0;
        world.get::<&mut Palette>(cat).unwrap().set(
            1,
            palette::Swatch {
                rgb: glam::Vec3::new(1.0, 0.0, 0.0),
                rainbow: true,
            },
        );
        save(&mut world, cat).unwrap();
        let text = fs::read_to_string(dir.path().join("DEFAULT.txt")).unwrap();
        assert!(text.contains("scale: 3\n"));
        assert!(text.contains("colours[1]: #ff0000!\n"));

        rename(&mut world, cat, "Mochi").unwrap();
        assert!(!dir.path().join("DEFAULT.txt").exists());
        assert!(dir.path().join("Mochi.txt").exists());
        assert_eq!(world.get::<&CatName>(cat).unwrap().0, "MOCHI");
    }

    #[test]
    fn dropped_file_starts_the_icon_meal() {
        let mut scene = Scene::new(&[]);
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let manager = CatManager::new("unused");
        let cat = spawn(
            &mut world,
            Configs::load(manager.schema(), "nobody").unwrap(),
            Vec2::new(500.0, 1080.0),
            &mut rng,
        );

        scene.input.update(Vec2::new(10.0, 10.0), false, false);
        assert!(!on_file_dropped(&mut world, PathBuf::from("a.txt"), &scene.frame()));

        scene.input.update(Vec2::new(500.0, 1070.0), false, false);
        assert!(on_file_dropped(&mut world, PathBuf::from("a.txt"), &scene.frame()));
        assert_eq!(body_of(&world, cat).state, CatState::IconExpanding);
        assert!(world.get::<&IconMeal>(cat).is_ok());

        // Busy with the first one.
        assert!(!on_file_dropped(&mut world, PathBuf::from("b.txt"), &scene.frame()));
        let kinds: Vec<_> = world
            .get::<&ActionQueue>(cat)
            .unwrap()
            .pending()
            .iter()
            .map(Action::kind)
            .collect();
        assert_eq!(
            kinds,
            ["PlayAnimation", "Wait", "Function", "PlayAnimation", "Function", "Wait"]
        );
    }
}
