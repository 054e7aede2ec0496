mod actions;
mod app;
mod cat;
mod config;
mod debug;
mod desktop;
mod ecs;
mod focus;
mod input;
mod particles;
mod platform;
mod settings;

fn main() {
    env_logger::init();
    log::info!("CatCompanion starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
