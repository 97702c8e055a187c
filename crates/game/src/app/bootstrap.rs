use pico_engine::{resolve_app_paths, InputHandle, LoopConfig, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::config::{load_config_file, ConfigError, GameConfigFile, CONFIG_FILE_NAME};
use super::gameplay::{Playfield, SceneContext, TitleScene};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) input: InputHandle,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== Pico Planet Startup ===");

    let file = load_game_config()?;
    let config = file.apply_to(LoopConfig::default());
    let input = InputHandle::new();
    let context = SceneContext {
        input: input.clone(),
        tuning: file.tuning(),
        playfield: Playfield::from_config(&config),
        seed: rand::random(),
    };
    info!(tuning = ?context.tuning, seed = context.seed, "game_config");

    Ok(AppWiring {
        config,
        input,
        scene: Box::new(TitleScene::new(context)),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// The file lives in the project root. Without a root the engine reports the
/// problem at startup, so defaults are fine here.
fn load_game_config() -> Result<GameConfigFile, ConfigError> {
    let paths = match resolve_app_paths() {
        Ok(paths) => paths,
        Err(error) => {
            warn!(error = %error, "config_root_unresolved");
            return Ok(GameConfigFile::default());
        }
    };
    let path = paths.root.join(CONFIG_FILE_NAME);
    match load_config_file(&path)? {
        Some(file) => {
            info!(path = %path.display(), "config_loaded");
            Ok(file)
        }
        None => Ok(GameConfigFile::default()),
    }
}
