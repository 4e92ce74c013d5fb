use skirmish_engine::{
    load_game_config, resolve_app_paths, AppError, GameConfig, GameSession, LoopConfig,
    SpriteStore, SurfaceSize, SystemClock,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const OVERLAY_ENV_VAR: &str = "SKIRMISH_OVERLAY";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: GameSession,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Skirmish Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        sprites = %paths.sprites_dir.display(),
        "app_paths_resolved"
    );
    let game_config = load_game_config(&paths.config_path)?;
    let config = LoopConfig {
        overlay_visible: overlay_enabled(std::env::var(OVERLAY_ENV_VAR).ok().as_deref()),
        ..LoopConfig::default()
    };
    let session = build_session(&config, game_config, SpriteStore::new(paths.sprites_dir));

    Ok(AppWiring { config, session })
}

fn build_session(config: &LoopConfig, game_config: GameConfig, sprites: SpriteStore) -> GameSession {
    let surface = SurfaceSize {
        width: config.window_width,
        height: config.window_height,
    };
    let mut session = GameSession::new(Box::new(SystemClock::new()), game_config, sprites, surface);
    session.new_game();
    session
}

fn overlay_enabled(raw: Option<&str>) -> bool {
    matches!(
        raw.map(str::trim),
        Some("1") | Some("true") | Some("on") | Some("yes")
    )
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_env_accepts_common_truthy_values() {
        assert!(overlay_enabled(Some("1")));
        assert!(overlay_enabled(Some(" on ")));
        assert!(!overlay_enabled(Some("0")));
        assert!(!overlay_enabled(None));
    }

    #[test]
    fn session_starts_with_pending_soldier_spawn() {
        let config = LoopConfig::default();
        let session = build_session(&config, GameConfig::default(), SpriteStore::in_memory());
        assert!(session.has_pending_spawn());
        assert!(session.pool().is_loop_running());
        assert_eq!(session.surface().width, config.window_width);
        assert!(session.soldier().is_none());
    }
}
