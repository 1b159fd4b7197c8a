use std::sync::Arc;
use std::time::Duration;

use engine::{GameSession, LoopConfig, WorldMapError};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::content::{self, PLAYER_START};
use super::gemini::{GeminiConfig, GeminiDialogue, DEFAULT_MODEL, DEFAULT_TIMEOUT};

const MAP_SEED_ENV_VAR: &str = "AETHERIA_MAP_SEED";
const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];
const DIALOGUE_MODEL_ENV_VAR: &str = "AETHERIA_DIALOGUE_MODEL";
const DIALOGUE_TIMEOUT_ENV_VAR: &str = "AETHERIA_DIALOGUE_TIMEOUT_SECS";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: GameSession,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error("invalid seed world: {0}")]
    World(#[from] WorldMapError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) map_seed: Option<u64>,
    pub(crate) gemini: GeminiConfig,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();

    let settings = settings_from(|name| std::env::var(name).ok());
    let map_seed = settings.map_seed.unwrap_or_else(rand::random);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        map_seed,
        dialogue_model = %settings.gemini.model,
        dialogue_key_present = settings.gemini.api_key.is_some(),
        "startup"
    );

    let config = LoopConfig::default();
    let world = content::generate_world(map_seed)?;
    let generator = Arc::new(GeminiDialogue::new(settings.gemini));
    let session = GameSession::new(world, PLAYER_START, generator, config.max_frame_delta);

    Ok(AppWiring { config, session })
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

/// Reads overrides through `lookup`; invalid values are logged and replaced
/// by their defaults.
pub(crate) fn settings_from(lookup: impl Fn(&str) -> Option<String>) -> Settings {
    let non_empty = |name: &str| {
        lookup(name)
            .map(|raw| raw.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let map_seed = non_empty(MAP_SEED_ENV_VAR).and_then(|raw| match raw.parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(error) => {
            warn!(var = MAP_SEED_ENV_VAR, value = %raw, error = %error, "invalid_env_override");
            None
        }
    });

    let api_key = API_KEY_ENV_VARS.iter().find_map(|name| non_empty(*name));
    let model = non_empty(DIALOGUE_MODEL_ENV_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let timeout = non_empty(DIALOGUE_TIMEOUT_ENV_VAR)
        .and_then(|raw| match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            Ok(_) => {
                warn!(var = DIALOGUE_TIMEOUT_ENV_VAR, value = %raw, "invalid_env_override");
                None
            }
            Err(error) => {
                warn!(
                    var = DIALOGUE_TIMEOUT_ENV_VAR,
                    value = %raw,
                    error = %error,
                    "invalid_env_override"
                );
                None
            }
        })
        .unwrap_or(DEFAULT_TIMEOUT);

    Settings {
        map_seed,
        gemini: GeminiConfig {
            api_key,
            model,
            timeout,
            ..GeminiConfig::default()
        },
    }
}
