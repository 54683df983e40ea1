use std::time::Duration;

pub const DEFAULT_GRID_WIDTH: i32 = 50;
pub const DEFAULT_GRID_HEIGHT: i32 = 50;
pub const DEFAULT_STARTING_HEALTH: i32 = 6;
pub const DEFAULT_COUNTDOWN_SECS: u32 = 20;

#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub width: i32,
    pub height: i32,
    pub starting_health: i32,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            starting_health: DEFAULT_STARTING_HEALTH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Id prefix the server gives automated participants that carry no `kind` tag.
    pub bot_id_prefix: String,
    /// Display name of the second bot spawned for the AI-vs-AI demo round.
    pub demo_bot_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            bot_id_prefix: String::from("bot"),
            demo_bot_name: String::from("AI-2"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub countdown_secs: u32,
    pub countdown_interval: Duration,
    pub toast_duration: Duration,
    pub menu_reveal_delay: Duration,
    pub local: LocalConfig,
    pub sync: SyncConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            countdown_interval: Duration::from_secs(1),
            toast_duration: Duration::from_secs(3),
            menu_reveal_delay: Duration::from_secs(5),
            local: LocalConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}
