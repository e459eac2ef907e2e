/// Game tuning parameters
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Difficulty curve
    pub const DIFFICULTY_MAX: f32 = 7.0;
    pub const DIFFICULTY_GROWTH_DIVISOR: f32 = 60.0;
    pub const SPAWN_INTERVAL_MIN: f32 = 0.35;
    pub const SPAWN_INTERVAL_SHRINK_DIVISOR: f32 = 250.0;

    // Spawn rolls, out of 100
    pub const HAZARD_CHANCE: u32 = 15;
    pub const HEART_SPAWN_CHANCE: f32 = 80.0;
    pub const HEART_DELAY_MAX: f32 = 35.0;
    pub const HEART_RETRY_DELAY: f32 = 1.0;

    // Session
    pub const COUNTDOWN_START: u8 = 3;
    pub const COUNTDOWN_TICK: f32 = 1.0;
    pub const STARTING_HEALTH: i32 = 3;
    pub const STARTING_DETERRENTS: i32 = 3;
}

/// Difficulty chosen in the menu before the session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyTier {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    /// Starting entity speed for this tier
    pub fn starting_difficulty(self) -> f32 {
        match self {
            DifficultyTier::Easy => 2.5,
            DifficultyTier::Medium => 3.7,
            DifficultyTier::Hard => 4.3,
        }
    }

    /// Starting wave interval in seconds for this tier
    pub fn starting_interval(self) -> f32 {
        match self {
            DifficultyTier::Easy => 3.0,
            DifficultyTier::Medium => 2.3,
            DifficultyTier::Hard => 1.7,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            DifficultyTier::Easy => 0,
            DifficultyTier::Medium => 1,
            DifficultyTier::Hard => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(DifficultyTier::Easy),
            1 => Some(DifficultyTier::Medium),
            2 => Some(DifficultyTier::Hard),
            _ => None,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub difficulty_max: f32,
    pub difficulty_growth_divisor: f32,
    pub spawn_interval_min: f32,
    pub spawn_interval_shrink_divisor: f32,
    pub hazard_chance: u32,
    pub heart_spawn_chance: f32,
    pub heart_delay_max: f32,
    pub heart_retry_delay: f32,
    pub countdown_start: u8,
    pub countdown_tick: f32,
    pub starting_health: i32,
    pub starting_deterrents: i32,
    pub end_of_path: crate::paths::EndOfPath,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty_max: Params::DIFFICULTY_MAX,
            difficulty_growth_divisor: Params::DIFFICULTY_GROWTH_DIVISOR,
            spawn_interval_min: Params::SPAWN_INTERVAL_MIN,
            spawn_interval_shrink_divisor: Params::SPAWN_INTERVAL_SHRINK_DIVISOR,
            hazard_chance: Params::HAZARD_CHANCE,
            heart_spawn_chance: Params::HEART_SPAWN_CHANCE,
            heart_delay_max: Params::HEART_DELAY_MAX,
            heart_retry_delay: Params::HEART_RETRY_DELAY,
            countdown_start: Params::COUNTDOWN_START,
            countdown_tick: Params::COUNTDOWN_TICK,
            starting_health: Params::STARTING_HEALTH,
            starting_deterrents: Params::STARTING_DETERRENTS,
            end_of_path: crate::paths::EndOfPath::Stop,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }
}
