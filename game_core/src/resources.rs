use crate::components::NetId;
use crate::config::Config;

/// Time resource for tracking simulation time
#[derive(Debug, Clone, Copy)]
pub struct Time {
    pub dt: f32,  // Delta time for this step
    pub now: f32, // Total elapsed time
}

impl Time {
    pub fn new(dt: f32, now: f32) -> Self {
        Self { dt, now }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self { dt: 0.016, now: 0.0 }
    }
}

/// Random number generator, reseeded per session
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Replicated per-player state. Health and score are written by the
/// basket-collision layer; deterrent stock is spent by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSlot {
    pub health: i32,
    pub score: i32,
    pub deterrents_available: i32,
    pub ready: bool,
}

impl PlayerSlot {
    pub fn new(config: &Config) -> Self {
        Self {
            health: config.starting_health,
            score: 0,
            deterrents_available: config.starting_deterrents,
            ready: false,
        }
    }

    /// Consume one deterrent if any are left
    pub fn take_deterrent(&mut self) -> bool {
        if self.deterrents_available > 0 {
            self.deterrents_available -= 1;
            true
        } else {
            false
        }
    }
}

/// Events that occurred during this frame
#[derive(Debug, Clone, Default)]
pub struct Events {
    /// Followers that reached the end of a stop-at-end path and were
    /// released this frame
    pub path_completed: Vec<NetId>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.path_completed.clear();
    }
}
