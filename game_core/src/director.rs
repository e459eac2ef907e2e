use rand::Rng;

use crate::components::EntityKind;
use crate::config::{Config, DifficultyTier};
use crate::paths::Lane;
use crate::resources::GameRng;

/// A single spawn the authority has decided on. Broadcast once, applied
/// identically on every peer, then discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnDecision {
    pub kind: EntityKind,
    pub lane: Lane,
    pub speed: f32,
    /// Lane set the entity is routed at; `None` means the applying
    /// peer's own
    pub target: Option<u8>,
}

impl SpawnDecision {
    /// Hazard aimed at a specific opponent's lane set
    pub fn targeted_hazard(target: u8, speed: f32, rng: &mut GameRng) -> Self {
        Self {
            kind: EntityKind::Hazard,
            lane: Lane::random(rng),
            speed,
            target: Some(target),
        }
    }
}

/// State of the delayed heart cadence. A single field, so a second heart
/// task can never run while one is pending.
#[derive(Debug, Clone, Copy, PartialEq)]
enum HeartTask {
    /// Not armed yet; the first wave arms it
    Idle,
    /// Roll against the heart chance on the next tick
    Roll,
    /// Heart confirmed, waiting out the random delay
    Delay { remaining: f32 },
    /// Roll failed, waiting before the next roll
    Retry { remaining: f32 },
}

/// Decides, tick by tick, which entities to spawn next. Runs only on the
/// authority peer, and only while the session is in play.
#[derive(Debug)]
pub struct SpawnDirector {
    difficulty: f32,
    spawn_interval: f32,
    wave_elapsed: f32,
    heart: HeartTask,
}

impl SpawnDirector {
    pub fn new(tier: DifficultyTier) -> Self {
        Self {
            difficulty: tier.starting_difficulty(),
            spawn_interval: tier.starting_interval(),
            wave_elapsed: 0.0,
            heart: HeartTask::Idle,
        }
    }

    /// Current entity speed
    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    /// Current seconds between waves
    pub fn spawn_interval(&self) -> f32 {
        self.spawn_interval
    }

    /// Advance the difficulty curve and both spawn cadences by `dt`
    /// seconds, returning the decisions that came due.
    pub fn tick(&mut self, dt: f32, config: &Config, rng: &mut GameRng) -> Vec<SpawnDecision> {
        let mut decisions = Vec::new();

        self.difficulty =
            (self.difficulty + dt / config.difficulty_growth_divisor).min(config.difficulty_max);
        self.spawn_interval = (self.spawn_interval - dt / config.spawn_interval_shrink_divisor)
            .max(config.spawn_interval_min);

        self.tick_wave(dt, config, rng, &mut decisions);
        self.tick_heart(dt, config, rng, &mut decisions);

        decisions
    }

    fn tick_wave(
        &mut self,
        dt: f32,
        config: &Config,
        rng: &mut GameRng,
        decisions: &mut Vec<SpawnDecision>,
    ) {
        self.wave_elapsed += dt;
        while self.wave_elapsed >= self.spawn_interval {
            self.wave_elapsed -= self.spawn_interval;

            let roll: u32 = rng.0.gen_range(0..100);
            let kind = if roll < config.hazard_chance {
                EntityKind::Hazard
            } else {
                EntityKind::Collectable
            };
            decisions.push(SpawnDecision {
                kind,
                lane: Lane::random(rng),
                speed: self.difficulty,
                target: None,
            });

            // The first wave arms the heart cadence
            if self.heart == HeartTask::Idle {
                self.heart = HeartTask::Roll;
            }
        }
    }

    fn tick_heart(
        &mut self,
        dt: f32,
        config: &Config,
        rng: &mut GameRng,
        decisions: &mut Vec<SpawnDecision>,
    ) {
        self.heart = match self.heart {
            HeartTask::Idle => HeartTask::Idle,
            HeartTask::Roll => {
                if rng.0.gen_range(0.0..100.0) <= config.heart_spawn_chance {
                    HeartTask::Delay {
                        remaining: rng.0.gen_range(0.0..config.heart_delay_max),
                    }
                } else {
                    HeartTask::Retry {
                        remaining: config.heart_retry_delay,
                    }
                }
            }
            HeartTask::Delay { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    decisions.push(SpawnDecision {
                        kind: EntityKind::Heart,
                        lane: Lane::random(rng),
                        speed: self.difficulty,
                        target: None,
                    });
                    HeartTask::Roll
                } else {
                    HeartTask::Delay { remaining }
                }
            }
            HeartTask::Retry { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    HeartTask::Roll
                } else {
                    HeartTask::Retry { remaining }
                }
            }
        };
    }
}
