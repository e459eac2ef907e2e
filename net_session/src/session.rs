use std::collections::HashMap;

use game_core::{
    Config, DifficultyTier, EntityKind, Events, GameRng, NetId, PathGeometry, PlayerSlot,
    SpawnDecision, SpawnDirector, Time,
};
use hecs::World;
use proto::GameEvent;

use crate::error::SessionError;
use crate::registry::{RegisteredKind, SharedIds};
use crate::role::Role;

/// Session lifecycle phase. GameOver is terminal; a new session needs a
/// full re-initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Countdown,
    Playing,
    GameOver,
}

/// Reliable ordered broadcast. The transport delivers every event to all
/// peers in the room, including the sender, in send order.
pub trait PeerLink {
    fn send_bytes(&self, bytes: &[u8]) -> Result<(), SessionError>;
}

/// Clock and logging seam, so tests can inject a deterministic mock
pub trait Environment {
    fn now(&self) -> u64; // ms
    fn log(&self, msg: String);
}

/// Native environment: monotonic clock plus the `log` facade
pub struct StdEnv {
    start: std::time::Instant,
}

impl StdEnv {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for StdEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for StdEnv {
    fn now(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn log(&self, msg: String) {
        log::info!("{msg}");
    }
}

/// External leaderboard; only consulted after a single-player game
pub trait Leaderboard {
    fn submit_score(&self, score: i32);
}

/// Per-session settings handed in by the menu layer
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub capacity: u8, // 1 or 2
    pub multiplayer: bool,
    /// Whether this peer was first into the room; decides the authority
    pub first_joiner: bool,
    pub tier: DifficultyTier,
    pub seed: u64,
    pub rules: Config,
}

impl SessionConfig {
    /// Solo session: one slot, always the authority
    pub fn single_player(tier: DifficultyTier, seed: u64) -> Self {
        Self {
            capacity: 1,
            multiplayer: false,
            first_joiner: true,
            tier,
            seed,
            rules: Config::new(),
        }
    }

    /// Two-player shared session
    pub fn shared(tier: DifficultyTier, seed: u64, first_joiner: bool) -> Self {
        Self {
            capacity: 2,
            multiplayer: true,
            first_joiner,
            tier,
            seed,
            rules: Config::new(),
        }
    }
}

/// Countdown the authority runs after the lobby fills
#[derive(Debug, Clone, Copy)]
pub(crate) struct Countdown {
    pub(crate) value: u8,
    pub(crate) timer: f32,
}

/// State only the authority peer owns. Followers never construct one, so
/// decision origination cannot happen on the wrong peer.
pub(crate) struct AuthorityState {
    pub(crate) director: SpawnDirector,
    pub(crate) countdown: Option<Countdown>,
}

impl AuthorityState {
    fn new(tier: DifficultyTier) -> Self {
        Self {
            director: SpawnDirector::new(tier),
            countdown: None,
        }
    }
}

/// One replicated game session on one peer
pub struct Session {
    pub(crate) env: Box<dyn Environment>,
    pub(crate) link: Box<dyn PeerLink>,
    pub(crate) leaderboard: Box<dyn Leaderboard>,
    pub(crate) geometry: Box<dyn PathGeometry>,
    pub(crate) config: SessionConfig,
    pub(crate) role: Role,
    pub(crate) local_slot: u8,
    pub(crate) phase: Phase,
    pub(crate) open_to_joiners: bool,
    pub(crate) active_players: u8,
    pub(crate) players_ready: u8,
    pub(crate) countdown_started: bool,
    pub(crate) countdown_display: [Option<u8>; 2],
    pub(crate) slots: [PlayerSlot; 2],
    pub(crate) ids: SharedIds,
    pub(crate) world: World,
    pub(crate) entities: HashMap<NetId, hecs::Entity>,
    pub(crate) events: Events,
    pub(crate) time: Time,
    pub(crate) rng: GameRng,
    pub(crate) current_speed: f32,
    pub(crate) next_seq: u32,
    pub(crate) authority: Option<AuthorityState>,
    pub(crate) score_submitted: bool,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        env: Box<dyn Environment>,
        link: Box<dyn PeerLink>,
        geometry: Box<dyn PathGeometry>,
        leaderboard: Box<dyn Leaderboard>,
    ) -> Self {
        let role = Role::resolve(config.multiplayer, config.first_joiner);
        let authority = role.is_authority().then(|| AuthorityState::new(config.tier));
        let slots = [PlayerSlot::new(&config.rules), PlayerSlot::new(&config.rules)];
        let rng = GameRng::new(config.seed);
        let current_speed = config.tier.starting_difficulty();

        let session = Self {
            env,
            link,
            leaderboard,
            geometry,
            role,
            local_slot: role.slot(),
            phase: Phase::Lobby,
            open_to_joiners: true,
            active_players: 0,
            players_ready: 0,
            countdown_started: false,
            countdown_display: [None, None],
            slots,
            ids: SharedIds::new(),
            world: World::new(),
            entities: HashMap::new(),
            events: Events::new(),
            time: Time::new(0.0, 0.0),
            rng,
            current_speed,
            next_seq: 0,
            authority,
            score_submitted: false,
            config,
        };

        session.env.log(format!(
            "Session created at {} ms as {:?}",
            session.env.now(),
            session.role
        ));

        // The authority announces the agreed settings to every peer
        if session.role.is_authority() && session.config.multiplayer {
            session.broadcast(&GameEvent::SyncMultiplayer { multiplayer: true });
            session.broadcast(&GameEvent::SetDifficulty {
                tier: session.config.tier.index(),
            });
        }

        session
    }

    /// Transport callback: a peer entered the room
    pub fn player_joined(&mut self) -> Result<u8, SessionError> {
        if !self.open_to_joiners || self.active_players >= self.config.capacity {
            return Err(SessionError::RoomUnavailable);
        }
        let slot = self.active_players;
        self.active_players += 1;
        self.env.log(format!("Player joined, slot {slot}"));
        Ok(slot)
    }

    /// Transport callback: a peer left the room. Mid-game departure is
    /// resolved at game over as an automatic win for whoever stayed.
    pub fn player_left(&mut self) {
        self.active_players = self.active_players.saturating_sub(1);
        self.env.log("Player left".to_string());
    }

    /// Local player grabbed their basket; counts toward the ready check
    pub fn grab_basket(&self) {
        self.broadcast(&GameEvent::PlayerGrabbed {
            slot: self.local_slot,
        });
    }

    /// Share a locally spawned prefab id with every peer
    pub fn register_entity(&self, kind: RegisteredKind, slot: u8, id: NetId) {
        self.broadcast(&GameEvent::RegisterEntity {
            kind: kind.index(),
            slot,
            id: id.0,
        });
    }

    /// Spend one deterrent and send a hazard at the opponent's lanes
    pub fn send_deterrent(&mut self) -> Result<(), SessionError> {
        if !self.config.multiplayer {
            return Err(SessionError::NotMultiplayer);
        }
        if self.phase != Phase::Playing {
            return Err(SessionError::WrongPhase);
        }
        if !self.slots[self.local_slot as usize].take_deterrent() {
            return Err(SessionError::OutOfDeterrents);
        }
        let target = 1 - self.local_slot;
        let decision = SpawnDecision::targeted_hazard(target, self.current_speed, &mut self.rng);
        self.broadcast_decision(&decision);
        self.env.log("Sent deterrent".to_string());
        Ok(())
    }

    /// Called by the health/collision layer once a terminal condition is
    /// reached; the authority announces it to every peer.
    pub fn report_game_over(&mut self) -> Result<(), SessionError> {
        if self.authority.is_none() {
            return Err(SessionError::NotAuthority);
        }
        if self.phase != Phase::Playing {
            return Err(SessionError::WrongPhase);
        }
        self.broadcast(&GameEvent::GameOver);
        Ok(())
    }

    /// Advance the session by one tick
    pub fn tick(&mut self, dt: f32) {
        self.time.dt = dt;
        self.time.now += dt;

        match self.phase {
            Phase::Lobby => self.tick_lobby(),
            Phase::Countdown => self.tick_countdown(dt),
            Phase::Playing => self.tick_playing(dt),
            Phase::GameOver => {}
        }

        game_core::step(&mut self.world, &self.time, &*self.geometry, &mut self.events);
    }

    fn tick_lobby(&mut self) {
        if self.countdown_started
            || self.config.capacity == 0
            || self.players_ready < self.config.capacity
        {
            return;
        }
        // Only the authority observes the ready condition and originates
        // the countdown
        let Some(authority) = self.authority.as_mut() else {
            return;
        };
        authority.countdown = Some(Countdown {
            value: self.config.rules.countdown_start,
            timer: 0.0,
        });
        self.countdown_started = true;
        self.phase = Phase::Countdown;
        self.broadcast_countdown_tick(self.config.rules.countdown_start, true);
        self.env
            .log("All players ready, starting countdown".to_string());
    }

    fn tick_countdown(&mut self, dt: f32) {
        let tick_len = self.config.rules.countdown_tick;
        let Some(authority) = self.authority.as_mut() else {
            return;
        };
        let Some(countdown) = authority.countdown.as_mut() else {
            return;
        };

        countdown.timer += dt;
        let mut due = Vec::new();
        let mut finished = false;
        while countdown.timer >= tick_len {
            countdown.timer -= tick_len;
            if countdown.value > 0 {
                countdown.value -= 1;
                due.push(countdown.value);
            } else {
                finished = true;
                break;
            }
        }
        if finished {
            authority.countdown = None;
        }

        for value in due {
            self.broadcast_countdown_tick(value, true);
        }
        if finished {
            // Hide the display on every peer, then enable gameplay
            self.broadcast_countdown_tick(0, false);
            self.broadcast(&GameEvent::StartPlaying);
        }
    }

    fn tick_playing(&mut self, dt: f32) {
        let decisions = match self.authority.as_mut() {
            Some(authority) => authority.director.tick(dt, &self.config.rules, &mut self.rng),
            None => Vec::new(),
        };
        for decision in decisions {
            self.broadcast_decision(&decision);
        }
    }

    pub(crate) fn broadcast_decision(&mut self, decision: &SpawnDecision) {
        let id = self.alloc_id();
        let event = match decision.kind {
            EntityKind::Heart => GameEvent::SpawnHeart {
                id: id.0,
                lane: decision.lane.index(),
                speed: decision.speed,
            },
            kind => GameEvent::SpawnWave {
                id: id.0,
                kind: kind.index(),
                lane: decision.lane.index(),
                speed: decision.speed,
                target: decision.target,
            },
        };
        self.broadcast(&event);
    }

    fn broadcast_countdown_tick(&self, value: u8, visible: bool) {
        for slot in 0..self.config.capacity.min(2) {
            self.broadcast(&GameEvent::Countdown {
                slot,
                value,
                visible,
            });
        }
    }

    pub(crate) fn broadcast(&self, event: &GameEvent) {
        match event.to_bytes() {
            Ok(bytes) => {
                if self.link.send_bytes(&bytes).is_err() {
                    self.env
                        .log("broadcast failed, transport refused the event".to_string());
                }
            }
            Err(err) => self.env.log(format!("failed to encode event: {err}")),
        }
    }

    fn alloc_id(&mut self) -> NetId {
        let id = NetId::new(self.local_slot, self.next_seq);
        self.next_seq += 1;
        id
    }

    // Accessors for the collision/scoring layer and the renderer

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn local_slot(&self) -> u8 {
        self.local_slot
    }

    pub fn slots(&self) -> &[PlayerSlot; 2] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [PlayerSlot; 2] {
        &mut self.slots
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn entity(&self, id: NetId) -> Option<hecs::Entity> {
        self.entities.get(&id).copied()
    }

    pub fn ids(&self) -> &SharedIds {
        &self.ids
    }

    /// Countdown value currently shown for a slot, if visible
    pub fn countdown(&self, slot: u8) -> Option<u8> {
        self.countdown_display.get(slot as usize).copied().flatten()
    }

    /// Latest replicated entity speed (the authority's difficulty)
    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    /// Frame events for the entity-factory collaborator
    pub fn frame_events(&self) -> &Events {
        &self.events
    }

    /// Final outcome, available once the session is over
    pub fn outcome(&self) -> Option<game_core::Outcome> {
        if self.phase != Phase::GameOver {
            return None;
        }
        let other = 1 - self.local_slot as usize;
        Some(game_core::resolve_outcome(
            &self.slots,
            self.active_players as usize,
            self.config.multiplayer,
            self.local_slot as usize,
            other,
        ))
    }
}
