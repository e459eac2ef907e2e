//! Apply-on-receive half of the replication protocol. Every peer runs
//! the same code for every delivered event, in receipt order; the
//! authority's own broadcasts come back through here too.

use game_core::{DifficultyTier, EntityKind, Lane, NetId, PathId, Skin};
use proto::GameEvent;

use crate::registry::RegisteredKind;
use crate::session::{Phase, Session};

impl Session {
    /// Decode and apply one delivered broadcast
    pub fn on_receive_bytes(&mut self, bytes: &[u8]) {
        match GameEvent::from_bytes(bytes) {
            Ok(event) => self.on_receive(event),
            Err(err) => self.env.log(format!("dropped undecodable event: {err}")),
        }
    }

    /// Apply one delivered broadcast. Events are idempotent, so a
    /// retrying transport cannot corrupt the session.
    pub fn on_receive(&mut self, event: GameEvent) {
        match event {
            GameEvent::SetDifficulty { tier } => match DifficultyTier::from_index(tier) {
                Some(tier) => self.config.tier = tier,
                None => self.env.log(format!("unknown difficulty tier {tier}")),
            },
            GameEvent::SyncMultiplayer { multiplayer } => {
                self.config.multiplayer = multiplayer;
            }
            GameEvent::PlayerGrabbed { slot } => self.apply_grabbed(slot),
            GameEvent::RegisterEntity { kind, slot, id } => {
                match RegisteredKind::from_index(kind) {
                    Some(kind) => self.ids.register(kind, slot, NetId(id)),
                    None => self.env.log(format!("unknown registry kind {kind}")),
                }
            }
            GameEvent::SpawnWave {
                id,
                kind,
                lane,
                speed,
                target,
            } => {
                let (Some(kind), Some(lane)) =
                    (EntityKind::from_index(kind), Lane::from_index(lane))
                else {
                    self.env.log(format!("malformed spawn event for id {id}"));
                    return;
                };
                self.apply_spawn(NetId(id), kind, lane, speed, target);
            }
            GameEvent::SpawnHeart { id, lane, speed } => {
                let Some(lane) = Lane::from_index(lane) else {
                    self.env.log(format!("malformed heart event for id {id}"));
                    return;
                };
                self.apply_spawn(NetId(id), EntityKind::Heart, lane, speed, None);
            }
            GameEvent::MarkHazard { id } => self.apply_mark(NetId(id)),
            GameEvent::Countdown {
                slot,
                value,
                visible,
            } => self.apply_countdown(slot, value, visible),
            GameEvent::StartPlaying => self.apply_start_playing(),
            GameEvent::GameOver => self.apply_game_over(),
        }
    }

    fn apply_grabbed(&mut self, slot: u8) {
        let Some(player) = self.slots.get_mut(slot as usize) else {
            return;
        };
        // The ready count only ever grows; a repeated grab is a no-op
        if !player.ready {
            player.ready = true;
            self.players_ready += 1;
        }
    }

    fn apply_spawn(&mut self, id: NetId, kind: EntityKind, lane: Lane, speed: f32, target: Option<u8>) {
        // Late decisions racing the game-over broadcast are dropped
        if self.phase == Phase::GameOver {
            return;
        }
        // Duplicate delivery must not create a second entity
        if self.entities.contains_key(&id) {
            return;
        }
        // Untargeted entities land on the applying peer's own lane set;
        // targeted ones land on the target's lane set on every peer
        let owner = target.unwrap_or(self.local_slot);
        if owner > 1 {
            self.env.log(format!("spawn {id:?} targets unknown slot {owner}"));
            return;
        }
        self.current_speed = speed;

        let entity = game_core::create_tracked(
            &mut self.world,
            id,
            kind,
            Skin::Normal,
            PathId::new(lane, owner),
            speed,
            owner,
            self.config.rules.end_of_path,
            &*self.geometry,
        );
        self.entities.insert(id, entity);

        // The peer a hazard was sent at announces the repaint to everyone
        if target == Some(self.local_slot) {
            self.broadcast(&GameEvent::MarkHazard { id: id.0 });
        }
    }

    fn apply_mark(&mut self, id: NetId) {
        let Some(&entity) = self.entities.get(&id) else {
            // A repaint for an entity this peer never saw is cosmetic;
            // skip it rather than halting the simulation
            self.env.log(format!("skin mark for unknown entity {id:?}"));
            return;
        };
        match self.world.get::<&mut Skin>(entity) {
            Ok(mut skin) => *skin = Skin::MarkedHazard,
            Err(_) => self.env.log(format!("entity {id:?} has no skin")),
        }
    }

    fn apply_countdown(&mut self, slot: u8, value: u8, visible: bool) {
        if self.phase == Phase::GameOver {
            return;
        }
        if self.phase == Phase::Lobby {
            self.phase = Phase::Countdown;
        }
        if let Some(display) = self.countdown_display.get_mut(slot as usize) {
            *display = visible.then_some(value);
        }
    }

    fn apply_start_playing(&mut self) {
        if self.phase == Phase::Lobby || self.phase == Phase::Countdown {
            self.phase = Phase::Playing;
            // No more joiners once gameplay is running
            self.open_to_joiners = false;
            self.env.log("Countdown complete, gameplay enabled".to_string());
        }
    }

    fn apply_game_over(&mut self) {
        if self.phase == Phase::GameOver {
            return;
        }
        self.phase = Phase::GameOver;
        self.open_to_joiners = false;
        self.countdown_display = [None, None];
        if let Some(authority) = self.authority.as_mut() {
            authority.countdown = None;
        }

        // Each peer releases the local copies it created
        game_core::despawn_all(&mut self.world);
        self.entities.clear();

        // Single-player scores go to the leaderboard, once
        if !self.config.multiplayer && !self.score_submitted {
            self.score_submitted = true;
            self.leaderboard
                .submit_score(self.slots[self.local_slot as usize].score);
        }
        self.env.log("Game over".to_string());
    }
}
