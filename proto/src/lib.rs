//! Replicated-event protocol for the basket game
//!
//! Every peer-to-peer interaction is one `GameEvent`, serialized with
//! postcard and delivered to all peers (including the sender) over the
//! transport's reliable ordered broadcast.

use postcard::{from_bytes, to_allocvec};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum GameEvent {
    /// Authority's difficulty tier selection: 0 = Easy, 1 = Medium, 2 = Hard
    SetDifficulty { tier: u8 },

    /// Authority's session mode, pushed once at session start
    SyncMultiplayer { multiplayer: bool },

    /// A player grabbed their basket; counts toward the ready check
    PlayerGrabbed { slot: u8 },

    /// Share a per-player prefab id.
    /// kind: 0 = player, 1 = basket, 2 = shadow basket, 3 = tombstone
    RegisterEntity { kind: u8, slot: u8, id: u64 },

    /// One wave spawn decision.
    /// kind: 0 = collectable, 1 = hazard; lane: 0 = left, 1 = mid, 2 = right;
    /// target: opponent slot for a sent hazard, None for a normal wave
    SpawnWave {
        id: u64,
        kind: u8,
        lane: u8,
        speed: f32,
        target: Option<u8>,
    },

    /// One heart spawn decision
    SpawnHeart { id: u64, lane: u8, speed: f32 },

    /// Repaint a sent hazard so every peer renders it distinctly
    MarkHazard { id: u64 },

    /// Countdown tick for one player's display
    Countdown { slot: u8, value: u8, visible: bool },

    /// Countdown finished; gameplay is enabled everywhere
    StartPlaying,

    /// Terminal condition reached; the session is over
    GameOver,
}

impl GameEvent {
    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec(self)
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        from_bytes(bytes)
    }
}
