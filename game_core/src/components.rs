use glam::{Quat, Vec3};

use crate::paths::{EndOfPath, PathId};

/// What a spawned entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Collectable,
    Hazard,
    Heart,
}

impl EntityKind {
    pub fn index(self) -> u8 {
        match self {
            EntityKind::Collectable => 0,
            EntityKind::Hazard => 1,
            EntityKind::Heart => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(EntityKind::Collectable),
            1 => Some(EntityKind::Hazard),
            2 => Some(EntityKind::Heart),
            _ => None,
        }
    }
}

/// Visual variant; hazards deliberately sent by an opponent are marked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Skin {
    #[default]
    Normal,
    MarkedHazard,
}

/// Network-unique entity id: originating slot in the high bits, that
/// peer's sequence counter in the low bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(pub u64);

impl NetId {
    pub fn new(origin_slot: u8, seq: u32) -> Self {
        Self(((origin_slot as u64) << 32) | seq as u64)
    }

    pub fn origin_slot(self) -> u8 {
        (self.0 >> 32) as u8
    }

    pub fn seq(self) -> u32 {
        self.0 as u32
    }
}

/// Moves along a path at constant speed
#[derive(Debug, Clone, Copy)]
pub struct PathFollower {
    pub path: PathId,
    pub distance: f32,
    pub speed: f32,
    pub end: EndOfPath,
}

impl PathFollower {
    pub fn new(path: PathId, speed: f32, end: EndOfPath) -> Self {
        Self {
            path,
            distance: 0.0,
            speed,
            end,
        }
    }
}

/// Which player's play space the entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub u8);

/// World transform, written by the path follower system
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub pos: Vec3,
    pub rot: Quat,
}

impl Transform {
    pub fn new(pos: Vec3, rot: Quat) -> Self {
        Self { pos, rot }
    }
}
