use game_core::NetId;

/// Per-player prefabs whose network ids every peer must know
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisteredKind {
    Player,
    Basket,
    ShadowBasket,
    Tombstone,
}

impl RegisteredKind {
    pub fn index(self) -> u8 {
        match self {
            RegisteredKind::Player => 0,
            RegisteredKind::Basket => 1,
            RegisteredKind::ShadowBasket => 2,
            RegisteredKind::Tombstone => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(RegisteredKind::Player),
            1 => Some(RegisteredKind::Basket),
            2 => Some(RegisteredKind::ShadowBasket),
            3 => Some(RegisteredKind::Tombstone),
            _ => None,
        }
    }
}

/// Replicated id registry. Registration is last-writer-wins, so replays
/// and duplicate deliveries settle on the same mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedIds {
    entries: [[Option<NetId>; 2]; 4],
}

impl SharedIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: RegisteredKind, slot: u8, id: NetId) {
        if let Some(entry) = self.entries[kind.index() as usize].get_mut(slot as usize) {
            *entry = Some(id);
        }
    }

    pub fn get(&self, kind: RegisteredKind, slot: u8) -> Option<NetId> {
        self.entries[kind.index() as usize]
            .get(slot as usize)
            .copied()
            .flatten()
    }
}
