/// Which part a peer plays in a session. Fixed once resolved: the
/// authority computes game state, followers mirror it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Authority,
    Follower,
}

impl Role {
    /// Derive the role from session membership order. The solo player or
    /// the first joiner drives the simulation; re-deriving always gives
    /// the same answer.
    pub fn resolve(multiplayer: bool, first_joiner: bool) -> Role {
        if !multiplayer || first_joiner {
            Role::Authority
        } else {
            Role::Follower
        }
    }

    pub fn is_authority(self) -> bool {
        matches!(self, Role::Authority)
    }

    /// Player slot this peer occupies: the authority is always slot 0
    pub fn slot(self) -> u8 {
        match self {
            Role::Authority => 0,
            Role::Follower => 1,
        }
    }
}
