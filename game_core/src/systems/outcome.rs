use std::cmp::Ordering;

use crate::resources::PlayerSlot;

/// Result of a finished session from one player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
    Tie,
    /// Single-player: no opponent to compare against, just the score
    SoloScore(i32),
}

/// Compare the final slot state the way the in-world scoreboard does:
/// a departed opponent is an automatic win, otherwise health decides,
/// then score, then a tie.
pub fn resolve_outcome(
    slots: &[PlayerSlot; 2],
    active_players: usize,
    multiplayer: bool,
    local: usize,
    other: usize,
) -> Outcome {
    if !multiplayer {
        return Outcome::SoloScore(slots[local].score);
    }
    if active_players < 2 {
        return Outcome::Win;
    }
    match slots[local].health.cmp(&slots[other].health) {
        Ordering::Greater => Outcome::Win,
        Ordering::Less => Outcome::Lose,
        Ordering::Equal => match slots[local].score.cmp(&slots[other].score) {
            Ordering::Greater => Outcome::Win,
            Ordering::Less => Outcome::Lose,
            Ordering::Equal => Outcome::Tie,
        },
    }
}
