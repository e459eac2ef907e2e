use thiserror::Error;

/// Faults surfaced to the user-facing layer. Every fault is local to
/// this peer; nothing here propagates across the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Join rejected: the room is full or already in play. The display
    /// text is shown to the user; a fresh attempt has to come from them.
    #[error("failed to join a room due to a network error, please try again")]
    RoomUnavailable,

    #[error("the transport refused the broadcast")]
    LinkClosed,

    #[error("deterrents can only be sent in multiplayer")]
    NotMultiplayer,

    #[error("no deterrents left to send")]
    OutOfDeterrents,

    #[error("only the authority may originate this")]
    NotAuthority,

    #[error("not allowed in the current phase")]
    WrongPhase,
}
