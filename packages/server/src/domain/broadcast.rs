//! Fan-out rules: which members of a room receive which kind of message.

use std::collections::HashSet;

use super::{entity::Room, value_object::ConnectionId};

/// Kinds of room-scoped messages that are fanned out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastKind {
    /// Motion values from an input client
    MotionInput,
    /// Tempo change asserted by an output client
    TempoChange,
    /// Beat pulse asserted by an output client
    BeatSync,
    /// Beat schedule announced for observers
    ScheduleBeat,
    /// Full room snapshot after a join, leave or subscription
    MembershipChange,
}

/// Select the recipients of a message of `kind` sent by `sender`.
///
/// `subscribers` is the subscription set kept for the room's name.
///
/// | kind | recipients |
/// |---|---|
/// | `MotionInput` | output clients and subscribers |
/// | `TempoChange`, `BeatSync` | every member except the sender |
/// | `ScheduleBeat` | subscribers |
/// | `MembershipChange` | every member, sender included |
pub fn fan_out(
    room: &Room,
    subscribers: Option<&HashSet<ConnectionId>>,
    kind: BroadcastKind,
    sender: Option<&ConnectionId>,
) -> Vec<ConnectionId> {
    let not_sender = |connection: &&ConnectionId| Some(*connection) != sender;
    let subscribers = subscribers.into_iter().flatten();

    match kind {
        BroadcastKind::MotionInput => room
            .output_clients
            .keys()
            .chain(subscribers)
            .filter(not_sender)
            .copied()
            .collect(),
        BroadcastKind::TempoChange | BroadcastKind::BeatSync => room
            .participants()
            .chain(subscribers)
            .filter(not_sender)
            .copied()
            .collect(),
        BroadcastKind::ScheduleBeat => subscribers.filter(not_sender).copied().collect(),
        BroadcastKind::MembershipChange => room.participants().chain(subscribers).copied().collect(),
    }
}
