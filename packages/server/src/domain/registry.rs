//! Room registry: membership, identity and beat authority for every room.
//!
//! The registry is a plain owned structure. Callers serialize access to it
//! (the in-memory repository keeps it behind one mutex), so every operation
//! here runs to completion against a consistent view of all rooms.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::{
    broadcast::{BroadcastKind, fan_out},
    entity::{
        BeatState, BeatSyncOutcome, Departure, JoinOutcome, Room, RoomSnapshot, RoomUpdate,
        TempoChange,
    },
    error::RepositoryError,
    value_object::{Bpm, ClientRole, ConnectionId, RoomName, UserId},
};

/// Hands out process-wide, monotonically increasing user IDs.
///
/// IDs are never reclaimed, even after the connection that held one leaves.
#[derive(Debug, Clone)]
pub struct UserIdAllocator {
    next: u64,
}

impl UserIdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> UserId {
        let id = UserId::new(self.next);
        self.next += 1;
        id
    }
}

impl Default for UserIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// All rooms known to the coordinator
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    rooms: HashMap<RoomName, Room>,
    /// Subscription sets by room name; they outlive the room they watch
    subscribers: HashMap<RoomName, HashSet<ConnectionId>>,
    user_ids: UserIdAllocator,
    default_bpm: Bpm,
}

impl RoomRegistry {
    pub fn new(default_bpm: Bpm) -> Self {
        Self {
            rooms: HashMap::new(),
            subscribers: HashMap::new(),
            user_ids: UserIdAllocator::new(),
            default_bpm,
        }
    }

    pub fn room(&self, name: &RoomName) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of connections subscribed to `name`, whether or not the room exists
    pub fn subscription_count(&self, name: &RoomName) -> usize {
        self.subscribers.get(name).map_or(0, HashSet::len)
    }

    /// Join `name` as an input or output client, creating the room if needed.
    ///
    /// The first output client of a room without a beat starts one, at
    /// `bpm` or the registry default.
    pub fn join_room(
        &mut self,
        connection: ConnectionId,
        name: RoomName,
        role: ClientRole,
        bpm: Option<Bpm>,
        now: f64,
    ) -> JoinOutcome {
        let default_bpm = self.default_bpm;
        let user_id = self.user_ids.allocate();
        let room = self
            .rooms
            .entry(name.clone())
            .or_insert_with(|| Room::new(name));

        match role {
            ClientRole::Input => {
                room.input_clients.insert(connection, user_id);
            }
            ClientRole::Output => {
                if room.beat.is_none() {
                    room.beat = Some(BeatState::new(bpm.unwrap_or(default_bpm), now));
                }
                room.output_clients.insert(connection, user_id);
            }
        }

        JoinOutcome {
            user_id,
            update: Self::membership_update(room, self.subscribers.get(&room.name), now),
        }
    }

    /// Attach `connection` as a subscriber of `name`, creating the room (without a beat) if needed
    pub fn subscribe(&mut self, connection: ConnectionId, name: RoomName, now: f64) -> RoomUpdate {
        self.subscribers
            .entry(name.clone())
            .or_default()
            .insert(connection);
        let room = self
            .rooms
            .entry(name.clone())
            .or_insert_with(|| Room::new(name));
        Self::membership_update(room, self.subscribers.get(&room.name), now)
    }

    /// Detach `connection` from one room, as participant or subscriber
    pub fn leave_room(
        &mut self,
        connection: &ConnectionId,
        name: &RoomName,
        now: f64,
    ) -> Result<Departure, RepositoryError> {
        let participant = self
            .rooms
            .get(name)
            .is_some_and(|room| room.contains(connection));
        if participant || self.is_subscribed(connection, name) {
            return Ok(self.depart(connection, name, now));
        }

        if self.rooms.contains_key(name) || self.subscribers.contains_key(name) {
            Err(RepositoryError::NotAMember(name.to_string()))
        } else {
            Err(RepositoryError::RoomNotFound(name.to_string()))
        }
    }

    /// Detach `connection` from every room and subscription it holds
    pub fn disconnect(&mut self, connection: &ConnectionId, now: f64) -> Vec<Departure> {
        let names: BTreeSet<RoomName> = self
            .rooms
            .values()
            .filter(|room| room.contains(connection))
            .map(|room| room.name.clone())
            .chain(
                self.subscribers
                    .iter()
                    .filter(|(_, set)| set.contains(connection))
                    .map(|(name, _)| name.clone()),
            )
            .collect();

        names
            .iter()
            .map(|name| self.depart(connection, name, now))
            .collect()
    }

    fn is_subscribed(&self, connection: &ConnectionId, name: &RoomName) -> bool {
        self.subscribers
            .get(name)
            .is_some_and(|set| set.contains(connection))
    }

    /// Remove `connection` from `name`; a room left without input and output clients is dropped
    fn depart(&mut self, connection: &ConnectionId, name: &RoomName, now: f64) -> Departure {
        if let Some(set) = self.subscribers.get_mut(name) {
            set.remove(connection);
            if set.is_empty() {
                self.subscribers.remove(name);
            }
        }

        let Some(room) = self.rooms.get_mut(name) else {
            return Departure {
                room_name: name.clone(),
                session_ended: false,
                update: None,
            };
        };
        let was_active = room.is_active();
        room.remove_connection(connection);

        if room.is_active() {
            return Departure {
                room_name: name.clone(),
                session_ended: false,
                update: Some(Self::membership_update(room, self.subscribers.get(name), now)),
            };
        }

        self.rooms.remove(name);
        Departure {
            room_name: name.clone(),
            session_ended: was_active,
            update: None,
        }
    }

    /// Apply a tempo change asserted by `sender`; returns who must hear about it
    pub fn apply_tempo_change(
        &mut self,
        sender: &ConnectionId,
        name: &RoomName,
        change: TempoChange,
    ) -> Result<Vec<ConnectionId>, RepositoryError> {
        let room = Self::live_beat_room(&mut self.rooms, name)?;
        if let Some(beat) = room.beat.as_mut() {
            beat.apply_tempo_change(&change);
        }
        room.last_tempo_change = Some(change);
        Ok(fan_out(
            room,
            self.subscribers.get(name),
            BroadcastKind::TempoChange,
            Some(sender),
        ))
    }

    /// Overwrite the beat anchor of `name` with the pulse asserted by `sender`
    pub fn sync_beat(
        &mut self,
        sender: &ConnectionId,
        name: &RoomName,
        beat_number: i64,
        beat_timestamp: f64,
    ) -> Result<BeatSyncOutcome, RepositoryError> {
        let room = Self::live_beat_room(&mut self.rooms, name)?;
        let Some(beat) = room.beat.as_mut() else {
            return Err(RepositoryError::BeatNotRunning(name.to_string()));
        };
        beat.sync_beat(beat_number, beat_timestamp);
        let bpm = beat.bpm;
        Ok(BeatSyncOutcome {
            bpm,
            recipients: fan_out(
                room,
                self.subscribers.get(name),
                BroadcastKind::BeatSync,
                Some(sender),
            ),
        })
    }

    /// Recipients of a motion message sent to `name`
    pub fn motion_targets(
        &self,
        sender: &ConnectionId,
        name: &RoomName,
    ) -> Result<Vec<ConnectionId>, RepositoryError> {
        let room = self.existing_room(name)?;
        Ok(fan_out(
            room,
            self.subscribers.get(name),
            BroadcastKind::MotionInput,
            Some(sender),
        ))
    }

    /// Recipients of a beat schedule sent to `name`
    pub fn schedule_beat_targets(
        &self,
        sender: &ConnectionId,
        name: &RoomName,
    ) -> Result<Vec<ConnectionId>, RepositoryError> {
        let room = self.existing_room(name)?;
        Ok(fan_out(
            room,
            self.subscribers.get(name),
            BroadcastKind::ScheduleBeat,
            Some(sender),
        ))
    }

    pub fn snapshot(&self, name: &RoomName, now: f64) -> Option<RoomSnapshot> {
        self.rooms
            .get(name)
            .map(|room| room.snapshot(self.subscription_count(name), now))
    }

    /// Snapshots of all rooms, sorted by room name
    pub fn snapshots(&self, now: f64) -> Vec<RoomSnapshot> {
        let mut snapshots: Vec<RoomSnapshot> = self
            .rooms
            .values()
            .map(|room| room.snapshot(self.subscription_count(&room.name), now))
            .collect();
        snapshots.sort_by(|a, b| a.room_name.cmp(&b.room_name));
        snapshots
    }

    fn existing_room(&self, name: &RoomName) -> Result<&Room, RepositoryError> {
        self.rooms
            .get(name)
            .ok_or_else(|| RepositoryError::RoomNotFound(name.to_string()))
    }

    fn live_beat_room<'a>(
        rooms: &'a mut HashMap<RoomName, Room>,
        name: &RoomName,
    ) -> Result<&'a mut Room, RepositoryError> {
        match rooms.get_mut(name) {
            Some(room) if room.beat.is_some() => Ok(room),
            Some(_) => Err(RepositoryError::BeatNotRunning(name.to_string())),
            None => Err(RepositoryError::RoomNotFound(name.to_string())),
        }
    }

    fn membership_update(
        room: &Room,
        subscribers: Option<&HashSet<ConnectionId>>,
        now: f64,
    ) -> RoomUpdate {
        RoomUpdate {
            snapshot: room.snapshot(subscribers.map_or(0, HashSet::len), now),
            recipients: fan_out(room, subscribers, BroadcastKind::MembershipChange, None),
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(Bpm::DEFAULT)
    }
}
