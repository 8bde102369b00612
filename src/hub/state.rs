//! Registry and room index: the state guarded by the hub lock.
//!
//! [`HubState`] has no interior synchronization; [`super::Hub`] wraps it in
//! a single `RwLock`, so each method runs inside one critical section.
//!
//! # Invariants
//!
//! - Every id in a room or in the user index is present in `clients`.
//! - No room and no user entry is ever empty; the last removal prunes it.
//! - `Client::rooms` mirrors the room index, so unregister only touches the
//!   rooms the connection actually joined.

use std::collections::{HashMap, HashSet};

use crate::domain::{Audience, Connection, ConnectionId, RoomKey, UserId};
use crate::error::HubError;

#[derive(Debug)]
struct Client {
    conn: Connection,
    rooms: HashSet<RoomKey>,
}

/// Registry, room index, and user index.
#[derive(Debug, Default)]
pub struct HubState {
    clients: HashMap<ConnectionId, Client>,
    rooms: HashMap<RoomKey, HashSet<ConnectionId>>,
    users: HashMap<UserId, HashSet<ConnectionId>>,
}

impl HubState {
    /// Admits a connection.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::AlreadyRegistered`] if a connection with the same
    /// id is already present. The rejected handle is dropped, which closes
    /// its queue.
    pub fn register(&mut self, conn: Connection) -> Result<(), HubError> {
        let id = conn.id();
        if self.clients.contains_key(&id) {
            return Err(HubError::AlreadyRegistered(id));
        }
        self.users.entry(conn.user_id()).or_default().insert(id);
        self.clients.insert(
            id,
            Client {
                conn,
                rooms: HashSet::new(),
            },
        );
        Ok(())
    }

    /// Removes a connection from the registry and from every room it joined.
    ///
    /// Returns the routing half (its queue closes when it is dropped), or
    /// `None` if the connection was not registered.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Connection> {
        let client = self.clients.remove(&id)?;
        for key in &client.rooms {
            remove_member(&mut self.rooms, key, id);
        }
        remove_member(&mut self.users, &client.conn.user_id(), id);
        Some(client.conn)
    }

    /// Adds a registered connection to a room, creating the room if absent.
    /// Returns `true` if the connection was not already a member.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotRegistered`] for an unknown connection; the
    /// index is left untouched.
    pub fn join(&mut self, key: RoomKey, id: ConnectionId) -> Result<bool, HubError> {
        let client = self
            .clients
            .get_mut(&id)
            .ok_or(HubError::NotRegistered(id))?;
        if !client.rooms.insert(key) {
            return Ok(false);
        }
        self.rooms.entry(key).or_default().insert(id);
        Ok(true)
    }

    /// Removes a connection from a room, pruning the room if it empties.
    /// Unknown rooms and connections are a no-op returning `false`.
    pub fn leave(&mut self, key: RoomKey, id: ConnectionId) -> bool {
        let Some(client) = self.clients.get_mut(&id) else {
            return false;
        };
        if !client.rooms.remove(&key) {
            return false;
        }
        remove_member(&mut self.rooms, &key, id);
        true
    }

    /// Resolves the connections an audience addresses. Unknown rooms and
    /// users resolve to nobody.
    #[must_use]
    pub fn recipients(&self, audience: &Audience) -> Vec<&Connection> {
        let ids = match audience {
            Audience::Channel(_) | Audience::Workspace(_) => {
                audience.room_key().and_then(|key| self.rooms.get(&key))
            }
            Audience::User(user_id) => self.users.get(user_id),
            Audience::Global => {
                return self.clients.values().map(|c| &c.conn).collect();
            }
        };
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.clients.get(id).map(|c| &c.conn))
                .collect()
        })
        .unwrap_or_default()
    }

    /// Number of registered connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.clients.len()
    }

    /// Number of non-empty rooms.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of distinct users with at least one connection.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[cfg(test)]
    pub(crate) fn room_members(&self, key: &RoomKey) -> HashSet<ConnectionId> {
        self.rooms.get(key).cloned().unwrap_or_default()
    }
}

/// Removes `id` from the set under `key`, deleting the key once empty.
fn remove_member<K>(index: &mut HashMap<K, HashSet<ConnectionId>>, key: &K, id: ConnectionId)
where
    K: std::hash::Hash + Eq,
{
    if let Some(members) = index.get_mut(key) {
        members.remove(&id);
        if members.is_empty() {
            index.remove(key);
        }
    }
}
