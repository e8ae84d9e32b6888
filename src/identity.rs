//! Player identity persistence
//!
//! Remembers the name a player plays under for a limited number of days,
//! similar to a browser cookie with an expiry date.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use crate::{
    constants,
    storage::{Error, KeyValueStore},
};

/// Stored form of a player identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The player's name
    pub name: String,
    /// Moment after which the name is no longer valid
    pub expires_at: SystemTime,
}

impl Identity {
    /// Whether the identity is still valid at `now`
    pub fn is_live_at(&self, now: SystemTime) -> bool {
        now < self.expires_at
    }
}

/// Adapter storing the player identity under a single key
#[derive(Debug, Clone)]
pub struct IdentityStore<S> {
    store: S,
}

impl<S: KeyValueStore> IdentityStore<S> {
    /// Wraps a key-value store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the stored player name, or `None` if absent or expired
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read or holds an
    /// undecodable value.
    pub fn get(&self) -> Result<Option<String>, Error> {
        self.get_at(SystemTime::now())
    }

    /// Same as [`IdentityStore::get`], evaluated at a given instant
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read or holds an
    /// undecodable value.
    pub fn get_at(&self, now: SystemTime) -> Result<Option<String>, Error> {
        let Some(raw) = self.store.get(constants::identity::KEY)? else {
            return Ok(None);
        };
        let identity: Identity = serde_json::from_str(&raw)?;

        Ok((identity.is_live_at(now) && !identity.name.is_empty()).then_some(identity.name))
    }

    /// Stores `name` for `ttl_days` days from now
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written.
    pub fn set(&self, name: &str, ttl_days: u32) -> Result<(), Error> {
        let ttl = Duration::from_secs(u64::from(ttl_days) * constants::identity::SECONDS_PER_DAY);
        self.write(&Identity {
            name: name.to_owned(),
            expires_at: SystemTime::now() + ttl,
        })
    }

    /// Forgets the stored name immediately
    ///
    /// The key is overwritten with an empty, already expired identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be written.
    pub fn clear(&self) -> Result<(), Error> {
        self.write(&Identity {
            name: String::new(),
            expires_at: SystemTime::UNIX_EPOCH,
        })
    }

    fn write(&self, identity: &Identity) -> Result<(), Error> {
        self.store
            .set(constants::identity::KEY, &serde_json::to_string(identity)?)
    }
}
