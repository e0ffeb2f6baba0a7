//! In-memory stores backing the scoring engine
//!
//! One store per record kind, each exposing only the operations the engine
//! needs. All stores are owned by the engine instance and live exactly as
//! long as it does; there is no persistence or expiry beyond the logical
//! decay applied at scoring time.

use crate::models::{Boost, Snooze, TagEntry, TrackId, UserId, WeightProfile};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Per-user weight profiles, lazily created with defaults
#[derive(Debug, Default)]
pub struct WeightProfileStore {
    profiles: HashMap<UserId, WeightProfile>,
}

impl WeightProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a user's profile, inserting the defaults on first access.
    ///
    /// This is the only mutation path: profiles are never updated or deleted.
    pub fn get_or_create(&mut self, user_id: &UserId) -> &WeightProfile {
        if !self.profiles.contains_key(user_id) {
            tracing::debug!(user = %user_id, "creating default weight profile");
            self.profiles.insert(
                user_id.clone(),
                WeightProfile::defaults_for(user_id.clone()),
            );
        }
        &self.profiles[user_id]
    }
}

/// Boost records keyed by (user, track), at most one per key
#[derive(Debug, Default)]
pub struct BoostStore {
    boosts: HashMap<(UserId, TrackId), Boost>,
}

impl BoostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a `keep`: reinforce the existing boost in place, or insert a
    /// fresh one at the initial step amount.
    ///
    /// There is no removal path: boosts persist and fade through decay at
    /// scoring time rather than being deleted.
    pub fn apply(&mut self, user_id: &UserId, track_id: &TrackId, now: DateTime<Utc>) {
        let key = (user_id.clone(), track_id.clone());
        match self.boosts.get_mut(&key) {
            Some(boost) => {
                boost.reinforce(now);
                tracing::debug!(user = %user_id, track = %track_id, amount = boost.amount, "reinforced boost");
            }
            None => {
                self.boosts
                    .insert(key, Boost::new(user_id.clone(), track_id.clone(), now));
                tracing::debug!(user = %user_id, track = %track_id, "created boost");
            }
        }
    }

    /// Pure lookup used by the scoring engine.
    pub fn find(&self, user_id: &UserId, track_id: &TrackId) -> Option<&Boost> {
        self.boosts.get(&(user_id.clone(), track_id.clone()))
    }
}

/// Snooze records keyed by (user, track), append-only
///
/// Repeated snoozing accumulates records; suppression is "any window still
/// open", not last-wins.
#[derive(Debug, Default)]
pub struct SnoozeStore {
    snoozes: HashMap<(UserId, TrackId), Vec<Snooze>>,
}

impl SnoozeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snooze window starting at `at`. Always appends.
    pub fn apply(&mut self, user_id: &UserId, track_id: &TrackId, at: DateTime<Utc>) {
        tracing::debug!(user = %user_id, track = %track_id, at = %at, "snoozed track");
        self.snoozes
            .entry((user_id.clone(), track_id.clone()))
            .or_default()
            .push(Snooze {
                user_id: user_id.clone(),
                track_id: track_id.clone(),
                snoozed_at: at,
            });
    }

    /// Any record whose 14-day window is still open at `now`.
    pub fn find_active(
        &self,
        user_id: &UserId,
        track_id: &TrackId,
        now: DateTime<Utc>,
    ) -> Option<&Snooze> {
        self.snoozes
            .get(&(user_id.clone(), track_id.clone()))?
            .iter()
            .find(|snooze| snooze.is_active(now))
    }
}

/// AI tag entries keyed by track, latest-wins
#[derive(Debug, Default)]
pub struct TagStore {
    entries: HashMap<TrackId, TagEntry>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for the track, or insert if absent.
    pub fn upsert(&mut self, entry: TagEntry) {
        tracing::debug!(track = %entry.track_id, tags = entry.tags.len(), "upserting tag entry");
        self.entries.insert(entry.track_id.clone(), entry);
    }

    pub fn find(&self, track_id: &TrackId) -> Option<&TagEntry> {
        self.entries.get(track_id)
    }
}
