//! Core data models for the refrain resurfacing engine
//!
//! Records here mirror the engine's stores one-to-one: a weight profile per
//! user, a boost or snooze per (user, track) pair, and a tag entry per track.
//! All timestamps are wall-clock `DateTime<Utc>` supplied by the caller so
//! that decay and suppression stay deterministic under test.

use crate::constants::{
    BOOST_DECAY_DAYS, BOOST_MAX, BOOST_STEP, DEFAULT_LIKE_WEIGHT, DEFAULT_PLAY_WEIGHT,
    DEFAULT_SKIP_WEIGHT, MS_PER_DAY, SNOOZE_WINDOW_DAYS, TAG_BLEND_MAX_TAGS, TAG_BLEND_STEP,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for users
pub type UserId = String;

/// Opaque identifier for tracks
pub type TrackId = String;

/// A listener
///
/// Equality is by `id` alone; `name` and `email` are display attributes and
/// never participate in scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

/// A track in the listener's library
///
/// `energy` and `valence` are producer-trusted values in [0, 1] and are not
/// re-validated here. Day counts are non-negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique identifier
    pub id: TrackId,
    pub title: String,
    pub artist: String,

    /// Unavailable tracks are never surfaced and always score 0.
    pub available: bool,

    /// Tempo in BPM
    pub tempo: f64,
    /// Perceived intensity, 0..1
    pub energy: f64,
    /// Perceived positivity, 0..1
    pub valence: f64,

    /// Days since the track was last played
    pub last_played_days_ago: f64,
    /// Days since the track was liked
    pub liked_days_ago: f64,
    /// How many times the listener skipped this track
    pub num_skipped: u32,
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

/// Closed vocabulary of mood labels a tag entry may carry
///
/// Anything the collaborator returns outside this set is dropped during
/// validation, including case variants; parsing is exact-string only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTag {
    Upbeat,
    Energetic,
    Mellow,
    Chill,
    Melancholic,
    Dark,
    Bright,
}

impl MoodTag {
    /// Every allowed label, in prompt order.
    pub const ALL: [MoodTag; 7] = [
        MoodTag::Upbeat,
        MoodTag::Energetic,
        MoodTag::Mellow,
        MoodTag::Chill,
        MoodTag::Melancholic,
        MoodTag::Dark,
        MoodTag::Bright,
    ];

    /// The wire/prompt form of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodTag::Upbeat => "upbeat",
            MoodTag::Energetic => "energetic",
            MoodTag::Mellow => "mellow",
            MoodTag::Chill => "chill",
            MoodTag::Melancholic => "melancholic",
            MoodTag::Dark => "dark",
            MoodTag::Bright => "bright",
        }
    }

    /// Parse a label, accepting only literal members of the vocabulary.
    pub fn parse(s: &str) -> Option<MoodTag> {
        MoodTag::ALL.iter().copied().find(|tag| tag.as_str() == s)
    }
}

impl fmt::Display for MoodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user scoring weights
///
/// Created lazily with fixed defaults on a user's first score request; at
/// most one profile per user, never deleted. There is no update path in this
/// version. Personalizing weights is out of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub user_id: UserId,
    /// Weight for staleness-of-play
    pub play_weight: f64,
    /// Weight for staleness-of-like
    pub like_weight: f64,
    /// Weight for the skip penalty
    pub skip_weight: f64,
}

impl WeightProfile {
    /// Build the default profile for a user.
    pub fn defaults_for(user_id: UserId) -> Self {
        Self {
            user_id,
            play_weight: DEFAULT_PLAY_WEIGHT,
            like_weight: DEFAULT_LIKE_WEIGHT,
            skip_weight: DEFAULT_SKIP_WEIGHT,
        }
    }
}

/// A positive score adjustment from a `keep` action, decaying over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    pub user_id: UserId,
    pub track_id: TrackId,
    /// Accumulated amount in (0, 1]
    pub amount: f64,
    /// When the boost was created or last reinforced
    pub updated_at: DateTime<Utc>,
}

impl Boost {
    /// Create a fresh boost at the initial step amount.
    pub fn new(user_id: UserId, track_id: TrackId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            track_id,
            amount: BOOST_STEP,
            updated_at: now,
        }
    }

    /// Apply another `keep`: raise the amount one step, clamped at the cap,
    /// and restart the decay clock.
    pub fn reinforce(&mut self, now: DateTime<Utc>) {
        self.amount = (self.amount + BOOST_STEP).min(BOOST_MAX);
        self.updated_at = now;
    }

    /// Age of the boost in fractional days at `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        (now - self.updated_at).num_milliseconds() as f64 / MS_PER_DAY
    }

    /// Contribution to a score at `now`: `amount * exp(-age_days / 14)`.
    ///
    /// A freshly kept track gets nearly the full amount; the contribution
    /// fades toward zero over a few weeks.
    pub fn decayed_amount(&self, now: DateTime<Utc>) -> f64 {
        self.amount * (-self.age_days(now) / BOOST_DECAY_DAYS).exp()
    }
}

/// A temporary suppression window from a `snooze` action
///
/// Snoozes are append-only: repeated snoozing produces multiple records, and
/// suppression holds while *any* record's window is still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snooze {
    pub user_id: UserId,
    pub track_id: TrackId,
    /// Start of the 14-day suppression window
    pub snoozed_at: DateTime<Utc>,
}

impl Snooze {
    /// Whether the suppression window is still open at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        let days = (now - self.snoozed_at).num_milliseconds() as f64 / MS_PER_DAY;
        days < SNOOZE_WINDOW_DAYS
    }
}

/// Validated AI mood tags for a track, latest-wins
///
/// Keyed by track only, not per user. The stored tag list is whatever
/// survived validation; the blend factor caps its effect at three tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagEntry {
    pub track_id: TrackId,
    /// Validated subset of the mood vocabulary
    pub tags: Vec<MoodTag>,
    /// Short free-text justification from the collaborator
    pub rationale: String,
    /// When the entry was last written
    pub updated_at: DateTime<Utc>,
}

impl TagEntry {
    /// Multiplicative score adjustment: 5% per tag, at most three tags.
    pub fn blend_factor(&self) -> f64 {
        1.0 + self.tags.len().min(TAG_BLEND_MAX_TAGS) as f64 * TAG_BLEND_STEP
    }
}

/// A scored track with a human-readable rationale
///
/// Derived and transient; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub track: Track,
    pub score: f64,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_mood_tag_parse_is_exact() {
        assert_eq!(MoodTag::parse("upbeat"), Some(MoodTag::Upbeat));
        assert_eq!(MoodTag::parse("melancholic"), Some(MoodTag::Melancholic));

        // Case variants and unknown labels are rejected, not coerced
        assert_eq!(MoodTag::parse("Upbeat"), None);
        assert_eq!(MoodTag::parse("UPBEAT"), None);
        assert_eq!(MoodTag::parse("happy"), None);
        assert_eq!(MoodTag::parse(""), None);
    }

    #[test]
    fn test_mood_tag_round_trip() {
        for tag in MoodTag::ALL {
            assert_eq!(MoodTag::parse(tag.as_str()), Some(tag));
        }
    }

    #[test]
    fn test_boost_reinforce_steps_and_caps() {
        let t = now();
        let mut boost = Boost::new("u1".to_string(), "t1".to_string(), t);
        assert!((boost.amount - 0.1).abs() < 1e-12);

        boost.reinforce(t);
        assert!((boost.amount - 0.2).abs() < 1e-12);

        for _ in 0..18 {
            boost.reinforce(t);
        }
        assert_eq!(boost.amount, 1.0); // clamped, not 2.0
    }

    #[test]
    fn test_boost_decay_monotonic() {
        let t = now();
        let boost = Boost::new("u1".to_string(), "t1".to_string(), t);

        let fresh = boost.decayed_amount(t);
        let day1 = boost.decayed_amount(t + Duration::days(1));
        let day28 = boost.decayed_amount(t + Duration::days(28));

        assert!((fresh - 0.1).abs() < 1e-12); // exp(0) = 1
        assert!(day1 < fresh);
        assert!(day28 < day1);
    }

    #[test]
    fn test_snooze_window() {
        let t = now();
        let snooze = Snooze {
            user_id: "u1".to_string(),
            track_id: "t1".to_string(),
            snoozed_at: t,
        };

        assert!(snooze.is_active(t));
        assert!(snooze.is_active(t + Duration::days(13)));
        assert!(!snooze.is_active(t + Duration::days(14)));
        assert!(!snooze.is_active(t + Duration::days(30)));
    }

    #[test]
    fn test_blend_factor_caps_at_three_tags() {
        let entry = |tags: Vec<MoodTag>| TagEntry {
            track_id: "t1".to_string(),
            tags,
            rationale: "r".to_string(),
            updated_at: now(),
        };

        assert!((entry(vec![]).blend_factor() - 1.0).abs() < 1e-12);
        assert!((entry(vec![MoodTag::Chill]).blend_factor() - 1.05).abs() < 1e-12);
        assert!(
            (entry(vec![MoodTag::Chill, MoodTag::Dark, MoodTag::Bright]).blend_factor() - 1.15)
                .abs()
                < 1e-12
        );
        // Beyond three tags the factor stops growing
        assert!(
            (entry(vec![
                MoodTag::Chill,
                MoodTag::Dark,
                MoodTag::Bright,
                MoodTag::Mellow,
                MoodTag::Upbeat,
            ])
            .blend_factor()
                - 1.15)
                .abs()
                < 1e-12
        );
    }

    #[test]
    fn test_identity_equality_by_id() {
        let a = User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
        };
        let b = User {
            id: "u1".to_string(),
            name: "Different".to_string(),
            email: "other@example.com".to_string(),
        };
        assert_eq!(a, b);
    }
}
