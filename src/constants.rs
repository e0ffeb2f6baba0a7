//! Constants for the refrain resurfacing engine
//!
//! Every numeric design decision lives here so the scoring formulas read
//! symbolically.

// Default weight profile

/// Default weight for staleness-of-play in the base score.
pub const DEFAULT_PLAY_WEIGHT: f64 = 0.5;

/// Default weight for staleness-of-like in the base score.
pub const DEFAULT_LIKE_WEIGHT: f64 = 0.3;

/// Default weight for the skip penalty in the base score.
pub const DEFAULT_SKIP_WEIGHT: f64 = 0.2;

// Signal normalization

/// Day count at which play/like staleness saturates at 1.0.
pub const STALENESS_HORIZON_DAYS: f64 = 365.0;

/// Penalty contributed per recorded skip, saturating at 1.0.
pub const SKIP_PENALTY_STEP: f64 = 0.1;

// Boost mechanics

/// Amount added to a boost on each `keep` action.
pub const BOOST_STEP: f64 = 0.1;

/// Upper clamp on an accumulated boost amount.
pub const BOOST_MAX: f64 = 1.0;

/// Decay scale in days for the boost contribution (`exp(-age_days / 14)`).
pub const BOOST_DECAY_DAYS: f64 = 14.0;

// Snooze mechanics

/// Length in days of a snooze suppression window.
pub const SNOOZE_WINDOW_DAYS: f64 = 14.0;

// Tag blending

/// Multiplicative score bonus contributed by each validated mood tag.
pub const TAG_BLEND_STEP: f64 = 0.05;

/// Tag count beyond which the blend factor stops growing.
pub const TAG_BLEND_MAX_TAGS: usize = 3;

// Ranking

/// Number of entries a preview returns when no limit is given.
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

// Time conversion

/// Milliseconds per day, for converting timestamp deltas to day ages.
pub const MS_PER_DAY: f64 = 86_400_000.0;
