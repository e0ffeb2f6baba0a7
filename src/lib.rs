//! Refrain: staleness-driven track resurfacing
//!
//! Ranks tracks for resurfacing to a listener by combining a deterministic
//! staleness-based score with optional AI-derived mood tags that adjust the
//! score. The engine owns all mutable state (weight profiles, boosts,
//! snoozes, tag entries) and exposes a small caller-facing surface: `score`,
//! `keep`, `snooze`, `preview`, `tag`, `score_ai`, `preview_ai`.
//!
//! This library provides a programmatic API for embedding into other
//! applications plus a small demo binary; presentation, configuration, and
//! any network surface belong to the caller.

pub mod constants;
pub mod llm;
pub mod models;
pub mod scoring;
pub mod store;
pub mod tagging;

// Re-export main types for convenience
pub use llm::GeminiClient;
pub use models::{MoodTag, ScoreResult, Track, TrackId, User, UserId};
pub use scoring::ScoringEngine;
pub use tagging::{LlmClient, LlmError, TagOutcome};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
