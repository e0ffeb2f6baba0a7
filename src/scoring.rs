//! Scoring engine and ranked preview
//!
//! Combines the staleness signals, per-user weights, boost decay, and snooze
//! suppression into a single score per (user, track), then sorts and
//! truncates for presentation. Every operation takes `now` explicitly; the
//! engine never reads the wall clock itself, which keeps decay and
//! suppression deterministic under test.

use crate::constants::{DEFAULT_PREVIEW_LIMIT, SKIP_PENALTY_STEP, STALENESS_HORIZON_DAYS};
use crate::models::{ScoreResult, Track, User};
use crate::store::{BoostStore, SnoozeStore, TagStore, WeightProfileStore};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// The resurfacing engine
///
/// Owns all mutable state exclusively: weight profiles, boosts, snoozes, and
/// tag entries. Store mutations are single-step and atomic with respect to
/// each other; the only suspension point is the collaborator call inside
/// [`tag`](ScoringEngine::tag), which takes `&mut self` and therefore
/// serializes concurrent callers by construction.
#[derive(Debug, Default)]
pub struct ScoringEngine {
    pub(crate) weights: WeightProfileStore,
    pub(crate) boosts: BoostStore,
    pub(crate) snoozes: SnoozeStore,
    pub(crate) tags: TagStore,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score a track for a user at `now`.
    ///
    /// Unavailable tracks score 0. Otherwise the score is a weighted sum of
    /// three normalized signals (staleness of play, staleness of like, skip
    /// penalty), plus the decayed boost contribution if one exists. An
    /// active snooze overrides everything to 0 (suppression wins over
    /// boosting. The result has no artificial ceiling.
    pub fn score(&mut self, user: &User, track: &Track, now: DateTime<Utc>) -> f64 {
        if !track.available {
            return 0.0;
        }

        let weights = self.weights.get_or_create(&user.id);

        let stale_play = (track.last_played_days_ago / STALENESS_HORIZON_DAYS).min(1.0);
        let stale_like = (track.liked_days_ago / STALENESS_HORIZON_DAYS).min(1.0);
        let skip_penalty = (track.num_skipped as f64 * SKIP_PENALTY_STEP).min(1.0);

        let mut score = weights.play_weight * stale_play
            + weights.like_weight * stale_like
            + weights.skip_weight * skip_penalty;

        if let Some(boost) = self.boosts.find(&user.id, &track.id) {
            score += boost.decayed_amount(now);
        }

        if self.snoozes.find_active(&user.id, &track.id, now).is_some() {
            return 0.0;
        }

        score
    }

    /// Score with the AI tag blend applied.
    ///
    /// Identity when the track is untagged; otherwise the base score times
    /// the entry's blend factor (5% per tag, capped at three tags).
    pub fn score_ai(&mut self, user: &User, track: &Track, now: DateTime<Utc>) -> f64 {
        let base = self.score(user, track, now);
        match self.tags.find(&track.id) {
            Some(entry) => base * entry.blend_factor(),
            None => base,
        }
    }

    /// Record a `keep` action: create or reinforce the boost for this pair.
    pub fn keep(&mut self, user: &User, track: &Track, now: DateTime<Utc>) {
        self.boosts.apply(&user.id, &track.id, now);
    }

    /// Record a `snooze` action: open a 14-day suppression window.
    ///
    /// The window starts at `until` when given, otherwise at `now`.
    pub fn snooze(
        &mut self,
        user: &User,
        track: &Track,
        until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        self.snoozes.apply(&user.id, &track.id, until.unwrap_or(now));
    }

    /// Rank tracks by manual score, highest first, truncated to `limit`
    /// (default 10). Ties keep their original relative order.
    pub fn preview(
        &mut self,
        user: &User,
        tracks: &[Track],
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Vec<ScoreResult> {
        let mut rows: Vec<ScoreResult> = tracks
            .iter()
            .map(|track| ScoreResult {
                score: self.score(user, track, now),
                rationale: manual_rationale(track),
                track: track.clone(),
            })
            .collect();

        sort_descending(&mut rows);
        rows.truncate(limit.unwrap_or(DEFAULT_PREVIEW_LIMIT));
        rows
    }

    /// Rank tracks by AI-blended score, highest first, truncated to `limit`
    /// (default 10). Rationales report the base score, the tag set (or an
    /// explicit no-tags marker), and the blended score.
    pub fn preview_ai(
        &mut self,
        user: &User,
        tracks: &[Track],
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Vec<ScoreResult> {
        let mut rows: Vec<ScoreResult> = tracks
            .iter()
            .map(|track| {
                let base = self.score(user, track, now);
                let (blended, tags_desc) = match self.tags.find(&track.id) {
                    Some(entry) => {
                        let joined = entry
                            .tags
                            .iter()
                            .map(|tag| tag.as_str())
                            .collect::<Vec<_>>()
                            .join(", ");
                        (base * entry.blend_factor(), format!("[{joined}]"))
                    }
                    None => (base, "none".to_string()),
                };
                ScoreResult {
                    score: blended,
                    rationale: format!("ai: base={base:.3}, tags={tags_desc} -> {blended:.3}"),
                    track: track.clone(),
                }
            })
            .collect();

        sort_descending(&mut rows);
        rows.truncate(limit.unwrap_or(DEFAULT_PREVIEW_LIMIT));
        rows
    }
}

/// Stable descending sort by score. Signals and weights are finite, so the
/// comparison never actually sees NaN.
fn sort_descending(rows: &mut [ScoreResult]) {
    rows.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

fn manual_rationale(track: &Track) -> String {
    let stale_play = (track.last_played_days_ago / STALENESS_HORIZON_DAYS).min(1.0);
    let stale_like = (track.liked_days_ago / STALENESS_HORIZON_DAYS).min(1.0);
    format!(
        "manual: stale_play={stale_play:.2}, stale_like={stale_like:.2}, skips={}",
        track.num_skipped
    )
}
