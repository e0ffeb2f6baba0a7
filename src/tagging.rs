//! Mood tagging orchestrator
//!
//! Bridges the scoring engine to an external language-model collaborator.
//! The flow is three-phase: build the prompt (pure), await the collaborator
//! (the only suspension point in the engine), then parse/validate/store the
//! result (pure). Every failure degrades to a safe default: a collaborator
//! error never propagates to the caller and never clobbers a previously
//! stored tag entry.

use crate::models::{MoodTag, TagEntry, Track, User};
use crate::scoring::ScoringEngine;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Rationale substituted when the collaborator omits one or returns a
/// non-string value.
const FALLBACK_RATIONALE: &str = "No rationale.";

/// Rationale reported when the collaborator call itself fails.
const ERROR_RATIONALE: &str = "LLM error.";

/// Errors a language-model collaborator call can surface
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network communication error (includes timeouts)
    #[error("network error: {0}")]
    Network(String),

    /// The API returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The API answered but carried no usable text
    #[error("empty response from model")]
    EmptyResponse,
}

/// The language-model collaborator boundary
///
/// A single opaque operation: one prompt in, one raw text response out. No
/// retry, no streaming. The engine treats any error, including a timeout
/// raised by the client's own machinery, as a generic call failure.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn execute(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Validated result of a tagging call
#[derive(Debug, Clone, PartialEq)]
pub struct TagOutcome {
    /// Tags that survived vocabulary validation, in response order
    pub tags: Vec<MoodTag>,
    pub rationale: String,
}

impl TagOutcome {
    fn llm_error() -> Self {
        Self {
            tags: Vec::new(),
            rationale: ERROR_RATIONALE.to_string(),
        }
    }
}

impl ScoringEngine {
    /// Ask the collaborator for mood tags and fold the validated result into
    /// the tag store, timestamped `now`.
    ///
    /// On collaborator failure this returns the fixed empty outcome and
    /// leaves any prior tag entry for the track untouched. A syntactically
    /// salvageable response (JSON buried in surrounding text) is recovered;
    /// anything else degrades to an empty tag set with the fallback
    /// rationale, which *is* stored, since the call itself succeeded.
    pub async fn tag(
        &mut self,
        user: &User,
        track: &Track,
        llm: &dyn LlmClient,
        now: DateTime<Utc>,
    ) -> TagOutcome {
        let prompt = build_tag_prompt(track);

        tracing::debug!(user = %user.id, track = %track.id, "requesting mood tags");
        let raw = match llm.execute(&prompt).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(track = %track.id, %error, "tag request failed");
                return TagOutcome::llm_error();
            }
        };

        let outcome = parse_tag_response(&raw);
        tracing::debug!(track = %track.id, tags = ?outcome.tags, "validated mood tags");

        self.tags.upsert(TagEntry {
            track_id: track.id.clone(),
            tags: outcome.tags.clone(),
            rationale: outcome.rationale.clone(),
            updated_at: now,
        });

        outcome
    }
}

/// Build the tagging prompt for a track.
///
/// Names the closed vocabulary, preference rules keyed on the audio signals,
/// and a strict JSON output contract with format examples.
fn build_tag_prompt(track: &Track) -> String {
    let vocabulary = MoodTag::ALL
        .iter()
        .map(|tag| tag.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You label the MOOD/VIBE of a single song.

ALLOWED_TAGS (choose only from this list):
{vocabulary}

RULES:
- If energy >= 0.6 AND valence >= 0.6, prefer {{upbeat, energetic, bright}}. Avoid melancholic/dark unless audio contradicts.
- If energy >= 0.6 AND valence <= 0.4, prefer {{energetic, dark}}. Avoid bright.
- If uncertain, return exactly 1 best tag.

TASK:
- Pick 1-3 tags from ALLOWED_TAGS that best describe the song's vibe.
- If you have more than 3 to describe a song, please pick the best 3.
- If uncertain, pick exactly 1 tag (your best guess).
- Write a SHORT rationale (<= 160 characters). Do not mention this limit explicitly.

INPUT:
- Title: "{title}"
- Artist: "{artist}"
- Audio: tempo={tempo} bpm, energy={energy}, valence={valence}

OUTPUT (STRICT):
Return ONLY a JSON object (no markdown, no extra text) with exactly these keys:
{{
  "tags": ["tag1","tag2"],
  "rationale": "short reason"
}}

EXAMPLES (for format only):
GOOD:
{{"tags":["upbeat","bright"],"rationale":"Fast feel and cheerful tone."}}
BAD:
I think it's upbeat.
{{"labels":["upbeat"]}}
{{"tags":["happy"]}}"#,
        title = track.title,
        artist = track.artist,
        tempo = track.tempo,
        energy = track.energy,
        valence = track.valence,
    )
}

/// Parse and validate a raw collaborator response.
///
/// Tries strict JSON first, then the first balanced `{...}` substring, then
/// gives up and treats the response as an empty object. Tags outside the
/// vocabulary, case variants, and duplicates are dropped silently; a missing
/// or non-string rationale falls back to a fixed string.
fn parse_tag_response(raw: &str) -> TagOutcome {
    let parsed: serde_json::Value = serde_json::from_str(raw)
        .ok()
        .or_else(|| {
            extract_json_object(raw).and_then(|candidate| serde_json::from_str(candidate).ok())
        })
        .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

    let mut tags = Vec::new();
    if let Some(raw_tags) = parsed.get("tags").and_then(|value| value.as_array()) {
        for value in raw_tags {
            if let Some(tag) = value.as_str().and_then(MoodTag::parse) {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
    }

    let rationale = parsed
        .get("rationale")
        .and_then(|value| value.as_str())
        .unwrap_or(FALLBACK_RATIONALE)
        .to_string();

    TagOutcome { tags, rationale }
}

/// Locate the first balanced `{...}` substring, skipping braces inside JSON
/// string literals.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Track {
        Track {
            id: "t1".to_string(),
            title: "Night Drive".to_string(),
            artist: "The Examples".to_string(),
            available: true,
            tempo: 128.0,
            energy: 0.8,
            valence: 0.3,
            last_played_days_ago: 10.0,
            liked_days_ago: 20.0,
            num_skipped: 0,
        }
    }

    #[test]
    fn test_prompt_names_vocabulary_and_audio() {
        let prompt = build_tag_prompt(&track());

        for tag in MoodTag::ALL {
            assert!(prompt.contains(tag.as_str()), "missing tag {tag}");
        }
        assert!(prompt.contains("Night Drive"));
        assert!(prompt.contains("The Examples"));
        assert!(prompt.contains("tempo=128 bpm, energy=0.8, valence=0.3"));
        assert!(prompt.contains("Return ONLY a JSON object"));
    }

    #[test]
    fn test_parse_clean_json() {
        let outcome =
            parse_tag_response(r#"{"tags":["upbeat","bright"],"rationale":"Fast and cheerful."}"#);
        assert_eq!(outcome.tags, vec![MoodTag::Upbeat, MoodTag::Bright]);
        assert_eq!(outcome.rationale, "Fast and cheerful.");
    }

    #[test]
    fn test_parse_recovers_json_from_markdown_fence() {
        let raw = "```json\n{\"tags\":[\"dark\"],\"rationale\":\"Brooding synths.\"}\n```";
        let outcome = parse_tag_response(raw);
        assert_eq!(outcome.tags, vec![MoodTag::Dark]);
        assert_eq!(outcome.rationale, "Brooding synths.");
    }

    #[test]
    fn test_parse_recovers_json_from_surrounding_prose() {
        let raw = r#"Sure! Here is the result: {"tags":["chill"],"rationale":"Laid back groove."} Hope that helps."#;
        let outcome = parse_tag_response(raw);
        assert_eq!(outcome.tags, vec![MoodTag::Chill]);
    }

    #[test]
    fn test_extraction_ignores_braces_inside_strings() {
        let raw = r#"noise {"tags":["mellow"],"rationale":"quiet {not a brace} end"} trailing"#;
        let outcome = parse_tag_response(raw);
        assert_eq!(outcome.tags, vec![MoodTag::Mellow]);
        assert_eq!(outcome.rationale, "quiet {not a brace} end");
    }

    #[test]
    fn test_parse_drops_unknown_case_variant_and_duplicate_tags() {
        let raw = r#"{"tags":["upbeat","Upbeat","happy","upbeat","dark"],"rationale":"mixed"}"#;
        let outcome = parse_tag_response(raw);
        assert_eq!(outcome.tags, vec![MoodTag::Upbeat, MoodTag::Dark]);
    }

    #[test]
    fn test_parse_non_string_rationale_falls_back() {
        let outcome = parse_tag_response(r#"{"tags":["chill"],"rationale":42}"#);
        assert_eq!(outcome.rationale, FALLBACK_RATIONALE);
        assert_eq!(outcome.tags, vec![MoodTag::Chill]);
    }

    #[test]
    fn test_parse_unsalvageable_response_degrades_to_empty() {
        let outcome = parse_tag_response("I think it's upbeat.");
        assert!(outcome.tags.is_empty());
        assert_eq!(outcome.rationale, FALLBACK_RATIONALE);
    }

    #[test]
    fn test_parse_wrong_shapes() {
        // Valid JSON but not an object
        assert!(parse_tag_response(r#"["upbeat"]"#).tags.is_empty());
        // Object with the wrong key
        assert!(parse_tag_response(r#"{"labels":["upbeat"]}"#).tags.is_empty());
        // tags present but not an array
        assert!(parse_tag_response(r#"{"tags":"upbeat"}"#).tags.is_empty());
    }

    #[test]
    fn test_extract_json_object_unbalanced() {
        assert_eq!(extract_json_object("{\"tags\": [\"chill\""), None);
        assert_eq!(extract_json_object("no braces at all"), None);
    }
}
