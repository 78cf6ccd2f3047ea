// Decision normalizer: maps every gateway outcome onto one of the three
// fixed response shapes. Total functions -- no input, however malformed,
// produces anything but a fully-populated, displayable value.

use serde::{Deserialize, Serialize};

use super::gateway::GatewayError;

// ── Response shapes ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrationResult {
    pub narration: String,
    pub event: Option<GameEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub subtype: EventSubtype,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SpawnObstacle,
    SpawnPowerup,
    SpeedChange,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSubtype {
    Wall,
    Mine,
    SpeedBoost,
    Shield,
    Shrink,
    Multiplier,
    Slow,
    Fast,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyProfile {
    pub speed: f64,
    pub obstacle_density: f64,
    pub powerup_frequency: f64,
    pub commentary: String,
}

// ── Fallback table ───────────────────────────────────────────────────

/// Narration served when no credential is provisioned.
pub const NARRATION_OFFLINE: &str = "The Serpent slithers onward through the neon void...";
/// Narration served when a call was attempted and failed, or its output
/// did not parse.
pub const NARRATION_DISRUPTED: &str = "Static crackles across the grid... the Serpent endures.";

pub const CHAT_OFFLINE: &str = "NEXUS is offline. The Serpent is on its own, Runner.";
pub const CHAT_DISRUPTED: &str = "Signal disrupted... try again, Runner.";

pub const DIFFICULTY_OFFLINE_COMMENTARY: &str = "Default parameters engaged.";
pub const DIFFICULTY_DISRUPTED_COMMENTARY: &str = "System recalibrating...";

impl NarrationResult {
    fn fallback(narration: &str) -> Self {
        NarrationResult {
            narration: narration.to_string(),
            event: None,
        }
    }
}

impl DifficultyProfile {
    fn fallback(commentary: &str) -> Self {
        DifficultyProfile {
            speed: 7.0,
            obstacle_density: 0.3,
            powerup_frequency: 0.5,
            commentary: commentary.to_string(),
        }
    }
}

// ── Raw upstream shapes ──────────────────────────────────────────────
//
// Parsed leniently (optional subtype/message) so that a "none" event can
// be collapsed before the strict public shape is built. Unknown type or
// subtype tags fail the parse and take the disrupted fallback.

#[derive(Deserialize)]
struct RawNarration {
    narration: String,
    #[serde(default)]
    event: Option<RawEvent>,
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: EventKind,
    #[serde(default)]
    subtype: Option<EventSubtype>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct RawDifficulty {
    speed: f64,
    obstacle_density: f64,
    powerup_frequency: f64,
    #[serde(default)]
    commentary: String,
}

// ── Normalizers ──────────────────────────────────────────────────────

/// Narrate: parse the gateway text as JSON narration. A "none" event or
/// an event missing its subtype collapses to the null event; the
/// narration text survives.
pub fn narration_from(outcome: Result<String, GatewayError>) -> NarrationResult {
    let text = match outcome {
        Ok(text) => text,
        Err(GatewayError::Unconfigured) => return NarrationResult::fallback(NARRATION_OFFLINE),
        Err(e) => {
            tracing::warn!("Narration call failed: {e}");
            return NarrationResult::fallback(NARRATION_DISRUPTED);
        }
    };

    let raw: RawNarration = match serde_json::from_str(&text) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Unparsable narration from model: {e}");
            return NarrationResult::fallback(NARRATION_DISRUPTED);
        }
    };

    if raw.narration.trim().is_empty() {
        tracing::warn!("Model returned empty narration text");
        return NarrationResult::fallback(NARRATION_DISRUPTED);
    }

    let event = raw.event.and_then(|e| {
        if e.kind == EventKind::None {
            return None;
        }
        e.subtype.map(|subtype| GameEvent {
            kind: e.kind,
            subtype,
            message: e.message.unwrap_or_default(),
        })
    });

    NarrationResult {
        narration: raw.narration,
        event,
    }
}

/// Chat: the model's raw text is the reply, no JSON involved.
pub fn chat_from(outcome: Result<String, GatewayError>) -> ChatReply {
    let reply = match outcome {
        Ok(text) => text,
        Err(GatewayError::Unconfigured) => CHAT_OFFLINE.to_string(),
        Err(e) => {
            tracing::warn!("Chat call failed: {e}");
            CHAT_DISRUPTED.to_string()
        }
    };
    ChatReply { reply }
}

/// Difficulty: parse the gateway text as a profile and clamp each numeric
/// field into its documented range. The commentary distinguishes a failed
/// call from an unconfigured gateway.
pub fn difficulty_from(outcome: Result<String, GatewayError>) -> DifficultyProfile {
    let text = match outcome {
        Ok(text) => text,
        Err(GatewayError::Unconfigured) => {
            return DifficultyProfile::fallback(DIFFICULTY_OFFLINE_COMMENTARY)
        }
        Err(e) => {
            tracing::warn!("Difficulty call failed: {e}");
            return DifficultyProfile::fallback(DIFFICULTY_DISRUPTED_COMMENTARY);
        }
    };

    let raw: RawDifficulty = match serde_json::from_str(&text) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Unparsable difficulty profile from model: {e}");
            return DifficultyProfile::fallback(DIFFICULTY_DISRUPTED_COMMENTARY);
        }
    };

    DifficultyProfile {
        speed: raw.speed.clamp(4.0, 15.0),
        obstacle_density: raw.obstacle_density.clamp(0.1, 0.8),
        powerup_frequency: raw.powerup_frequency.clamp(0.2, 0.8),
        commentary: raw.commentary,
    }
}
