// Prompt composition for the NEXUS game master. Pure data-to-text
// rendering: every function here is deterministic in its input.

use serde::Deserialize;

/// Fixed persona prefixed to every instruction sent to the model.
pub const GAME_MASTER_PERSONA: &str = "You are NEXUS, the AI Game Master of SERPENT — a neon-drenched, \
cyberpunk snake game. You are dramatic, witty, and slightly menacing. You speak in short, \
punchy sentences. Think of a mix between a sports commentator, a dungeon master, and a \
cyberpunk hacker. You refer to the player as \"Runner\" and the snake as \"the Serpent\".\n\
Keep responses SHORT — max 2 sentences for narration, max 3 for chat.";

// ── Request snapshots ────────────────────────────────────────────────

/// Per-request summary of the running game. Never persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSnapshot {
    pub score: u32,
    pub length: u32,
    pub level: u32,
    pub deaths: u32,
    pub active_powerups: Vec<String>,
    pub recent_events: Vec<String>,
    pub time_alive: f64,
}

impl Default for GameSnapshot {
    fn default() -> Self {
        GameSnapshot {
            score: 0,
            length: 3,
            level: 1,
            deaths: 0,
            active_powerups: Vec::new(),
            recent_events: Vec::new(),
            time_alive: 0.0,
        }
    }
}

/// A player chat message plus the abbreviated game context it was sent in.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    pub message: String,
    #[serde(default)]
    pub score: u32,
    #[serde(default = "default_length")]
    pub length: u32,
    #[serde(default)]
    pub deaths: u32,
}

fn default_length() -> u32 {
    3
}

/// Aggregated player statistics, computed by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerStatsSummary {
    pub avg_score: f64,
    pub deaths: u32,
    pub avg_length: f64,
    pub play_time: f64,
}

impl Default for PlayerStatsSummary {
    fn default() -> Self {
        PlayerStatsSummary {
            avg_score: 0.0,
            deaths: 0,
            avg_length: 3.0,
            play_time: 0.0,
        }
    }
}

// ── Templates ────────────────────────────────────────────────────────

/// Render a string list as its literal contents, `[]` when empty.
fn render_list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

/// Instruction for the narrate endpoint. The event rules (probability,
/// power-up bias for beginners, tone shifts) are instructions to the
/// model, not logic enforced here.
pub fn narration_prompt(state: &GameSnapshot) -> String {
    format!(
        "{persona}\n\n\
         Based on this game state, provide dramatic narration and optionally \
         generate a game event. Respond in JSON format ONLY:\n\
         {{\n\
         \x20 \"narration\": \"Short dramatic commentary about what's happening (max 2 sentences)\",\n\
         \x20 \"event\": null or {{\n\
         \x20   \"type\": \"spawn_obstacle\" | \"spawn_powerup\" | \"speed_change\" | \"none\",\n\
         \x20   \"subtype\": \"wall\" | \"mine\" | \"speed_boost\" | \"shield\" | \"shrink\" | \"multiplier\" | \"slow\" | \"fast\",\n\
         \x20   \"message\": \"Short dramatic announcement of the event\"\n\
         \x20 }}\n\
         }}\n\n\
         Game state:\n\
         - Score: {score}\n\
         - Snake Length: {length}\n\
         - Level: {level}\n\
         - Deaths this session: {deaths}\n\
         - Active power-ups: {powerups}\n\
         - Recent events: {events}\n\
         - Time alive: {time_alive}s\n\n\
         Rules for events:\n\
         - Only generate events ~40% of the time, return null otherwise\n\
         - Use spawn_powerup more often than spawn_obstacle for beginners (score < 20)\n\
         - Increase obstacle frequency as score climbs\n\
         - If player just died, be encouraging\n\
         - If player is doing well, be dramatically impressed then raise the stakes",
        persona = GAME_MASTER_PERSONA,
        score = state.score,
        length = state.length,
        level = state.level,
        deaths = state.deaths,
        powerups = render_list(&state.active_powerups),
        events = render_list(&state.recent_events),
        time_alive = state.time_alive,
    )
}

/// Instruction for the chat endpoint.
pub fn chat_prompt(turn: &ChatTurn) -> String {
    format!(
        "{persona}\n\n\
         The player (Runner) says: \"{message}\"\n\n\
         Current game context:\n\
         - Score: {score}\n\
         - Snake Length: {length}\n\
         - Deaths: {deaths}\n\n\
         Respond in character as NEXUS. Be dramatic, witty, and helpful if they ask for tips.\n\
         Keep your response to 1-3 sentences. If they ask for a hint, give a vague but useful one.",
        persona = GAME_MASTER_PERSONA,
        message = turn.message,
        score = turn.score,
        length = turn.length,
        deaths = turn.deaths,
    )
}

/// Instruction for the difficulty endpoint.
pub fn difficulty_prompt(stats: &PlayerStatsSummary) -> String {
    format!(
        "{persona}\n\n\
         Based on these player statistics, return difficulty settings as JSON ONLY:\n\
         {{\n\
         \x20 \"speed\": <number 4-15, where 4=slow 15=very fast>,\n\
         \x20 \"obstacle_density\": <number 0.1-0.8, chance of obstacles>,\n\
         \x20 \"powerup_frequency\": <number 0.2-0.8, chance of powerups>,\n\
         \x20 \"commentary\": \"One sentence about the difficulty adjustment\"\n\
         }}\n\n\
         Player stats:\n\
         - Average score: {avg_score}\n\
         - Total deaths: {deaths}\n\
         - Average snake length: {avg_length}\n\
         - Total play time: {play_time}s\n\n\
         Rules:\n\
         - New players (deaths>3, avg_score<10): be gentle, speed 4-6, lots of powerups\n\
         - Average players: balanced, speed 7-10\n\
         - Skilled players (avg_score>50, avg_length>15): challenge them, speed 10-15",
        persona = GAME_MASTER_PERSONA,
        avg_score = stats.avg_score,
        deaths = stats.deaths,
        avg_length = stats.avg_length,
        play_time = stats.play_time,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_renders_documented_values() {
        let prompt = narration_prompt(&GameSnapshot::default());
        assert!(prompt.contains("Score: 0"));
        assert!(prompt.contains("Snake Length: 3"));
        assert!(prompt.contains("Level: 1"));
        assert!(prompt.contains("Deaths this session: 0"));
        assert!(prompt.contains("Active power-ups: []"));
        assert!(prompt.contains("Recent events: []"));
        assert!(prompt.contains("Time alive: 0s"));
    }

    #[test]
    fn test_narration_prompt_starts_with_persona() {
        let prompt = narration_prompt(&GameSnapshot::default());
        assert!(prompt.starts_with(GAME_MASTER_PERSONA));
    }

    #[test]
    fn test_powerup_list_rendered_literally() {
        let state = GameSnapshot {
            active_powerups: vec!["shield".to_string(), "multiplier".to_string()],
            ..GameSnapshot::default()
        };
        let prompt = narration_prompt(&state);
        assert!(prompt.contains("Active power-ups: [shield, multiplier]"));
    }

    #[test]
    fn test_chat_prompt_embeds_message_and_context() {
        let turn = ChatTurn {
            message: "give me a hint".to_string(),
            score: 42,
            length: 10,
            deaths: 2,
        };
        let prompt = chat_prompt(&turn);
        assert!(prompt.contains("The player (Runner) says: \"give me a hint\""));
        assert!(prompt.contains("Score: 42"));
        assert!(prompt.contains("Snake Length: 10"));
        assert!(prompt.contains("Deaths: 2"));
    }

    #[test]
    fn test_difficulty_prompt_defaults() {
        let prompt = difficulty_prompt(&PlayerStatsSummary::default());
        assert!(prompt.contains("Average score: 0"));
        assert!(prompt.contains("Total deaths: 0"));
        assert!(prompt.contains("Average snake length: 3"));
        assert!(prompt.contains("Total play time: 0s"));
    }

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let state: GameSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(state.score, 0);
        assert_eq!(state.length, 3);
        assert_eq!(state.level, 1);
        assert!(state.active_powerups.is_empty());

        let turn: ChatTurn = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(turn.length, 3);
        assert_eq!(turn.deaths, 0);
    }
}
