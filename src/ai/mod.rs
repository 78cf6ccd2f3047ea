// NEXUS game master: prompt composition, Gemini gateway, and response
// normalization with deterministic fallbacks.

pub mod gateway;
pub mod normalize;
pub mod prompt;

pub use gateway::{GatewayError, NexusClient};
pub use normalize::{
    chat_from, difficulty_from, narration_from, ChatReply, DifficultyProfile, GameEvent,
    NarrationResult,
};
pub use prompt::{ChatTurn, GameSnapshot, PlayerStatsSummary};
