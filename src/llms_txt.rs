// LLM-friendly documentation endpoint content.

pub const LLMS_TXT: &str = r#"# SERPENT API
> Backend for SERPENT, a neon cyberpunk snake game with an AI game master (NEXUS).

## API Base URL
/api/

## Authentication
Bearer token (JWT from /api/auth/login, /api/auth/register, or /api/auth/google)

## Key Endpoints
- GET /api/health - Service status; `ai` reports whether NEXUS is configured
- POST /api/narrate - Game snapshot -> dramatic narration + optional game event
- POST /api/chat - Chat with NEXUS in game context
- POST /api/difficulty - Player stats -> adaptive difficulty profile
- POST /api/auth/register - Create account (username/password)
- POST /api/auth/login - Get JWT token
- POST /api/auth/google - Login with a Google ID token
- GET /api/auth/me - Get current user info
- PUT /api/auth/profile - Update name/country/avatar
- POST /api/scores - Submit a finished run's score (auth required)
- GET /api/leaderboard - Top players, optional ?country= filter
- GET /metrics - Prometheus metrics

## Notes
The AI endpoints always answer 200. When the model is unavailable or
returns something unusable, a fixed in-character fallback is served
instead; clients never see an upstream failure.
"#;
