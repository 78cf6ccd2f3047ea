// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database URL (SQLite connection string).
    pub database_url: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Gemini API key. `None` means the NEXUS gateway is unconfigured and
    /// every AI endpoint serves its static fallback.
    pub gemini_api_key: Option<String>,
    /// Gemini model identifier.
    pub gemini_model: String,
    /// Google OAuth client ID for ID-token verification.
    pub google_client_id: Option<String>,
    /// Directory containing the pre-built frontend to serve.
    /// When set, unknown paths fall back to the SPA's index.html.
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite connection string (default: `sqlite:serpent.db?mode=rwc`)
    /// - `PORT` - HTTP server port (default: 8000)
    /// - `GEMINI_API_KEY` - Gemini credential; unset or empty disables the gateway
    /// - `GEMINI_MODEL` - Model identifier (default: `gemini-2.0-flash`)
    /// - `GOOGLE_CLIENT_ID` - OAuth client ID; unset disables Google login
    /// - `STATIC_DIR` - Path to frontend dist directory for static file serving
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:serpent.db?mode=rwc".to_string());

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(&args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| std::env::var("PORT").ok().and_then(|v| v.parse().ok()))
            .unwrap_or(8000);

        // An empty GEMINI_API_KEY counts as unconfigured.
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        let google_client_id = std::env::var("GOOGLE_CLIENT_ID")
            .ok()
            .filter(|id| !id.is_empty());

        let static_dir = std::env::var("STATIC_DIR").ok().map(PathBuf::from);

        Config {
            database_url,
            port,
            gemini_api_key,
            gemini_model,
            google_client_id,
            static_dir,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
