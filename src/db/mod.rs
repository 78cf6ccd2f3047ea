// Database access layer (SQLite via sqlx).

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub google_id: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub country: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Score {
    pub id: i64,
    pub user_id: i64,
    pub score: i64,
    pub level: i64,
    pub created_at: String,
}

/// One leaderboard row: a player ranked by their best run.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub name: String,
    pub country: String,
    pub avatar_url: Option<String>,
    pub high_score: i64,
    pub total_score: i64,
}

pub struct Database {
    pool: SqlitePool,
}

const USER_COLUMNS: &str =
    "id, username, google_id, password_hash, name, email, avatar_url, country, created_at";

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE,
                google_id TEXT UNIQUE,
                password_hash TEXT,
                name TEXT NOT NULL,
                email TEXT,
                avatar_url TEXT,
                country TEXT NOT NULL DEFAULT 'GLOBAL',
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                score INTEGER NOT NULL,
                level INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_scores_user ON scores(user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────────────

    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        name: &str,
        country: &str,
    ) -> Result<User, sqlx::Error> {
        let row = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, name, country) VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}",
        ))
        .bind(username)
        .bind(password_hash)
        .bind(name)
        .bind(country)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Create or refresh a Google-authenticated user, keyed by the stable
    /// `sub` claim from the verified ID token.
    pub async fn upsert_google_user(
        &self,
        google_id: &str,
        name: &str,
        email: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let existing = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_id = ?"
        ))
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await?;

        let row = if let Some(user) = existing {
            sqlx::query_as::<_, User>(&format!(
                "UPDATE users SET name = ?, avatar_url = COALESCE(?, avatar_url) WHERE id = ? RETURNING {USER_COLUMNS}"
            ))
            .bind(name)
            .bind(avatar_url)
            .bind(user.id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, User>(&format!(
                "INSERT INTO users (google_id, name, email, avatar_url) VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}"
            ))
            .bind(google_id)
            .bind(name)
            .bind(email)
            .bind(avatar_url)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(row)
    }

    /// Update profile fields; `None` leaves the stored value untouched.
    pub async fn update_profile(
        &self,
        id: i64,
        name: Option<&str>,
        country: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET name = COALESCE(?, name), country = COALESCE(?, country), avatar_url = COALESCE(?, avatar_url) WHERE id = ?",
        )
        .bind(name)
        .bind(country)
        .bind(avatar_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_user(id).await
    }

    // ── Scores ────────────────────────────────────────────────────────

    pub async fn add_score(
        &self,
        user_id: i64,
        score: i64,
        level: i64,
    ) -> Result<Score, sqlx::Error> {
        let row = sqlx::query_as::<_, Score>(
            "INSERT INTO scores (user_id, score, level) VALUES (?, ?, ?) RETURNING id, user_id, score, level, created_at",
        )
        .bind(user_id)
        .bind(score)
        .bind(level)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Top players by best single run. `country` of `None` or `GLOBAL`
    /// ranks worldwide.
    pub async fn leaderboard(
        &self,
        country: Option<&str>,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        let rows = match country.filter(|c| !c.is_empty() && *c != "GLOBAL") {
            Some(country) => {
                sqlx::query_as::<_, LeaderboardEntry>(
                    r#"
                    SELECT u.name, u.country, u.avatar_url,
                           MAX(s.score) AS high_score, SUM(s.score) AS total_score
                    FROM scores s
                    JOIN users u ON s.user_id = u.id
                    WHERE u.country = ?
                    GROUP BY s.user_id
                    ORDER BY high_score DESC
                    LIMIT ?
                "#,
                )
                .bind(country)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, LeaderboardEntry>(
                    r#"
                    SELECT u.name, u.country, u.avatar_url,
                           MAX(s.score) AS high_score, SUM(s.score) AS total_score
                    FROM scores s
                    JOIN users u ON s.user_id = u.id
                    GROUP BY s.user_id
                    ORDER BY high_score DESC
                    LIMIT ?
                "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }
}
