//! Session token persistence.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::AuthToken;

fn parse_time(column: &'static str, value: Option<String>) -> DbResult<Option<DateTime<Utc>>> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| DbError::Corrupt {
                    column,
                    message: e.to_string(),
                })
        })
        .transpose()
}

impl Database {
    /// Store the token, replacing any previous session.
    pub fn save_token(&self, token: &AuthToken) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO auth_tokens (
                id, token, refresh_token, username, issued_at, expires_at, saved_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, datetime('now'))
            "#,
            params![
                token.token,
                token.refresh_token,
                token.username,
                token.issued_at.map(|t| t.to_rfc3339()),
                token.expires_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        tracing::info!(username = ?token.username, "Session token stored");
        Ok(())
    }

    /// The stored token, if a session exists.
    pub fn current_token(&self) -> DbResult<Option<AuthToken>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT token, refresh_token, username, issued_at, expires_at
                FROM auth_tokens
                WHERE id = 1
                "#,
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((token, refresh_token, username, issued_at, expires_at)) = row else {
            return Ok(None);
        };
        Ok(Some(AuthToken {
            token,
            refresh_token,
            username,
            issued_at: parse_time("issued_at", issued_at)?,
            expires_at: parse_time("expires_at", expires_at)?,
        }))
    }

    /// Remove the session. Returns whether a token was stored.
    pub fn clear_tokens(&self) -> DbResult<bool> {
        let removed = self.conn.execute("DELETE FROM auth_tokens", [])?;
        tracing::info!(removed, "Session token cleared");
        Ok(removed > 0)
    }
}
