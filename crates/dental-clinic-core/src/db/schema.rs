//! SQLite schema definition.

/// Token store schema. One row at most: a client holds one session.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS auth_tokens (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    token TEXT NOT NULL CHECK (length(token) > 0),
    refresh_token TEXT,
    username TEXT,
    issued_at TEXT,                              -- RFC 3339
    expires_at TEXT,                             -- RFC 3339
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_single_session_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute("INSERT INTO auth_tokens (id, token) VALUES (2, 'abc')", []);
        assert!(result.is_err());

        let result = conn.execute("INSERT INTO auth_tokens (id, token) VALUES (1, '')", []);
        assert!(result.is_err());

        let result = conn.execute("INSERT INTO auth_tokens (id, token) VALUES (1, 'abc')", []);
        assert!(result.is_ok());
    }
}
