use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            role        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS feedback (
            id                INTEGER PRIMARY KEY,
            manager_id        INTEGER NOT NULL REFERENCES users(id),
            employee_id       INTEGER NOT NULL REFERENCES users(id),
            strengths         TEXT NOT NULL,
            improvements      TEXT NOT NULL,
            sentiment         TEXT NOT NULL,
            timestamp         TEXT NOT NULL,
            acknowledged      INTEGER NOT NULL DEFAULT 0,
            anonymous         INTEGER NOT NULL DEFAULT 0,
            employee_comment  TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_feedback_manager
            ON feedback(manager_id, timestamp);

        CREATE INDEX IF NOT EXISTS idx_feedback_employee
            ON feedback(employee_id, timestamp);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
