use crate::Database;
use crate::models::{FeedbackListRow, FeedbackRow, NewFeedback, UserRow};
use anyhow::Result;
use rusqlite::Connection;

/// Equality filters for feedback scans. `ascending` false orders newest
/// first.
#[derive(Debug, Default)]
pub struct FeedbackFilter {
    pub manager_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub acknowledged: Option<bool>,
    pub ascending: bool,
}

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, password_hash: &str, role: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, role) VALUES (?1, ?2, ?3)",
                (username, password_hash, role),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", [username]))
    }

    pub fn get_user_by_username_and_role(&self, username: &str, role: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1 AND role = ?2", [username, role]))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", [id]))
    }

    // -- Feedback --

    pub fn insert_feedback(&self, new: &NewFeedback) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO feedback (manager_id, employee_id, strengths, improvements,
                                       sentiment, timestamp, acknowledged, anonymous)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
                rusqlite::params![
                    new.manager_id,
                    new.employee_id,
                    new.strengths,
                    new.improvements,
                    new.sentiment,
                    new.timestamp,
                    new.anonymous,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_feedback(&self, id: i64) -> Result<Option<FeedbackRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, manager_id, employee_id, strengths, improvements, sentiment,
                        timestamp, acknowledged, anonymous, employee_comment
                 FROM feedback WHERE id = ?1",
            )?;

            stmt.query_row([id], |row| {
                Ok(FeedbackRow {
                    id: row.get(0)?,
                    manager_id: row.get(1)?,
                    employee_id: row.get(2)?,
                    strengths: row.get(3)?,
                    improvements: row.get(4)?,
                    sentiment: row.get(5)?,
                    timestamp: row.get(6)?,
                    acknowledged: row.get(7)?,
                    anonymous: row.get(8)?,
                    employee_comment: row.get(9)?,
                })
            })
            .optional()
        })
    }

    /// Filtered scan joined to the usernames on both ends, ordered by
    /// timestamp.
    pub fn list_feedback(&self, filter: &FeedbackFilter) -> Result<Vec<FeedbackListRow>> {
        self.with_conn(|conn| {
            let mut clauses: Vec<String> = Vec::new();
            let mut params: Vec<rusqlite::types::Value> = Vec::new();

            if let Some(id) = filter.manager_id {
                params.push(id.into());
                clauses.push(format!("f.manager_id = ?{}", params.len()));
            }
            if let Some(id) = filter.employee_id {
                params.push(id.into());
                clauses.push(format!("f.employee_id = ?{}", params.len()));
            }
            if let Some(ack) = filter.acknowledged {
                params.push(ack.into());
                clauses.push(format!("f.acknowledged = ?{}", params.len()));
            }

            let where_sql = if clauses.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", clauses.join(" AND "))
            };
            let order = if filter.ascending { "ASC" } else { "DESC" };

            let sql = format!(
                "SELECT f.id, m.username, e.username, f.strengths, f.improvements, f.sentiment,
                        f.timestamp, f.acknowledged, f.anonymous, f.employee_comment
                 FROM feedback f
                 JOIN users m ON f.manager_id = m.id
                 JOIN users e ON f.employee_id = e.id{}
                 ORDER BY f.timestamp {}",
                where_sql, order
            );

            let mut stmt = conn.prepare(&sql)?;
            let param_refs: Vec<&dyn rusqlite::types::ToSql> = params
                .iter()
                .map(|v| v as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(param_refs.as_slice(), |row| {
                    Ok(FeedbackListRow {
                        id: row.get(0)?,
                        manager_username: row.get(1)?,
                        employee_username: row.get(2)?,
                        strengths: row.get(3)?,
                        improvements: row.get(4)?,
                        sentiment: row.get(5)?,
                        timestamp: row.get(6)?,
                        acknowledged: row.get(7)?,
                        anonymous: row.get(8)?,
                        employee_comment: row.get(9)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn set_acknowledged(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE feedback SET acknowledged = 1 WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn update_feedback(
        &self,
        id: i64,
        employee_id: i64,
        strengths: &str,
        improvements: &str,
        sentiment: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE feedback
                 SET employee_id = ?2, strengths = ?3, improvements = ?4, sentiment = ?5
                 WHERE id = ?1",
                rusqlite::params![id, employee_id, strengths, improvements, sentiment],
            )?;
            Ok(())
        })
    }

    pub fn set_comment(&self, id: i64, comment: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE feedback SET employee_comment = ?2 WHERE id = ?1",
                rusqlite::params![id, comment],
            )?;
            Ok(())
        })
    }

    /// Feedback counts per sentiment value for one manager.
    pub fn sentiment_counts(&self, manager_id: i64) -> Result<Vec<(String, i64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT sentiment, COUNT(*) FROM feedback
                 WHERE manager_id = ?1 GROUP BY sentiment",
            )?;

            let rows = stmt
                .query_map([manager_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user<P: rusqlite::Params>(conn: &Connection, predicate: &str, params: P) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, password, role FROM users WHERE {}",
        predicate
    ))?;

    stmt.query_row(params, |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            role: row.get(3)?,
        })
    })
    .optional()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn insert(db: &Database, manager_id: i64, employee_id: i64, sentiment: &str, ts: &str) -> i64 {
        db.insert_feedback(&NewFeedback {
            manager_id,
            employee_id,
            strengths: "clear communication",
            improvements: "delegation",
            sentiment,
            timestamp: ts,
            anonymous: false,
        })
        .unwrap()
    }

    #[test]
    fn user_create_and_lookup() {
        let db = test_db();
        let id = db.create_user("alice", "hash-a", "manager").unwrap();

        let user = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, "manager");

        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn username_is_unique() {
        let db = test_db();
        db.create_user("alice", "hash-a", "manager").unwrap();
        assert!(db.create_user("alice", "hash-b", "employee").is_err());
    }

    #[test]
    fn role_scoped_lookup() {
        let db = test_db();
        db.create_user("alice", "hash-a", "manager").unwrap();

        assert!(db.get_user_by_username_and_role("alice", "manager").unwrap().is_some());
        assert!(db.get_user_by_username_and_role("alice", "employee").unwrap().is_none());
    }

    #[test]
    fn feedback_roundtrip() {
        let db = test_db();
        let m = db.create_user("mgr", "h", "manager").unwrap();
        let e = db.create_user("emp", "h", "employee").unwrap();

        let id = insert(&db, m, e, "positive", "2026-08-01T10:00:00.000000Z");
        let row = db.get_feedback(id).unwrap().unwrap();

        assert_eq!(row.manager_id, m);
        assert_eq!(row.employee_id, e);
        assert!(!row.acknowledged);
        assert!(!row.anonymous);
        assert_eq!(row.employee_comment, None);
    }

    #[test]
    fn foreign_keys_enforced() {
        let db = test_db();
        let m = db.create_user("mgr", "h", "manager").unwrap();
        assert!(
            db.insert_feedback(&NewFeedback {
                manager_id: m,
                employee_id: 999,
                strengths: "",
                improvements: "",
                sentiment: "neutral",
                timestamp: "2026-08-01T10:00:00.000000Z",
                anonymous: false,
            })
            .is_err()
        );
    }

    #[test]
    fn list_filters_and_order() {
        let db = test_db();
        let m1 = db.create_user("mgr1", "h", "manager").unwrap();
        let m2 = db.create_user("mgr2", "h", "manager").unwrap();
        let e = db.create_user("emp", "h", "employee").unwrap();

        let a = insert(&db, m1, e, "positive", "2026-08-01T10:00:00.000000Z");
        let b = insert(&db, m2, e, "neutral", "2026-08-02T10:00:00.000000Z");
        let c = insert(&db, m1, e, "negative", "2026-08-03T10:00:00.000000Z");
        db.set_acknowledged(b).unwrap();

        // Descending by default
        let all = db
            .list_feedback(&FeedbackFilter { employee_id: Some(e), ..Default::default() })
            .unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![c, b, a]);

        // Ascending
        let asc = db
            .list_feedback(&FeedbackFilter {
                employee_id: Some(e),
                ascending: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(asc.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a, b, c]);

        // Manager scope
        let by_m1 = db
            .list_feedback(&FeedbackFilter { manager_id: Some(m1), ..Default::default() })
            .unwrap();
        assert_eq!(by_m1.iter().map(|r| r.id).collect::<Vec<_>>(), vec![c, a]);
        assert!(by_m1.iter().all(|r| r.manager_username == "mgr1"));

        // Acknowledged filter
        let acked = db
            .list_feedback(&FeedbackFilter {
                employee_id: Some(e),
                acknowledged: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(acked.iter().map(|r| r.id).collect::<Vec<_>>(), vec![b]);

        let unacked = db
            .list_feedback(&FeedbackFilter {
                employee_id: Some(e),
                acknowledged: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(unacked.iter().map(|r| r.id).collect::<Vec<_>>(), vec![c, a]);
    }

    #[test]
    fn mutations() {
        let db = test_db();
        let m = db.create_user("mgr", "h", "manager").unwrap();
        let e1 = db.create_user("emp1", "h", "employee").unwrap();
        let e2 = db.create_user("emp2", "h", "employee").unwrap();

        let id = insert(&db, m, e1, "positive", "2026-08-01T10:00:00.000000Z");

        db.set_acknowledged(id).unwrap();
        assert!(db.get_feedback(id).unwrap().unwrap().acknowledged);

        db.set_comment(id, "thanks!").unwrap();
        assert_eq!(
            db.get_feedback(id).unwrap().unwrap().employee_comment.as_deref(),
            Some("thanks!")
        );

        db.update_feedback(id, e2, "ownership", "estimates", "neutral").unwrap();
        let row = db.get_feedback(id).unwrap().unwrap();
        assert_eq!(row.employee_id, e2);
        assert_eq!(row.strengths, "ownership");
        assert_eq!(row.sentiment, "neutral");
        // Untouched by updates
        assert!(row.acknowledged);
        assert_eq!(row.timestamp, "2026-08-01T10:00:00.000000Z");
    }

    #[test]
    fn sentiment_grouping() {
        let db = test_db();
        let m = db.create_user("mgr", "h", "manager").unwrap();
        let e1 = db.create_user("emp1", "h", "employee").unwrap();
        let e2 = db.create_user("emp2", "h", "employee").unwrap();

        insert(&db, m, e1, "positive", "2026-08-01T10:00:00.000000Z");
        insert(&db, m, e2, "positive", "2026-08-02T10:00:00.000000Z");
        insert(&db, m, e1, "negative", "2026-08-03T10:00:00.000000Z");

        let mut counts = db.sentiment_counts(m).unwrap();
        counts.sort();
        assert_eq!(
            counts,
            vec![("negative".to_string(), 1), ("positive".to_string(), 2)]
        );
    }
}
