/// Database row types — these map directly to SQLite rows.
/// Distinct from the lumen-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
}

pub struct FeedbackRow {
    pub id: i64,
    pub manager_id: i64,
    pub employee_id: i64,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: String,
    pub timestamp: String,
    pub acknowledged: bool,
    pub anonymous: bool,
    pub employee_comment: Option<String>,
}

/// A feedback row joined to the usernames on both ends, for list views.
pub struct FeedbackListRow {
    pub id: i64,
    pub manager_username: String,
    pub employee_username: String,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: String,
    pub timestamp: String,
    pub acknowledged: bool,
    pub anonymous: bool,
    pub employee_comment: Option<String>,
}

pub struct NewFeedback<'a> {
    pub manager_id: i64,
    pub employee_id: i64,
    pub strengths: &'a str,
    pub improvements: &'a str,
    pub sentiment: &'a str,
    pub timestamp: &'a str,
    pub anonymous: bool,
}
