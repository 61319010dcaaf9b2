use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub role: String,
}

/// Plain confirmation payload for mutations that return no data.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// -- Feedback --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFeedbackRequest {
    pub manager_username: String,
    pub employee_username: String,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: String,
    #[serde(default)]
    pub anonymous: bool,
}

/// Partial update. An absent field (or an explicit null) leaves the stored
/// value untouched; there is no way to clear a field.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateFeedbackRequest {
    pub manager_username: String,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
    pub employee_username: Option<String>,
    pub sentiment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackIdResponse {
    pub message: String,
    pub feedback_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    pub comment: String,
}

/// One feedback row as returned by `GET /feedback/{username}`.
///
/// `from` is withheld (null) from an employee viewer when the row is
/// anonymous, and always withheld from the manager viewer (the author).
/// `to` is only ever populated for the manager viewer.
#[derive(Debug, Serialize)]
pub struct FeedbackView {
    pub id: i64,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: String,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
    #[serde(rename = "from")]
    pub manager: Option<String>,
    #[serde(rename = "to")]
    pub employee: Option<String>,
    pub employee_comment: Option<String>,
}

/// Employee dashboard entry — the employee's view of a row, with no `to`
/// key at all.
#[derive(Debug, Serialize)]
pub struct TimelineItem {
    pub id: i64,
    pub strengths: String,
    pub improvements: String,
    pub sentiment: String,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
    #[serde(rename = "from")]
    pub manager: Option<String>,
    pub employee_comment: Option<String>,
}

// -- Dashboards --

#[derive(Debug, Serialize)]
pub struct ManagerDashboard {
    pub manager: String,
    pub total_feedbacks: i64,
    pub sentiment_counts: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct EmployeeDashboard {
    pub employee: String,
    pub feedback_timeline: Vec<TimelineItem>,
}
