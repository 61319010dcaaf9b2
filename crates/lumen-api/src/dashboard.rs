use std::collections::BTreeMap;

use axum::extract::{Path, State};

use lumen_db::queries::FeedbackFilter;
use lumen_types::Role;
use lumen_types::api::{EmployeeDashboard, ManagerDashboard, TimelineItem};

use crate::error::{ApiError, join_err};
use crate::extract::Json;
use crate::feedback::parse_timestamp;
use crate::state::AppState;

pub async fn manager_dashboard(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ManagerDashboard>, ApiError> {
    let db = state.clone();
    let (username, counts) = tokio::task::spawn_blocking(move || {
        let manager = db
            .db
            .get_user_by_username_and_role(&username, Role::Manager.as_str())?
            .ok_or_else(|| ApiError::NotFound("Manager not found".into()))?;

        let counts = db.db.sentiment_counts(manager.id)?;
        Ok::<_, ApiError>((username, counts))
    })
    .await
    .map_err(join_err)??;

    let total_feedbacks = counts.iter().map(|(_, n)| *n).sum();
    let sentiment_counts: BTreeMap<String, i64> = counts.into_iter().collect();

    Ok(Json(ManagerDashboard {
        manager: username,
        total_feedbacks,
        sentiment_counts,
    }))
}

/// Everything the employee has received, newest first, shaped like the
/// employee's list view (anonymous rows hide the author; no recipient
/// field).
pub async fn employee_dashboard(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<EmployeeDashboard>, ApiError> {
    let db = state.clone();
    let (username, rows) = tokio::task::spawn_blocking(move || {
        let employee = db
            .db
            .get_user_by_username_and_role(&username, Role::Employee.as_str())?
            .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

        let rows = db.db.list_feedback(&FeedbackFilter {
            employee_id: Some(employee.id),
            ..Default::default()
        })?;
        Ok::<_, ApiError>((username, rows))
    })
    .await
    .map_err(join_err)??;

    let feedback_timeline = rows
        .into_iter()
        .map(|row| {
            Ok(TimelineItem {
                id: row.id,
                strengths: row.strengths,
                improvements: row.improvements,
                sentiment: row.sentiment,
                timestamp: parse_timestamp(&row.timestamp)?,
                acknowledged: row.acknowledged,
                manager: (!row.anonymous).then_some(row.manager_username),
                employee_comment: row.employee_comment,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(EmployeeDashboard {
        employee: username,
        feedback_timeline,
    }))
}
