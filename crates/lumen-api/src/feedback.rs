use anyhow::anyhow;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use lumen_db::models::NewFeedback;
use lumen_db::queries::FeedbackFilter;
use lumen_types::Role;
use lumen_types::api::{
    CommentRequest, CreateFeedbackRequest, FeedbackIdResponse, FeedbackView, MessageResponse,
    UpdateFeedbackRequest,
};

use crate::error::{ApiError, join_err};
use crate::extract::Json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub acknowledged: Option<bool>,
    #[serde(default = "default_sort")]
    pub sort: String,
    pub manager: Option<String>,
}

fn default_sort() -> String {
    "desc".into()
}

/// Creation time, written once per row. Fixed microsecond precision keeps
/// lexicographic order on the stored text chronological.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>, ApiError> {
    ts.parse::<DateTime<Utc>>()
        .map_err(|e| anyhow!("corrupt timestamp '{}': {}", ts, e).into())
}

pub async fn create_feedback(
    State(state): State<AppState>,
    Json(req): Json<CreateFeedbackRequest>,
) -> Result<Json<FeedbackIdResponse>, ApiError> {
    let db = state.clone();
    let feedback_id = tokio::task::spawn_blocking(move || {
        let manager = db
            .db
            .get_user_by_username_and_role(&req.manager_username, Role::Manager.as_str())?;
        let employee = db
            .db
            .get_user_by_username_and_role(&req.employee_username, Role::Employee.as_str())?;

        let (Some(manager), Some(employee)) = (manager, employee) else {
            return Err(ApiError::NotFound("Manager or employee not found".into()));
        };

        let timestamp = now_timestamp();
        let id = db.db.insert_feedback(&NewFeedback {
            manager_id: manager.id,
            employee_id: employee.id,
            strengths: &req.strengths,
            improvements: &req.improvements,
            sentiment: &req.sentiment,
            timestamp: &timestamp,
            anonymous: req.anonymous,
        })?;

        Ok::<_, ApiError>(id)
    })
    .await
    .map_err(join_err)??;

    Ok(Json(FeedbackIdResponse {
        message: "Feedback submitted".into(),
        feedback_id,
    }))
}

/// List the rows visible to one user. Employees see what they received
/// (optionally narrowed to one manager), managers see what they wrote;
/// any other role has no list view.
pub async fn list_feedback(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FeedbackView>>, ApiError> {
    let db = state.clone();
    let (rows, viewer) = tokio::task::spawn_blocking(move || {
        let user = db
            .db
            .get_user_by_username(&username)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        let viewer = Role::parse(&user.role);
        let mut filter = FeedbackFilter {
            acknowledged: query.acknowledged,
            ascending: query.sort != "desc",
            ..Default::default()
        };

        match viewer {
            Some(Role::Employee) => {
                filter.employee_id = Some(user.id);
                // An unknown manager filter is ignored, not an error.
                if let Some(name) = &query.manager {
                    if let Some(manager) =
                        db.db.get_user_by_username_and_role(name, Role::Manager.as_str())?
                    {
                        filter.manager_id = Some(manager.id);
                    }
                }
            }
            Some(Role::Manager) => filter.manager_id = Some(user.id),
            _ => return Err(ApiError::Validation("Invalid role".into())),
        }

        let rows = db.db.list_feedback(&filter)?;
        Ok::<_, ApiError>((rows, viewer))
    })
    .await
    .map_err(join_err)??;

    let views = rows
        .into_iter()
        .map(|row| {
            Ok(FeedbackView {
                id: row.id,
                strengths: row.strengths,
                improvements: row.improvements,
                sentiment: row.sentiment,
                timestamp: parse_timestamp(&row.timestamp)?,
                acknowledged: row.acknowledged,
                // `from`: hidden from the employee when anonymous, always
                // hidden from the manager (the author).
                manager: match viewer {
                    Some(Role::Employee) if !row.anonymous => Some(row.manager_username),
                    _ => None,
                },
                // `to`: only the manager sees the recipient.
                employee: match viewer {
                    Some(Role::Manager) => Some(row.employee_username),
                    _ => None,
                },
                employee_comment: row.employee_comment,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(Json(views))
}

/// One-way transition; acknowledging twice is a no-op, and no caller
/// identity is checked.
pub async fn acknowledge_feedback(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let feedback = state
        .db
        .get_feedback(id)?
        .ok_or_else(|| ApiError::NotFound("Feedback not found".into()))?;

    if feedback.acknowledged {
        return Ok(Json(MessageResponse {
            message: "Already acknowledged".into(),
        }));
    }

    state.db.set_acknowledged(id)?;

    Ok(Json(MessageResponse {
        message: format!("Feedback {} acknowledged", id),
    }))
}

pub async fn update_feedback(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFeedbackRequest>,
) -> Result<Json<FeedbackIdResponse>, ApiError> {
    let db = state.clone();
    tokio::task::spawn_blocking(move || {
        let feedback = db
            .db
            .get_feedback(id)?
            .ok_or_else(|| ApiError::NotFound("Feedback not found".into()))?;

        let author = db
            .db
            .get_user_by_id(feedback.manager_id)?
            .ok_or_else(|| anyhow!("feedback {} references missing manager {}", id, feedback.manager_id))?;

        if author.username != req.manager_username {
            return Err(ApiError::Forbidden("You can only update your own feedback".into()));
        }

        let employee_id = match &req.employee_username {
            Some(name) => db
                .db
                .get_user_by_username_and_role(name, Role::Employee.as_str())?
                .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?
                .id,
            None => feedback.employee_id,
        };

        // Absent fields keep their stored values.
        let strengths = req.strengths.as_deref().unwrap_or(&feedback.strengths);
        let improvements = req.improvements.as_deref().unwrap_or(&feedback.improvements);
        let sentiment = req.sentiment.as_deref().unwrap_or(&feedback.sentiment);

        db.db.update_feedback(id, employee_id, strengths, improvements, sentiment)?;

        Ok::<_, ApiError>(())
    })
    .await
    .map_err(join_err)??;

    Ok(Json(FeedbackIdResponse {
        message: "Feedback updated".into(),
        feedback_id: id,
    }))
}

/// Sets the employee comment unconditionally; no caller identity check.
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.db.get_feedback(id)?.is_none() {
        return Err(ApiError::NotFound("Feedback not found".into()));
    }

    state.db.set_comment(id, &req.comment)?;

    Ok(Json(MessageResponse {
        message: "Comment added".into(),
    }))
}
