// src/handlers/reminder.rs
//
// Lembretes nascem sempre PENDING; o status é do servidor, não do cliente.
// `scheduled_time` precisa ser estritamente futuro na criação e em qualquer
// atualização que o altere.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    db::reminder_repo::ReminderFilter,
    middleware::{auth::AuthenticatedUser, client_meta::ClientMeta},
    models::audit::AuditAction,
    models::reminder::{
        CreateReminderPayload, ReminderStatus, ReminderType, UpdateReminderPayload,
    },
    services::access::{self, EntityKind, Operation},
};

use super::lead::DeleteQuery;

#[derive(Debug, Deserialize)]
pub struct ReminderListQuery {
    pub lead: Option<Uuid>,
    pub status: Option<ReminderStatus>,
    pub reminder_type: Option<ReminderType>,
    pub created_by: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub rows: Option<u32>,
}

/// Converte o `scheduled_time` textual em instante UTC. Aceita RFC3339 com
/// offset e o formato ISO sem offset (interpretado como UTC).
fn parse_scheduled_time(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    Err(AppError::Validation(
        "Invalid scheduled_time format. Use ISO format.".to_string(),
    ))
}

fn check_future(scheduled_time: DateTime<Utc>) -> Result<(), AppError> {
    if scheduled_time <= Utc::now() {
        return Err(AppError::Validation(
            "Scheduled time must be in the future".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_reminders(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<ReminderListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination::new(params.page, params.rows)?;
    let filter = ReminderFilter {
        lead: params.lead,
        status: params.status,
        reminder_type: params.reminder_type,
        created_by: params.created_by,
        search: params.search,
        scope: access::scope_for(&user),
    };

    let total = app_state.reminder_repo.count(&filter).await?;
    let offset = pagination.offset(total)?;
    let reminders = app_state
        .reminder_repo
        .list(&filter, pagination.rows, offset)
        .await?;

    Ok(Json(json!({
        "message": "Reminders Fetched Successfully",
        "reminders": reminders,
        "current_page": pagination.page,
        "last_page": pagination.last_page(total),
        "total": total,
    })))
}

pub async fn create_reminder(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Json(payload): Json<CreateReminderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(lead_id), Some(message), Some(scheduled_time_str)) =
        (payload.lead_id, &payload.message, &payload.scheduled_time)
    else {
        return Err(AppError::Validation(
            "Lead, message, and scheduled_time are required".to_string(),
        ));
    };

    let lead = app_state
        .lead_repo
        .find_by_id(lead_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Reminder, lead.owner_id, Operation::Create)?;

    let scheduled_time = parse_scheduled_time(scheduled_time_str)?;
    check_future(scheduled_time)?;

    let reminder = app_state
        .reminder_repo
        .create(
            lead.id,
            message,
            scheduled_time,
            payload.reminder_type.unwrap_or(ReminderType::FollowUp),
            user.id,
        )
        .await?;

    app_state
        .audit
        .record(user.id, AuditAction::Create, &reminder, None, &meta)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Reminder created successfully",
            "reminder": reminder,
        })),
    ))
}

pub async fn update_reminder(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Json(payload): Json<UpdateReminderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let reminder = app_state
        .reminder_repo
        .find_by_id(payload.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reminder not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Reminder, reminder.lead_owner_id, Operation::Update)?;

    let old_values = reminder.change_snapshot();

    // Horário novo só é aceito se ainda estiver no futuro
    let scheduled_time = match &payload.scheduled_time {
        Some(raw) => {
            let parsed = parse_scheduled_time(raw)?;
            check_future(parsed)?;
            parsed
        }
        None => reminder.scheduled_time,
    };

    let updated = app_state
        .reminder_repo
        .update(
            reminder.id,
            payload.message.as_deref().unwrap_or(&reminder.message),
            scheduled_time,
            payload.reminder_type.unwrap_or(reminder.reminder_type),
        )
        .await?;

    app_state
        .audit
        .record(user.id, AuditAction::Update, &updated, Some(old_values), &meta)
        .await?;

    Ok(Json(json!({
        "message": "Reminder updated successfully",
        "reminder": updated,
    })))
}

pub async fn delete_reminder(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Query(params): Query<DeleteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let reminder = app_state
        .reminder_repo
        .find_by_id(params.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reminder not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Reminder, reminder.lead_owner_id, Operation::Delete)?;

    let old_values = reminder.change_snapshot();
    app_state
        .audit
        .record(user.id, AuditAction::Delete, &reminder, Some(old_values), &meta)
        .await?;

    app_state.reminder_repo.delete(reminder.id).await?;

    Ok(Json(json!({ "message": "Reminder deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parses_rfc3339_with_offset_and_zulu() {
        let a = parse_scheduled_time("2030-05-01T10:00:00Z").unwrap();
        let b = parse_scheduled_time("2030-05-01T07:00:00-03:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parses_naive_iso_as_utc() {
        let dt = parse_scheduled_time("2030-05-01T10:00:00").unwrap();
        assert_eq!(dt, parse_scheduled_time("2030-05-01T10:00:00Z").unwrap());
    }

    #[test]
    fn rejects_garbage_with_format_message() {
        let err = parse_scheduled_time("amanhã cedo").unwrap_err();
        assert!(
            matches!(err, AppError::Validation(ref m) if m == "Invalid scheduled_time format. Use ISO format.")
        );
    }

    #[test]
    fn past_times_are_rejected() {
        let past = Utc::now() - Duration::hours(1);
        let err = check_future(past).unwrap_err();
        assert!(
            matches!(err, AppError::Validation(ref m) if m == "Scheduled time must be in the future")
        );
        assert!(check_future(Utc::now() + Duration::hours(1)).is_ok());
    }
}
