// src/handlers/note.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    db::note_repo::NoteFilter,
    middleware::{auth::AuthenticatedUser, client_meta::ClientMeta},
    models::audit::AuditAction,
    models::note::{CreateNotePayload, NoteType, UpdateNotePayload},
    services::access::{self, EntityKind, Operation},
};

use super::lead::DeleteQuery;

#[derive(Debug, Deserialize)]
pub struct NoteListQuery {
    pub lead: Option<Uuid>,
    pub note_type: Option<NoteType>,
    pub created_by: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub rows: Option<u32>,
}

pub async fn list_notes(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<NoteListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination::new(params.page, params.rows)?;
    let filter = NoteFilter {
        lead: params.lead,
        note_type: params.note_type,
        created_by: params.created_by,
        search: params.search,
        scope: access::scope_for(&user),
    };

    let total = app_state.note_repo.count(&filter).await?;
    let offset = pagination.offset(total)?;
    let notes = app_state.note_repo.list(&filter, pagination.rows, offset).await?;

    Ok(Json(json!({
        "message": "Notes Fetched Successfully",
        "notes": notes,
        "current_page": pagination.page,
        "last_page": pagination.last_page(total),
        "total": total,
    })))
}

pub async fn create_note(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Json(payload): Json<CreateNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_repo
        .find_by_id(payload.lead)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Note, lead.owner_id, Operation::Create)?;

    let note = app_state
        .note_repo
        .create(
            lead.id,
            &payload.content,
            payload.note_type.unwrap_or(NoteType::General),
            user.id,
        )
        .await?;

    app_state
        .audit
        .record(user.id, AuditAction::Create, &note, None, &meta)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Note created successfully",
            "note": note,
        })),
    ))
}

pub async fn update_note(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Json(payload): Json<UpdateNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    let note = app_state
        .note_repo
        .find_by_id(payload.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Note, note.lead_owner_id, Operation::Update)?;

    let old_values = note.change_snapshot();

    let updated = app_state
        .note_repo
        .update(
            note.id,
            payload.content.as_deref().unwrap_or(&note.content),
            payload.note_type.unwrap_or(note.note_type),
        )
        .await?;

    app_state
        .audit
        .record(user.id, AuditAction::Update, &updated, Some(old_values), &meta)
        .await?;

    Ok(Json(json!({
        "message": "Note updated successfully",
        "note": updated,
    })))
}

pub async fn delete_note(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Query(params): Query<DeleteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let note = app_state
        .note_repo
        .find_by_id(params.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Note, note.lead_owner_id, Operation::Delete)?;

    let old_values = note.change_snapshot();
    app_state
        .audit
        .record(user.id, AuditAction::Delete, &note, Some(old_values), &meta)
        .await?;

    app_state.note_repo.delete(note.id).await?;

    Ok(Json(json!({ "message": "Note deleted successfully" })))
}
