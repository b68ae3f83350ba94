// src/handlers/correspondence.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    db::correspondence_repo::CorrespondenceFilter,
    middleware::{auth::AuthenticatedUser, client_meta::ClientMeta},
    models::audit::AuditAction,
    models::correspondence::{
        CorrespondenceType, CreateCorrespondencePayload, UpdateCorrespondencePayload,
    },
    services::access::{self, EntityKind, Operation},
};

use super::lead::DeleteQuery;

#[derive(Debug, Deserialize)]
pub struct CorrespondenceListQuery {
    pub contact: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: Option<CorrespondenceType>,
    pub created_by: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub rows: Option<u32>,
}

pub async fn list_correspondence(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<CorrespondenceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination::new(params.page, params.rows)?;
    let filter = CorrespondenceFilter {
        contact: params.contact,
        kind: params.kind,
        created_by: params.created_by,
        search: params.search,
        scope: access::scope_for(&user),
    };

    let total = app_state.correspondence_repo.count(&filter).await?;
    let offset = pagination.offset(total)?;
    let correspondence = app_state
        .correspondence_repo
        .list(&filter, pagination.rows, offset)
        .await?;

    Ok(Json(json!({
        "message": "Correspondence Fetched Successfully",
        "correspondence": correspondence,
        "current_page": pagination.page,
        "last_page": pagination.last_page(total),
        "total": total,
    })))
}

pub async fn create_correspondence(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Json(payload): Json<CreateCorrespondencePayload>,
) -> Result<impl IntoResponse, AppError> {
    let contact_id = payload
        .contact
        .ok_or_else(|| AppError::NotFound("Contact not found".to_string()))?;
    let kind = payload
        .kind
        .ok_or_else(|| AppError::Validation("Type is required".to_string()))?;

    let contact = app_state
        .contact_repo
        .find_by_id(contact_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contact not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Correspondence, contact.lead_owner_id, Operation::Create)?;

    // Duração só importa (e precisa ser positiva) em ligações e reuniões
    if kind.is_timed() && payload.duration.is_some_and(|d| d <= 0) {
        return Err(AppError::Validation(
            "Duration must be positive for calls and meetings".to_string(),
        ));
    }

    let correspondence = app_state
        .correspondence_repo
        .create(
            contact.id,
            kind,
            payload.notes.as_deref().unwrap_or(""),
            payload.outcome.as_deref().unwrap_or(""),
            payload.duration,
            user.id,
        )
        .await?;

    app_state
        .audit
        .record(user.id, AuditAction::Create, &correspondence, None, &meta)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Correspondence created successfully",
            "correspondence": correspondence,
        })),
    ))
}

pub async fn update_correspondence(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Json(payload): Json<UpdateCorrespondencePayload>,
) -> Result<impl IntoResponse, AppError> {
    let correspondence = app_state
        .correspondence_repo
        .find_by_id(payload.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Correspondence not found".to_string()))?;

    access::can_mutate(
        &user,
        EntityKind::Correspondence,
        correspondence.lead_owner_id,
        Operation::Update,
    )?;

    if payload.duration.is_some_and(|d| d <= 0) {
        return Err(AppError::Validation("Duration must be positive".to_string()));
    }

    let old_values = correspondence.change_snapshot();

    let updated = app_state
        .correspondence_repo
        .update(
            correspondence.id,
            payload.kind.unwrap_or(correspondence.kind),
            payload.notes.as_deref().unwrap_or(&correspondence.notes),
            payload.outcome.as_deref().unwrap_or(&correspondence.outcome),
            payload.duration.or(correspondence.duration),
        )
        .await?;

    app_state
        .audit
        .record(user.id, AuditAction::Update, &updated, Some(old_values), &meta)
        .await?;

    Ok(Json(json!({
        "message": "Correspondence updated successfully",
        "correspondence": updated,
    })))
}

pub async fn delete_correspondence(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Query(params): Query<DeleteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let correspondence = app_state
        .correspondence_repo
        .find_by_id(params.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Correspondence not found".to_string()))?;

    access::can_mutate(
        &user,
        EntityKind::Correspondence,
        correspondence.lead_owner_id,
        Operation::Delete,
    )?;

    let old_values = correspondence.change_snapshot();
    app_state
        .audit
        .record(user.id, AuditAction::Delete, &correspondence, Some(old_values), &meta)
        .await?;

    app_state.correspondence_repo.delete(correspondence.id).await?;

    Ok(Json(json!({ "message": "Correspondence deleted successfully" })))
}
