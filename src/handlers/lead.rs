// src/handlers/lead.rs
//
// CRUD de leads + resumo de notas por IA. Cada mutação grava um registro
// na trilha de auditoria na mesma requisição.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    db::lead_repo::LeadFilter,
    middleware::{auth::AuthenticatedUser, client_meta::ClientMeta},
    models::audit::AuditAction,
    models::lead::{CreateLeadPayload, LeadStatus, UpdateLeadPayload},
    services::access::{self, EntityKind, Operation},
};

#[derive(Debug, Deserialize)]
pub struct LeadListQuery {
    pub id: Option<Uuid>,
    pub status: Option<LeadStatus>,
    pub owner: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub rows: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Uuid,
}

fn check_value(value: Option<Decimal>) -> Result<(), AppError> {
    if value.is_some_and(|v| v <= Decimal::ZERO) {
        return Err(AppError::Validation("Value must be a positive number".to_string()));
    }
    Ok(())
}

pub async fn list_leads(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<LeadListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination::new(params.page, params.rows)?;
    let filter = LeadFilter {
        id: params.id,
        status: params.status,
        owner: params.owner,
        search: params.search,
        scope: access::scope_for(&user),
    };

    let total = app_state.lead_repo.count(&filter).await?;
    let offset = pagination.offset(total)?;
    let leads = app_state.lead_repo.list(&filter, pagination.rows, offset).await?;

    Ok(Json(json!({
        "message": "Leads Fetched Successfully",
        "leads": leads,
        "current_page": pagination.page,
        "last_page": pagination.last_page(total),
        "total": total,
    })))
}

pub async fn create_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    check_value(payload.value)?;
    access::can_mutate(&user, EntityKind::Lead, user.id, Operation::Create)?;

    let lead = app_state
        .lead_repo
        .create(
            user.id,
            &payload.name,
            payload.status.unwrap_or(LeadStatus::New),
            payload.description.as_deref().unwrap_or(""),
            payload.value,
            payload.source.as_deref().unwrap_or(""),
        )
        .await?;

    app_state
        .audit
        .record(user.id, AuditAction::Create, &lead, None, &meta)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Lead created successfully",
            "lead": lead,
        })),
    ))
}

pub async fn update_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_repo
        .find_by_id(payload.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Lead, lead.owner_id, Operation::Update)?;
    check_value(payload.value)?;

    // Snapshot dos campos mutáveis ANTES da mudança, para o old_value
    let old_values = lead.change_snapshot();

    // Atualização parcial: campo ausente mantém o valor atual
    let updated = app_state
        .lead_repo
        .update(
            lead.id,
            payload.name.as_deref().unwrap_or(&lead.name),
            payload.status.unwrap_or(lead.status),
            payload.description.as_deref().unwrap_or(&lead.description),
            payload.value.or(lead.value),
            payload.source.as_deref().unwrap_or(&lead.source),
        )
        .await?;

    app_state
        .audit
        .record(user.id, AuditAction::Update, &updated, Some(old_values), &meta)
        .await?;

    Ok(Json(json!({
        "message": "Lead updated successfully",
        "lead": updated,
    })))
}

pub async fn delete_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Query(params): Query<DeleteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_repo
        .find_by_id(params.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Lead, lead.owner_id, Operation::Delete)?;

    // O registro de auditoria é gravado ANTES do delete, para existir
    // mesmo com a linha prestes a sumir
    let old_values = lead.change_snapshot();
    app_state
        .audit
        .record(user.id, AuditAction::Delete, &lead, Some(old_values), &meta)
        .await?;

    app_state.lead_repo.delete(lead.id).await?;

    Ok(Json(json!({ "message": "Lead deleted successfully" })))
}

/// Resumo das notas do lead, por IA quando disponível.
pub async fn lead_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    if !access::can_view_lead(&user, lead.owner_id) {
        return Err(AppError::Forbidden(
            "You can only view summaries for your own leads".to_string(),
        ));
    }

    // Notas da mais recente para a mais antiga
    let notes = app_state.note_repo.contents_for_lead(lead.id).await?;

    if notes.is_empty() {
        return Ok(Json(json!({
            "lead": lead.name,
            "summary": "No notes available for this lead.",
            "ai_available": false,
        })));
    }

    let summary = app_state.summary.summarize(&notes, &lead.name).await;

    Ok(Json(json!({
        "lead": lead.name,
        "summary": summary,
        "ai_available": true,
        "notes_count": notes.len(),
    })))
}
