// src/handlers/contact.rs

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
    db::contact_repo::ContactFilter,
    middleware::{auth::AuthenticatedUser, client_meta::ClientMeta},
    models::audit::AuditAction,
    models::contact::{CreateContactPayload, UpdateContactPayload},
    services::access::{self, EntityKind, Operation},
};

use super::lead::DeleteQuery;

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub linked_lead: Option<Uuid>,
    // Texto cru: o filtro aceita os valores "verdadeiros" true/1/yes/on,
    // qualquer outra coisa conta como falso.
    pub is_primary: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub rows: Option<u32>,
}

fn parse_truthy(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

pub async fn list_contacts(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<ContactListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination::new(params.page, params.rows)?;
    let filter = ContactFilter {
        linked_lead: params.linked_lead,
        is_primary: params.is_primary.as_deref().map(parse_truthy),
        search: params.search,
        scope: access::scope_for(&user),
    };

    let total = app_state.contact_repo.count(&filter).await?;
    let offset = pagination.offset(total)?;
    let contacts = app_state.contact_repo.list(&filter, pagination.rows, offset).await?;

    Ok(Json(json!({
        "message": "Contacts Fetched Successfully",
        "contacts": contacts,
        "current_page": pagination.page,
        "last_page": pagination.last_page(total),
        "total": total,
    })))
}

pub async fn create_contact(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Json(payload): Json<CreateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // Referência cruzada ausente é not-found, não erro de validação
    let lead = app_state
        .lead_repo
        .find_by_id(payload.linked_lead)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Contact, lead.owner_id, Operation::Create)?;

    let contact = app_state
        .contact_repo
        .create(
            lead.id,
            &payload.name,
            &payload.email,
            payload.phone.as_deref().unwrap_or(""),
            payload.title.as_deref().unwrap_or(""),
            payload.company.as_deref().unwrap_or(""),
            payload.is_primary,
        )
        .await?;

    app_state
        .audit
        .record(user.id, AuditAction::Create, &contact, None, &meta)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Contact created successfully",
            "contact": contact,
        })),
    ))
}

pub async fn update_contact(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Json(payload): Json<UpdateContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    let contact = app_state
        .contact_repo
        .find_by_id(payload.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contact not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Contact, contact.lead_owner_id, Operation::Update)?;

    let old_values = contact.change_snapshot();

    let updated = app_state
        .contact_repo
        .update(
            contact.id,
            payload.name.as_deref().unwrap_or(&contact.name),
            payload.email.as_deref().unwrap_or(&contact.email),
            payload.phone.as_deref().unwrap_or(&contact.phone),
            payload.title.as_deref().unwrap_or(&contact.title),
            payload.company.as_deref().unwrap_or(&contact.company),
            payload.is_primary.unwrap_or(contact.is_primary),
        )
        .await?;

    app_state
        .audit
        .record(user.id, AuditAction::Update, &updated, Some(old_values), &meta)
        .await?;

    Ok(Json(json!({
        "message": "Contact updated successfully",
        "contact": updated,
    })))
}

pub async fn delete_contact(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: ClientMeta,
    Query(params): Query<DeleteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let contact = app_state
        .contact_repo
        .find_by_id(params.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contact not found".to_string()))?;

    access::can_mutate(&user, EntityKind::Contact, contact.lead_owner_id, Operation::Delete)?;

    let old_values = contact.change_snapshot();
    app_state
        .audit
        .record(user.id, AuditAction::Delete, &contact, Some(old_values), &meta)
        .await?;

    app_state.contact_repo.delete(contact.id).await?;

    Ok(Json(json!({ "message": "Contact deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    #[test]
    fn truthy_strings_follow_the_accepted_set() {
        for raw in ["true", "True", "1", "yes", "on", "ON"] {
            assert!(parse_truthy(raw), "{raw} deveria ser verdadeiro");
        }
        for raw in ["false", "0", "no", "off", "qualquer"] {
            assert!(!parse_truthy(raw), "{raw} deveria ser falso");
        }
    }

    #[test]
    fn is_primary_filter_accepts_numeric_form() {
        let uri: Uri = "/api/contacts?is_primary=1".parse().unwrap();
        let Query(params) = Query::<ContactListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(params.is_primary.as_deref().map(parse_truthy), Some(true));

        let uri: Uri = "/api/contacts?is_primary=false".parse().unwrap();
        let Query(params) = Query::<ContactListQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(params.is_primary.as_deref().map(parse_truthy), Some(false));
    }
}
