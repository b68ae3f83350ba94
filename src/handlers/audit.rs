// src/handlers/audit.rs
//
// Listagem da trilha de auditoria (somente leitura). Valores old/new saem
// na forma de exibição: cortados em 65 caracteres, travessão quando vazios.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    db::audit_repo::AuditFilter,
    middleware::auth::AuthenticatedUser,
    services::access,
};

#[derive(Debug, Deserialize)]
pub struct AuditListQuery {
    pub user: Option<Uuid>,
    pub model: Option<String>,
    pub action: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page: Option<u32>,
    pub rows: Option<u32>,
}

/// Aceita RFC3339 completo ou data simples (interpretada como meia-noite UTC).
pub(crate) fn parse_date_bound(raw: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }
    Err(AppError::Validation(format!("Invalid {field} format. Use ISO format.")))
}

pub async fn list_audit_entries(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<AuditListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination::new(params.page, params.rows)?;

    let date_from = params
        .date_from
        .as_deref()
        .map(|raw| parse_date_bound(raw, "date_from"))
        .transpose()?;
    let date_to = params
        .date_to
        .as_deref()
        .map(|raw| parse_date_bound(raw, "date_to"))
        .transpose()?;

    let filter = AuditFilter {
        user: params.user,
        model: params.model,
        action: params.action,
        date_from,
        date_to,
        scope: access::scope_for(&user),
    };

    let total = app_state.audit_repo.count(&filter).await?;
    let offset = pagination.offset(total)?;
    let entries = app_state.audit_repo.list(&filter, pagination.rows, offset).await?;

    let audit_entries: Vec<_> = entries.iter().map(|e| e.to_display()).collect();

    Ok(Json(json!({
        "message": "Audit Trail Fetched Successfully",
        "audit_entries": audit_entries,
        "current_page": pagination.page,
        "last_page": pagination.last_page(total),
        "total": total,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_date_becomes_utc_midnight() {
        let dt = parse_date_bound("2024-03-10", "date_from").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-10T00:00:00+00:00");
    }

    #[test]
    fn full_rfc3339_is_accepted() {
        let dt = parse_date_bound("2024-03-10T12:30:00-03:00", "date_to").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-10T15:30:00+00:00");
    }

    #[test]
    fn invalid_dates_name_the_field() {
        let err = parse_date_bound("ontem", "date_from").unwrap_err();
        assert!(
            matches!(err, AppError::Validation(ref m) if m == "Invalid date_from format. Use ISO format.")
        );
    }
}
