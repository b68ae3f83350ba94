// src/handlers/dashboard.rs
//
// Visão agregada do CRM: totais, atividade recente e dados de gráfico.
// Por decisão de produto esta visão NÃO aplica o escopo por papel.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::DashboardFilter,
};

use super::audit::parse_date_bound;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<Uuid>,
}

pub async fn get_dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(params): Query<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = DashboardFilter {
        start_date: params
            .start_date
            .as_deref()
            .map(|raw| parse_date_bound(raw, "start_date"))
            .transpose()?,
        end_date: params
            .end_date
            .as_deref()
            .map(|raw| parse_date_bound(raw, "end_date"))
            .transpose()?,
        user_id: params.user_id,
    };

    let counts = app_state.dashboard_repo.counts(&filter).await?;
    let recent = app_state.dashboard_repo.recent(&filter).await?;
    let charts = app_state.dashboard_repo.charts(&filter).await?;

    Ok(Json(json!({
        "message": "Dashboard data fetched successfully",
        "counts": counts,
        "recent": recent,
        "charts": charts,
    })))
}
