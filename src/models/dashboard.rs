// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{Contact, Correspondence, Lead, Note, Reminder};

/// Filtro base aplicado a todas as consultas do dashboard.
/// Visão global de propósito: aqui NÃO entra o escopo por papel.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DashboardCounts {
    pub leads_total: i64,
    pub contacts_total: i64,
    pub notes_total: i64,
    pub reminders_total: i64,
    pub correspondence_total: i64,
    pub audit_entries_total: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardRecent {
    pub leads: Vec<Lead>,
    pub contacts: Vec<Contact>,
    pub notes: Vec<Note>,
    pub reminders: Vec<Reminder>,
    pub correspondence: Vec<Correspondence>,
    pub audit_entries: Vec<serde_json::Value>,
}

// Entrada dos histogramas por status (status como texto, direto do GROUP BY)
#[derive(Debug, Serialize, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardCharts {
    pub leads_by_status: Vec<StatusCount>,
    pub reminders_by_status: Vec<StatusCount>,
}
