// src/db/dashboard_repo.rs

use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    db::{
        audit_repo::AUDIT_SELECT, contact_repo::CONTACT_SELECT,
        correspondence_repo::CORRESPONDENCE_SELECT, lead_repo::LEAD_SELECT, note_repo::NOTE_SELECT,
        reminder_repo::REMINDER_SELECT,
    },
    models::audit::AuditEntry,
    models::dashboard::{
        DashboardCharts, DashboardCounts, DashboardFilter, DashboardRecent, StatusCount,
    },
    models::{Contact, Correspondence, Lead, Note, Reminder},
};

const RECENT_LIMIT: i64 = 5;

// Coluna de "dono" contra a qual o filtro user_id é aplicado em cada tabela.
// Contatos não têm dono direto e ignoram o filtro de usuário.
const LEAD_OWNER: Option<&str> = Some("owner_id");
const CONTACT_OWNER: Option<&str> = None;
const CREATED_BY: Option<&str> = Some("created_by");
const AUDIT_OWNER: Option<&str> = Some("user_id");

/// Anexa o predicado base do dashboard (faixa de criação + usuário).
fn push_base(
    qb: &mut QueryBuilder<'_, Postgres>,
    filter: &DashboardFilter,
    alias: &str,
    owner_col: Option<&str>,
) {
    if let Some(start) = filter.start_date {
        qb.push(format!(" AND {alias}.created_at >= ")).push_bind(start);
    }
    if let Some(end) = filter.end_date {
        qb.push(format!(" AND {alias}.created_at <= ")).push_bind(end);
    }
    if let (Some(user_id), Some(col)) = (filter.user_id, owner_col) {
        qb.push(format!(" AND {alias}.{col} = ")).push_bind(user_id);
    }
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_table(
        &self,
        table: &str,
        alias: &str,
        owner_col: Option<&str>,
        filter: &DashboardFilter,
    ) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {table} {alias} WHERE 1=1"));
        push_base(&mut qb, filter, alias, owner_col);
        Ok(qb.build_query_scalar().fetch_one(&self.pool).await?)
    }

    pub async fn counts(&self, filter: &DashboardFilter) -> Result<DashboardCounts, AppError> {
        Ok(DashboardCounts {
            leads_total: self.count_table("leads", "l", LEAD_OWNER, filter).await?,
            contacts_total: self.count_table("contacts", "c", CONTACT_OWNER, filter).await?,
            notes_total: self.count_table("notes", "n", CREATED_BY, filter).await?,
            reminders_total: self.count_table("reminders", "r", CREATED_BY, filter).await?,
            correspondence_total: self
                .count_table("correspondence", "co", CREATED_BY, filter)
                .await?,
            audit_entries_total: self.count_table("audit_trail", "a", AUDIT_OWNER, filter).await?,
        })
    }

    async fn recent_rows<T>(
        &self,
        select: &str,
        alias: &str,
        owner_col: Option<&str>,
        filter: &DashboardFilter,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let mut qb = QueryBuilder::new(select);
        push_base(&mut qb, filter, alias, owner_col);
        qb.push(format!(" ORDER BY {alias}.created_at DESC LIMIT "))
            .push_bind(RECENT_LIMIT);
        Ok(qb.build_query_as::<T>().fetch_all(&self.pool).await?)
    }

    pub async fn recent(&self, filter: &DashboardFilter) -> Result<DashboardRecent, AppError> {
        let leads: Vec<Lead> = self.recent_rows(LEAD_SELECT, "l", LEAD_OWNER, filter).await?;
        let contacts: Vec<Contact> = self
            .recent_rows(CONTACT_SELECT, "c", CONTACT_OWNER, filter)
            .await?;
        let notes: Vec<Note> = self.recent_rows(NOTE_SELECT, "n", CREATED_BY, filter).await?;
        let reminders: Vec<Reminder> = self
            .recent_rows(REMINDER_SELECT, "r", CREATED_BY, filter)
            .await?;
        let correspondence: Vec<Correspondence> = self
            .recent_rows(CORRESPONDENCE_SELECT, "co", CREATED_BY, filter)
            .await?;
        let audit: Vec<AuditEntry> = self.recent_rows(AUDIT_SELECT, "a", AUDIT_OWNER, filter).await?;

        // Na visão do dashboard os valores old/new vão crus, sem o corte de
        // exibição da listagem da trilha.
        let audit_entries = audit
            .into_iter()
            .map(|e| {
                json!({
                    "id": e.id,
                    "user": e.username,
                    "action": e.action,
                    "model": e.model,
                    "object_id": e.object_id,
                    "old_value": e.old_value,
                    "new_value": e.new_value,
                    "ip_address": e.ip_address,
                    "user_agent": e.user_agent,
                    "timestamp": e.created_at,
                })
            })
            .collect();

        Ok(DashboardRecent {
            leads,
            contacts,
            notes,
            reminders,
            correspondence,
            audit_entries,
        })
    }

    async fn by_status(
        &self,
        table: &str,
        alias: &str,
        owner_col: Option<&str>,
        filter: &DashboardFilter,
    ) -> Result<Vec<StatusCount>, AppError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {alias}.status::text AS status, COUNT(*) AS count FROM {table} {alias} WHERE 1=1"
        ));
        push_base(&mut qb, filter, alias, owner_col);
        qb.push(format!(" GROUP BY {alias}.status"));
        Ok(qb.build_query_as::<StatusCount>().fetch_all(&self.pool).await?)
    }

    pub async fn charts(&self, filter: &DashboardFilter) -> Result<DashboardCharts, AppError> {
        Ok(DashboardCharts {
            leads_by_status: self.by_status("leads", "l", LEAD_OWNER, filter).await?,
            reminders_by_status: self.by_status("reminders", "r", CREATED_BY, filter).await?,
        })
    }
}
