// src/db/reminder_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::reminder::{Reminder, ReminderStatus, ReminderType},
    services::access::{self, EntityKind, Scope},
};

// Alias da tabela principal: `r`.
pub(crate) const REMINDER_SELECT: &str = "SELECT r.id, r.lead_id, l.name AS lead_name, \
     r.message, r.scheduled_time, r.status, r.reminder_type, r.created_by, \
     u.username AS created_by_username, l.owner_id AS lead_owner_id, \
     r.created_at, r.updated_at \
     FROM reminders r JOIN leads l ON l.id = r.lead_id JOIN users u ON u.id = r.created_by \
     WHERE 1=1";

#[derive(Debug, Clone)]
pub struct ReminderFilter {
    pub lead: Option<Uuid>,
    pub status: Option<ReminderStatus>,
    pub reminder_type: Option<ReminderType>,
    pub created_by: Option<Uuid>,
    pub search: Option<String>,
    pub scope: Scope,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReminderFilter) {
    if let Some(lead) = filter.lead {
        qb.push(" AND r.lead_id = ").push_bind(lead);
    }
    if let Some(status) = filter.status {
        qb.push(" AND r.status = ").push_bind(status);
    }
    if let Some(reminder_type) = filter.reminder_type {
        qb.push(" AND r.reminder_type = ").push_bind(reminder_type);
    }
    if let Some(created_by) = filter.created_by {
        qb.push(" AND r.created_by = ").push_bind(created_by);
    }
    if let Some(search) = &filter.search {
        qb.push(" AND r.message ILIKE ").push_bind(format!("%{search}%"));
    }
    access::push_scope(qb, EntityKind::Reminder, filter.scope);
}

#[derive(Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self, filter: &ReminderFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM reminders r WHERE 1=1");
        push_filters(&mut qb, filter);
        Ok(qb.build_query_scalar().fetch_one(&self.pool).await?)
    }

    pub async fn list(
        &self,
        filter: &ReminderFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Reminder>, AppError> {
        let mut qb = QueryBuilder::new(REMINDER_SELECT);
        push_filters(&mut qb, filter);
        // Lembretes são listados pelo horário agendado, não pela criação.
        qb.push(" ORDER BY r.scheduled_time ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        Ok(qb.build_query_as::<Reminder>().fetch_all(&self.pool).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Reminder>, AppError> {
        let sql = format!("{REMINDER_SELECT} AND r.id = $1");
        Ok(sqlx::query_as::<_, Reminder>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Cria o lembrete sempre PENDING: o status é gerenciado pelo servidor,
    /// nunca aceito do cliente na criação.
    pub async fn create(
        &self,
        lead_id: Uuid,
        message: &str,
        scheduled_time: DateTime<Utc>,
        reminder_type: ReminderType,
        created_by: Uuid,
    ) -> Result<Reminder, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO reminders (lead_id, message, scheduled_time, status, reminder_type, created_by)
             VALUES ($1, $2, $3, 'PENDING', $4, $5)
             RETURNING id",
        )
        .bind(lead_id)
        .bind(message)
        .bind(scheduled_time)
        .bind(reminder_type)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        self.require(id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        message: &str,
        scheduled_time: DateTime<Utc>,
        reminder_type: ReminderType,
    ) -> Result<Reminder, AppError> {
        sqlx::query(
            "UPDATE reminders
             SET message = $1, scheduled_time = $2, reminder_type = $3, updated_at = NOW()
             WHERE id = $4",
        )
        .bind(message)
        .bind(scheduled_time)
        .bind(reminder_type)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.require(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM reminders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn require(&self, id: Uuid) -> Result<Reminder, AppError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("lembrete {id} sumiu após a escrita"))
        })
    }
}
