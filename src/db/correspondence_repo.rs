// src/db/correspondence_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::correspondence::{Correspondence, CorrespondenceType},
    services::access::{self, EntityKind, Scope},
};

// Alias da tabela principal: `co`. A cadeia de posse atravessa duas
// tabelas: correspondence -> contact -> lead -> owner.
pub(crate) const CORRESPONDENCE_SELECT: &str = "SELECT co.id, co.contact_id, \
     ct.name AS contact_name, co.type AS kind, co.notes, co.outcome, co.duration, \
     co.created_by, u.username AS created_by_username, l.owner_id AS lead_owner_id, \
     co.created_at, co.updated_at \
     FROM correspondence co \
     JOIN contacts ct ON ct.id = co.contact_id \
     JOIN leads l ON l.id = ct.linked_lead_id \
     JOIN users u ON u.id = co.created_by \
     WHERE 1=1";

#[derive(Debug, Clone)]
pub struct CorrespondenceFilter {
    pub contact: Option<Uuid>,
    pub kind: Option<CorrespondenceType>,
    pub created_by: Option<Uuid>,
    pub search: Option<String>,
    pub scope: Scope,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &CorrespondenceFilter) {
    if let Some(contact) = filter.contact {
        qb.push(" AND co.contact_id = ").push_bind(contact);
    }
    if let Some(kind) = filter.kind {
        qb.push(" AND co.type = ").push_bind(kind);
    }
    if let Some(created_by) = filter.created_by {
        qb.push(" AND co.created_by = ").push_bind(created_by);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (co.notes ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR co.outcome ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    access::push_scope(qb, EntityKind::Correspondence, filter.scope);
}

#[derive(Clone)]
pub struct CorrespondenceRepository {
    pool: PgPool,
}

impl CorrespondenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self, filter: &CorrespondenceFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM correspondence co WHERE 1=1");
        push_filters(&mut qb, filter);
        Ok(qb.build_query_scalar().fetch_one(&self.pool).await?)
    }

    pub async fn list(
        &self,
        filter: &CorrespondenceFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Correspondence>, AppError> {
        let mut qb = QueryBuilder::new(CORRESPONDENCE_SELECT);
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY co.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        Ok(qb
            .build_query_as::<Correspondence>()
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Correspondence>, AppError> {
        let sql = format!("{CORRESPONDENCE_SELECT} AND co.id = $1");
        Ok(sqlx::query_as::<_, Correspondence>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        contact_id: Uuid,
        kind: CorrespondenceType,
        notes: &str,
        outcome: &str,
        duration: Option<i32>,
        created_by: Uuid,
    ) -> Result<Correspondence, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO correspondence (contact_id, type, notes, outcome, duration, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(contact_id)
        .bind(kind)
        .bind(notes)
        .bind(outcome)
        .bind(duration)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        self.require(id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        kind: CorrespondenceType,
        notes: &str,
        outcome: &str,
        duration: Option<i32>,
    ) -> Result<Correspondence, AppError> {
        sqlx::query(
            "UPDATE correspondence
             SET type = $1, notes = $2, outcome = $3, duration = $4, updated_at = NOW()
             WHERE id = $5",
        )
        .bind(kind)
        .bind(notes)
        .bind(outcome)
        .bind(duration)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.require(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM correspondence WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn require(&self, id: Uuid) -> Result<Correspondence, AppError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!(
                "correspondência {id} sumiu após a escrita"
            ))
        })
    }
}
