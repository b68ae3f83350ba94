// src/db/lead_repo.rs

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadStatus},
    services::access::{self, EntityKind, Scope},
};

// Projeção canônica de um lead: campos da tabela + nome do dono e
// contadores que o frontend exibe. Alias da tabela principal: `l`.
pub(crate) const LEAD_SELECT: &str = "SELECT l.id, l.name, l.status, l.owner_id, \
     u.username AS owner_username, l.description, l.value, l.source, \
     (SELECT COUNT(*) FROM contacts ct WHERE ct.linked_lead_id = l.id) AS contacts_count, \
     (SELECT COUNT(*) FROM notes nt WHERE nt.lead_id = l.id) AS notes_count, \
     (SELECT COUNT(*) FROM reminders rm WHERE rm.lead_id = l.id) AS reminders_count, \
     l.created_at, l.updated_at \
     FROM leads l JOIN users u ON u.id = l.owner_id WHERE 1=1";

/// Filtro conjuntivo da listagem de leads (parâmetros de query + escopo).
#[derive(Debug, Clone)]
pub struct LeadFilter {
    pub id: Option<Uuid>,
    pub status: Option<LeadStatus>,
    pub owner: Option<Uuid>,
    pub search: Option<String>,
    pub scope: Scope,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &LeadFilter) {
    if let Some(id) = filter.id {
        qb.push(" AND l.id = ").push_bind(id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND l.status = ").push_bind(status);
    }
    if let Some(owner) = filter.owner {
        qb.push(" AND l.owner_id = ").push_bind(owner);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (l.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.source ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    access::push_scope(qb, EntityKind::Lead, filter.scope);
}

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self, filter: &LeadFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM leads l WHERE 1=1");
        push_filters(&mut qb, filter);
        Ok(qb.build_query_scalar().fetch_one(&self.pool).await?)
    }

    pub async fn list(
        &self,
        filter: &LeadFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Lead>, AppError> {
        let mut qb = QueryBuilder::new(LEAD_SELECT);
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY l.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        Ok(qb.build_query_as::<Lead>().fetch_all(&self.pool).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let sql = format!("{LEAD_SELECT} AND l.id = $1");
        Ok(sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        status: LeadStatus,
        description: &str,
        value: Option<Decimal>,
        source: &str,
    ) -> Result<Lead, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO leads (name, status, owner_id, description, value, source)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(name)
        .bind(status)
        .bind(owner_id)
        .bind(description)
        .bind(value)
        .bind(source)
        .fetch_one(&self.pool)
        .await?;

        self.require(id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        status: LeadStatus,
        description: &str,
        value: Option<Decimal>,
        source: &str,
    ) -> Result<Lead, AppError> {
        sqlx::query(
            "UPDATE leads
             SET name = $1, status = $2, description = $3, value = $4, source = $5,
                 updated_at = NOW()
             WHERE id = $6",
        )
        .bind(name)
        .bind(status)
        .bind(description)
        .bind(value)
        .bind(source)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.require(id).await
    }

    /// Apaga o lead; contatos, notas e lembretes caem junto via ON DELETE CASCADE.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn require(&self, id: Uuid) -> Result<Lead, AppError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("lead {id} sumiu após a escrita"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> LeadFilter {
        LeadFilter {
            id: None,
            status: None,
            owner: None,
            search: None,
            scope: Scope::Unrestricted,
        }
    }

    #[test]
    fn search_expands_to_all_text_fields() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM leads l WHERE 1=1");
        let f = LeadFilter { search: Some("acme".to_string()), ..filter() };
        push_filters(&mut qb, &f);
        let sql = qb.sql();
        assert!(sql.contains("l.name ILIKE $1"));
        assert!(sql.contains("l.description ILIKE $2"));
        assert!(sql.contains("l.source ILIKE $3"));
    }

    #[test]
    fn filters_are_conjunctive_and_end_with_scope() {
        let agent = Uuid::new_v4();
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM leads l WHERE 1=1");
        let f = LeadFilter {
            status: Some(LeadStatus::New),
            scope: Scope::OwnedBy(agent),
            ..filter()
        };
        push_filters(&mut qb, &f);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM leads l WHERE 1=1 AND l.status = $1 AND l.owner_id = $2"
        );
    }
}
