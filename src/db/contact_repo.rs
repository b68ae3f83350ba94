// src/db/contact_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::contact::Contact,
    services::access::{self, EntityKind, Scope},
};

// Alias da tabela principal: `c`. O JOIN com leads resolve o nome e o dono
// da cadeia de posse em uma leitura só.
pub(crate) const CONTACT_SELECT: &str = "SELECT c.id, c.name, c.email, c.phone, \
     c.linked_lead_id, l.name AS linked_lead_name, c.title, c.company, c.is_primary, \
     l.owner_id AS lead_owner_id, c.created_at, c.updated_at \
     FROM contacts c JOIN leads l ON l.id = c.linked_lead_id WHERE 1=1";

#[derive(Debug, Clone)]
pub struct ContactFilter {
    pub linked_lead: Option<Uuid>,
    pub is_primary: Option<bool>,
    pub search: Option<String>,
    pub scope: Scope,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ContactFilter) {
    if let Some(lead) = filter.linked_lead {
        qb.push(" AND c.linked_lead_id = ").push_bind(lead);
    }
    if let Some(primary) = filter.is_primary {
        qb.push(" AND c.is_primary = ").push_bind(primary);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (c.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.company ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.title ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    access::push_scope(qb, EntityKind::Contact, filter.scope);
}

#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self, filter: &ContactFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM contacts c WHERE 1=1");
        push_filters(&mut qb, filter);
        Ok(qb.build_query_scalar().fetch_one(&self.pool).await?)
    }

    pub async fn list(
        &self,
        filter: &ContactFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Contact>, AppError> {
        let mut qb = QueryBuilder::new(CONTACT_SELECT);
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY c.name ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        Ok(qb.build_query_as::<Contact>().fetch_all(&self.pool).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Contact>, AppError> {
        let sql = format!("{CONTACT_SELECT} AND c.id = $1");
        Ok(sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        linked_lead_id: Uuid,
        name: &str,
        email: &str,
        phone: &str,
        title: &str,
        company: &str,
        is_primary: bool,
    ) -> Result<Contact, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO contacts (name, email, phone, linked_lead_id, title, company, is_primary)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(linked_lead_id)
        .bind(title)
        .bind(company)
        .bind(is_primary)
        .fetch_one(&self.pool)
        .await?;

        self.require(id).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        phone: &str,
        title: &str,
        company: &str,
        is_primary: bool,
    ) -> Result<Contact, AppError> {
        sqlx::query(
            "UPDATE contacts
             SET name = $1, email = $2, phone = $3, title = $4, company = $5,
                 is_primary = $6, updated_at = NOW()
             WHERE id = $7",
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(title)
        .bind(company)
        .bind(is_primary)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.require(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn require(&self, id: Uuid) -> Result<Contact, AppError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("contato {id} sumiu após a escrita"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_scope_joins_through_the_lead_owner() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM contacts c WHERE 1=1");
        let f = ContactFilter {
            linked_lead: None,
            is_primary: Some(true),
            search: None,
            scope: Scope::OwnedBy(Uuid::new_v4()),
        };
        push_filters(&mut qb, &f);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM contacts c WHERE 1=1 AND c.is_primary = $1 \
             AND c.linked_lead_id IN (SELECT id FROM leads WHERE owner_id = $2)"
        );
    }
}
