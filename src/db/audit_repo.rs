// src/db/audit_repo.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::audit::AuditEntry,
    services::access::{self, EntityKind, Scope},
};

// Alias da tabela principal: `a`. LEFT JOIN: o autor pode ter sido removido
// (user_id fica nulo e a entrada aparece sem username).
pub(crate) const AUDIT_SELECT: &str = "SELECT a.id, u.username AS username, a.action, \
     a.model, a.object_id, a.old_value, a.new_value, a.ip_address, a.user_agent, a.created_at \
     FROM audit_trail a LEFT JOIN users u ON u.id = a.user_id WHERE 1=1";

#[derive(Debug, Clone)]
pub struct AuditFilter {
    pub user: Option<Uuid>,
    pub model: Option<String>,
    pub action: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub scope: Scope,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &AuditFilter) {
    if let Some(user) = filter.user {
        qb.push(" AND a.user_id = ").push_bind(user);
    }
    if let Some(model) = &filter.model {
        qb.push(" AND a.model ILIKE ").push_bind(format!("%{model}%"));
    }
    if let Some(action) = &filter.action {
        qb.push(" AND LOWER(a.action) = LOWER(")
            .push_bind(action.clone())
            .push(")");
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND a.created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND a.created_at <= ").push_bind(to);
    }
    access::push_scope(qb, EntityKind::AuditTrail, filter.scope);
}

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Um INSERT por registro; a trilha não tem UPDATE nem DELETE.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        model: &str,
        object_id: &str,
        old_value: Option<Value>,
        new_value: Option<Value>,
        ip_address: Option<&str>,
        user_agent: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO audit_trail
                 (user_id, action, model, object_id, old_value, new_value, ip_address, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user_id)
        .bind(action)
        .bind(model)
        .bind(object_id)
        .bind(old_value)
        .bind(new_value)
        .bind(ip_address)
        .bind(user_agent)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count(&self, filter: &AuditFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM audit_trail a WHERE 1=1");
        push_filters(&mut qb, filter);
        Ok(qb.build_query_scalar().fetch_one(&self.pool).await?)
    }

    pub async fn list(
        &self,
        filter: &AuditFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditEntry>, AppError> {
        let mut qb = QueryBuilder::new(AUDIT_SELECT);
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY a.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        Ok(qb.build_query_as::<AuditEntry>().fetch_all(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_filter_is_case_insensitive_and_model_is_substring() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM audit_trail a WHERE 1=1");
        let f = AuditFilter {
            user: None,
            model: Some("Lead".to_string()),
            action: Some("CREATE".to_string()),
            date_from: None,
            date_to: None,
            scope: Scope::Unrestricted,
        };
        push_filters(&mut qb, &f);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM audit_trail a WHERE 1=1 \
             AND a.model ILIKE $1 AND LOWER(a.action) = LOWER($2)"
        );
    }

    #[test]
    fn agent_scope_restricts_to_own_actions() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM audit_trail a WHERE 1=1");
        let f = AuditFilter {
            user: None,
            model: None,
            action: None,
            date_from: None,
            date_to: None,
            scope: Scope::OwnedBy(Uuid::new_v4()),
        };
        push_filters(&mut qb, &f);
        assert!(qb.sql().ends_with("AND a.user_id = $1"));
    }
}
