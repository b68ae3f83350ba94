// src/db/note_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::note::{Note, NoteType},
    services::access::{self, EntityKind, Scope},
};

// Alias da tabela principal: `n`.
pub(crate) const NOTE_SELECT: &str = "SELECT n.id, n.content, n.lead_id, \
     l.name AS lead_name, n.note_type, n.created_by, u.username AS created_by_username, \
     l.owner_id AS lead_owner_id, n.created_at, n.updated_at \
     FROM notes n JOIN leads l ON l.id = n.lead_id JOIN users u ON u.id = n.created_by \
     WHERE 1=1";

#[derive(Debug, Clone)]
pub struct NoteFilter {
    pub lead: Option<Uuid>,
    pub note_type: Option<NoteType>,
    pub created_by: Option<Uuid>,
    pub search: Option<String>,
    pub scope: Scope,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &NoteFilter) {
    if let Some(lead) = filter.lead {
        qb.push(" AND n.lead_id = ").push_bind(lead);
    }
    if let Some(note_type) = filter.note_type {
        qb.push(" AND n.note_type = ").push_bind(note_type);
    }
    if let Some(created_by) = filter.created_by {
        qb.push(" AND n.created_by = ").push_bind(created_by);
    }
    if let Some(search) = &filter.search {
        qb.push(" AND n.content ILIKE ").push_bind(format!("%{search}%"));
    }
    access::push_scope(qb, EntityKind::Note, filter.scope);
}

#[derive(Clone)]
pub struct NoteRepository {
    pool: PgPool,
}

impl NoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count(&self, filter: &NoteFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM notes n WHERE 1=1");
        push_filters(&mut qb, filter);
        Ok(qb.build_query_scalar().fetch_one(&self.pool).await?)
    }

    pub async fn list(
        &self,
        filter: &NoteFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Note>, AppError> {
        let mut qb = QueryBuilder::new(NOTE_SELECT);
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY n.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        Ok(qb.build_query_as::<Note>().fetch_all(&self.pool).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Note>, AppError> {
        let sql = format!("{NOTE_SELECT} AND n.id = $1");
        Ok(sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Conteúdo das notas de um lead, da mais recente para a mais antiga
    /// (entrada do serviço de resumo).
    pub async fn contents_for_lead(&self, lead_id: Uuid) -> Result<Vec<String>, AppError> {
        Ok(sqlx::query_scalar::<_, String>(
            "SELECT content FROM notes WHERE lead_id = $1 ORDER BY created_at DESC",
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn create(
        &self,
        lead_id: Uuid,
        content: &str,
        note_type: NoteType,
        created_by: Uuid,
    ) -> Result<Note, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO notes (content, lead_id, note_type, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(content)
        .bind(lead_id)
        .bind(note_type)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        self.require(id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        content: &str,
        note_type: NoteType,
    ) -> Result<Note, AppError> {
        sqlx::query(
            "UPDATE notes SET content = $1, note_type = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(content)
        .bind(note_type)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.require(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn require(&self, id: Uuid) -> Result<Note, AppError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!("nota {id} sumiu após a escrita"))
        })
    }
}
