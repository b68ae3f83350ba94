// src/config.rs

use anyhow::Context;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        AuditRepository, ContactRepository, CorrespondenceRepository, DashboardRepository,
        LeadRepository, NoteRepository, ReminderRepository, UserRepository,
    },
    services::{AuditRecorder, AuthService, SummaryService},
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repo: UserRepository,
    pub lead_repo: LeadRepository,
    pub contact_repo: ContactRepository,
    pub note_repo: NoteRepository,
    pub reminder_repo: ReminderRepository,
    pub correspondence_repo: CorrespondenceRepository,
    pub audit_repo: AuditRepository,
    pub dashboard_repo: DashboardRepository,
    pub auth_service: AuthService,
    pub audit: AuditRecorder,
    pub summary: SummaryService,
}

impl AppState {
    // Função para carregar as configurações e criar o AppState
    pub async fn new() -> anyhow::Result<Self> {
        // .env é opcional: em produção as variáveis vêm do ambiente
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        // GEMINI_API_KEY é opcional: sem ela o resumo degrada para o fallback local
        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());

        let db_pool = match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                pool
            }
            Err(e) => {
                tracing::error!("🔥 Falha ao conectar ao banco de dados: {:?}", e);
                return Err(e.into());
            }
        };

        let user_repo = UserRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());

        Ok(Self {
            user_repo: user_repo.clone(),
            lead_repo: LeadRepository::new(db_pool.clone()),
            contact_repo: ContactRepository::new(db_pool.clone()),
            note_repo: NoteRepository::new(db_pool.clone()),
            reminder_repo: ReminderRepository::new(db_pool.clone()),
            correspondence_repo: CorrespondenceRepository::new(db_pool.clone()),
            audit_repo: audit_repo.clone(),
            dashboard_repo: DashboardRepository::new(db_pool.clone()),
            auth_service: AuthService::new(user_repo, jwt_secret),
            audit: AuditRecorder::new(audit_repo),
            summary: SummaryService::new(gemini_api_key),
            db_pool,
        })
    }
}
