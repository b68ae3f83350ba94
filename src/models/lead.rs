// src/models/lead.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::services::audit::Auditable;

// Mapeia o CREATE TYPE lead_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lead_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    InProgress,
    Won,
    Lost,
}

// Lead como a API devolve: campos da tabela + dados exibidos pelo frontend
// (nome do dono e contadores), resolvidos por JOIN/subselect no repositório.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub status: LeadStatus,
    #[serde(rename = "owner")]
    pub owner_id: Uuid,
    pub owner_username: String,
    pub description: String,
    pub value: Option<Decimal>,
    pub source: String,
    pub contacts_count: i64,
    pub notes_count: i64,
    pub reminders_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Snapshot dos campos mutáveis, usado como `old_value` na auditoria.
    pub fn change_snapshot(&self) -> Value {
        json!({
            "name": self.name,
            "status": self.status,
            "description": self.description,
            "value": self.value.and_then(|v| v.to_f64()),
            "source": self.source,
        })
    }
}

impl Auditable for Lead {
    fn model_name(&self) -> &'static str {
        "crm.Lead"
    }

    fn object_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_snapshot(&self) -> Value {
        // Decimal vira float e timestamps viram RFC3339 aqui na borda,
        // para que a trilha guarde apenas valores JSON simples.
        json!({
            "id": self.id,
            "name": self.name,
            "status": self.status,
            "owner": self.owner_id,
            "owner_username": self.owner_username,
            "description": self.description,
            "value": self.value.and_then(|v| v.to_f64()),
            "source": self.source,
            "created_at": self.created_at.to_rfc3339(),
            "updated_at": self.updated_at.to_rfc3339(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub status: Option<LeadStatus>,
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLeadPayload {
    pub id: Uuid,
    pub name: Option<String>,
    pub status: Option<LeadStatus>,
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub source: Option<String>,
}
