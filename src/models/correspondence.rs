// src/models/correspondence.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::audit::Auditable;

// O banco usa valores minúsculos para este enum (email, call, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "correspondence_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CorrespondenceType {
    Email,
    Call,
    Meeting,
    Text,
    Linkedin,
    Other,
}

impl CorrespondenceType {
    /// Tipos em que `duration` faz sentido e precisa ser positiva.
    pub fn is_timed(&self) -> bool {
        matches!(self, CorrespondenceType::Call | CorrespondenceType::Meeting)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Correspondence {
    pub id: Uuid,
    #[serde(rename = "contact")]
    pub contact_id: Uuid,
    pub contact_name: String,
    #[serde(rename = "type")]
    pub kind: CorrespondenceType,
    pub notes: String,
    pub outcome: String,
    pub duration: Option<i32>,
    pub created_by: Uuid,
    pub created_by_username: String,
    #[serde(skip_serializing)]
    pub lead_owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Correspondence {
    pub fn change_snapshot(&self) -> Value {
        json!({
            "type": self.kind,
            "notes": self.notes,
            "outcome": self.outcome,
            "duration": self.duration,
        })
    }
}

impl Auditable for Correspondence {
    fn model_name(&self) -> &'static str {
        "crm.Correspondence"
    }

    fn object_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "contact": self.contact_id,
            "contact_name": self.contact_name,
            "type": self.kind,
            "notes": self.notes,
            "outcome": self.outcome,
            "duration": self.duration,
            "created_by": self.created_by,
            "created_by_username": self.created_by_username,
            "created_at": self.created_at.to_rfc3339(),
            "updated_at": self.updated_at.to_rfc3339(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCorrespondencePayload {
    pub contact: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: Option<CorrespondenceType>,
    pub notes: Option<String>,
    pub outcome: Option<String>,
    pub duration: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCorrespondencePayload {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: Option<CorrespondenceType>,
    pub notes: Option<String>,
    pub outcome: Option<String>,
    pub duration: Option<i32>,
}
