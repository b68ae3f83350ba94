// src/models/note.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::services::audit::Auditable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "note_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteType {
    General,
    Call,
    Meeting,
    FollowUp,
    Opportunity,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    #[serde(rename = "lead")]
    pub lead_id: Uuid,
    pub lead_name: String,
    pub note_type: NoteType,
    pub created_by: Uuid,
    pub created_by_username: String,
    #[serde(skip_serializing)]
    pub lead_owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn change_snapshot(&self) -> Value {
        json!({
            "content": self.content,
            "note_type": self.note_type,
        })
    }
}

impl Auditable for Note {
    fn model_name(&self) -> &'static str {
        "crm.Note"
    }

    fn object_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "content": self.content,
            "lead": self.lead_id,
            "lead_name": self.lead_name,
            "note_type": self.note_type,
            "created_by": self.created_by,
            "created_by_username": self.created_by_username,
            "created_at": self.created_at.to_rfc3339(),
            "updated_at": self.updated_at.to_rfc3339(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotePayload {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub lead: Uuid,
    pub note_type: Option<NoteType>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotePayload {
    pub id: Uuid,
    pub content: Option<String>,
    pub note_type: Option<NoteType>,
}
