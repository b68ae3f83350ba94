// src/models/reminder.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::audit::Auditable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reminder_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reminder_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderType {
    FollowUp,
    Call,
    Meeting,
    Task,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reminder {
    pub id: Uuid,
    #[serde(rename = "lead")]
    pub lead_id: Uuid,
    pub lead_name: String,
    pub message: String,
    pub scheduled_time: DateTime<Utc>,
    pub status: ReminderStatus,
    pub reminder_type: ReminderType,
    pub created_by: Uuid,
    pub created_by_username: String,
    #[serde(skip_serializing)]
    pub lead_owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    pub fn change_snapshot(&self) -> Value {
        json!({
            "message": self.message,
            "scheduled_time": self.scheduled_time.to_rfc3339(),
            "reminder_type": self.reminder_type,
            "status": self.status,
        })
    }
}

impl Auditable for Reminder {
    fn model_name(&self) -> &'static str {
        "crm.Reminder"
    }

    fn object_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "lead": self.lead_id,
            "lead_name": self.lead_name,
            "message": self.message,
            "scheduled_time": self.scheduled_time.to_rfc3339(),
            "status": self.status,
            "reminder_type": self.reminder_type,
            "created_by": self.created_by,
            "created_by_username": self.created_by_username,
            "created_at": self.created_at.to_rfc3339(),
            "updated_at": self.updated_at.to_rfc3339(),
        })
    }
}

// `scheduled_time` chega como texto e é convertido à mão no handler,
// para devolver 400 com mensagem própria em vez do 422 do extrator.
#[derive(Debug, Deserialize)]
pub struct CreateReminderPayload {
    pub lead_id: Option<Uuid>,
    pub message: Option<String>,
    pub scheduled_time: Option<String>,
    pub reminder_type: Option<ReminderType>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReminderPayload {
    pub id: Uuid,
    pub message: Option<String>,
    pub scheduled_time: Option<String>,
    pub reminder_type: Option<ReminderType>,
}
