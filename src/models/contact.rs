// src/models/contact.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::services::audit::Auditable;

// Contato vinculado a um lead. `lead_owner_id` resolve a cadeia de posse
// (contact -> lead -> owner) em uma única leitura; não é serializado.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "linked_lead")]
    pub linked_lead_id: Uuid,
    pub linked_lead_name: String,
    pub title: String,
    pub company: String,
    pub is_primary: bool,
    #[serde(skip_serializing)]
    pub lead_owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn change_snapshot(&self) -> Value {
        json!({
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "title": self.title,
            "company": self.company,
            "is_primary": self.is_primary,
        })
    }
}

impl Auditable for Contact {
    fn model_name(&self) -> &'static str {
        "crm.Contact"
    }

    fn object_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "linked_lead": self.linked_lead_id,
            "linked_lead_name": self.linked_lead_name,
            "title": self.title,
            "company": self.company,
            "is_primary": self.is_primary,
            "created_at": self.created_at.to_rfc3339(),
            "updated_at": self.updated_at.to_rfc3339(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactPayload {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub phone: Option<String>,
    pub linked_lead: Uuid,
    pub title: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactPayload {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub is_primary: Option<bool>,
}
