// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::FromRow;
use uuid::Uuid;

/// Ações registradas na trilha. Persistidas como texto minúsculo,
/// igual ao filtro `action` da listagem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

// Registro da trilha como sai do banco (com o username resolvido por JOIN;
// fica nulo quando o autor foi removido).
#[derive(Debug, Clone, FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    pub username: Option<String>,
    pub action: String,
    pub model: String,
    pub object_id: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

/// Comprimento máximo dos valores old/new exibidos na listagem.
const DISPLAY_LEN: usize = 65;

/// Renderiza um valor JSON para exibição: serializado, cortado em 65
/// caracteres com reticências, e travessão quando vazio/nulo.
pub fn display_value(value: &Option<Value>) -> String {
    let rendered = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
    };
    if rendered.is_empty() {
        return "—".to_string();
    }
    if rendered.chars().count() <= DISPLAY_LEN {
        return rendered;
    }
    let truncated: String = rendered.chars().take(DISPLAY_LEN).collect();
    format!("{truncated}…")
}

impl AuditEntry {
    /// Forma de exibição usada pela listagem da trilha.
    pub fn to_display(&self) -> Value {
        json!({
            "id": self.id,
            "user": self.username,
            "action": self.action,
            "model": self.model,
            "object_id": self.object_id,
            "old_value": display_value(&self.old_value),
            "new_value": display_value(&self.new_value),
            "ip_address": self.ip_address,
            "user_agent": self.user_agent,
            "timestamp": self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_value_uses_em_dash_for_missing_values() {
        assert_eq!(display_value(&None), "—");
        assert_eq!(display_value(&Some(Value::Null)), "—");
        assert_eq!(display_value(&Some(json!(""))), "—");
    }

    #[test]
    fn display_value_keeps_short_values_intact() {
        let v = Some(json!({"name": "Acme"}));
        assert_eq!(display_value(&v), r#"{"name":"Acme"}"#);
    }

    #[test]
    fn display_value_truncates_at_65_chars_with_ellipsis() {
        let long = "x".repeat(100);
        let shown = display_value(&Some(json!(long)));
        assert_eq!(shown.chars().count(), 66);
        assert!(shown.ends_with('…'));
        assert!(shown.starts_with(&"x".repeat(65)));
    }

    #[test]
    fn display_value_counts_chars_not_bytes() {
        // Conteúdo multibyte não pode quebrar o corte.
        let long = "é".repeat(80);
        let shown = display_value(&Some(json!(long)));
        assert_eq!(shown.chars().count(), 66);
        assert!(shown.ends_with('…'));
    }
}
