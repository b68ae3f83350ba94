// src/services/access.rs
//
// Escopo de acesso por papel, aplicado de forma uniforme a todos os recursos:
// MANAGER enxerga e faz tudo; AGENT fica restrito às entidades cuja cadeia de
// posse (lead -> owner) resolve para ele mesmo, e nunca apaga leads/contatos.
//
// Função de decisão pura: nenhum I/O além dos predicados que ela anexa.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Lead,
    Contact,
    Note,
    Reminder,
    Correspondence,
    AuditTrail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// Restrição de visibilidade derivada do papel do usuário.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Unrestricted,
    OwnedBy(Uuid),
}

pub fn scope_for(user: &User) -> Scope {
    if user.is_agent() {
        Scope::OwnedBy(user.id)
    } else {
        Scope::Unrestricted
    }
}

/// Anexa o predicado de visibilidade à consulta de listagem/detalhe.
///
/// Os fragmentos assumem os aliases canônicos dos repositórios:
/// leads `l`, contacts `c`, notes `n`, reminders `r`, correspondence `co`,
/// audit_trail `a`.
pub fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, kind: EntityKind, scope: Scope) {
    let Scope::OwnedBy(user_id) = scope else {
        return;
    };

    match kind {
        EntityKind::Lead => {
            qb.push(" AND l.owner_id = ").push_bind(user_id);
        }
        EntityKind::Contact => {
            qb.push(" AND c.linked_lead_id IN (SELECT id FROM leads WHERE owner_id = ")
                .push_bind(user_id)
                .push(")");
        }
        EntityKind::Note => {
            qb.push(" AND n.lead_id IN (SELECT id FROM leads WHERE owner_id = ")
                .push_bind(user_id)
                .push(")");
        }
        EntityKind::Reminder => {
            qb.push(" AND r.lead_id IN (SELECT id FROM leads WHERE owner_id = ")
                .push_bind(user_id)
                .push(")");
        }
        EntityKind::Correspondence => {
            qb.push(
                " AND co.contact_id IN (SELECT ct.id FROM contacts ct \
                 JOIN leads ld ON ld.id = ct.linked_lead_id WHERE ld.owner_id = ",
            )
            .push_bind(user_id)
            .push(")");
        }
        EntityKind::AuditTrail => {
            qb.push(" AND a.user_id = ").push_bind(user_id);
        }
    }
}

/// Decide se `user` pode executar `op` sobre uma entidade cuja cadeia de
/// posse resolve para `chain_owner` (para Lead, o próprio owner).
pub fn can_mutate(
    user: &User,
    kind: EntityKind,
    chain_owner: Uuid,
    op: Operation,
) -> Result<(), AppError> {
    if user.is_manager() {
        return Ok(());
    }

    let denial = match (kind, op) {
        // Qualquer usuário autenticado cria leads (e vira o dono).
        (EntityKind::Lead, Operation::Create) => None,
        (EntityKind::Lead, Operation::Update) => {
            (chain_owner != user.id).then_some("You can only update your own leads")
        }
        // Agentes nunca apagam leads/contatos, nem os próprios.
        (EntityKind::Lead, Operation::Delete) => Some("Agents cannot delete leads"),
        (EntityKind::Contact, Operation::Delete) => Some("Agents cannot delete contacts"),

        (EntityKind::Contact, Operation::Create) => {
            (chain_owner != user.id).then_some("You can only create contacts for your own leads")
        }
        (EntityKind::Contact, Operation::Update) => {
            (chain_owner != user.id).then_some("You can only update contacts for your own leads")
        }

        (EntityKind::Note, Operation::Create) => {
            (chain_owner != user.id).then_some("You can only create notes for your own leads")
        }
        (EntityKind::Note, Operation::Update) => {
            (chain_owner != user.id).then_some("You can only update notes for your own leads")
        }
        (EntityKind::Note, Operation::Delete) => {
            (chain_owner != user.id).then_some("You can only delete notes for your own leads")
        }

        (EntityKind::Reminder, Operation::Create) => {
            (chain_owner != user.id).then_some("You can only create reminders for your own leads")
        }
        (EntityKind::Reminder, Operation::Update) => {
            (chain_owner != user.id).then_some("You can only update reminders for your own leads")
        }
        (EntityKind::Reminder, Operation::Delete) => {
            (chain_owner != user.id).then_some("You can only delete reminders for your own leads")
        }

        (EntityKind::Correspondence, Operation::Create) => (chain_owner != user.id)
            .then_some("You can only create correspondence for your own leads"),
        (EntityKind::Correspondence, Operation::Update) => (chain_owner != user.id)
            .then_some("You can only update correspondence for your own leads"),
        (EntityKind::Correspondence, Operation::Delete) => (chain_owner != user.id)
            .then_some("You can only delete correspondence for your own leads"),

        // A trilha de auditoria não tem mutação pela API.
        (EntityKind::AuditTrail, _) => Some("Audit trail is read-only"),
    };

    match denial {
        Some(msg) => Err(AppError::Forbidden(msg.to_string())),
        None => Ok(()),
    }
}

/// Visibilidade de um lead individual (usada pelo endpoint de resumo).
pub fn can_view_lead(user: &User, owner_id: Uuid) -> bool {
    user.is_manager() || owner_id == user.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "vendedor".to_string(),
            email: "vendedor@example.com".to_string(),
            password_hash: "x".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn manager_scope_appends_nothing() {
        let manager = user(Role::Manager);
        let mut qb = QueryBuilder::new("SELECT * FROM leads l WHERE 1=1");
        push_scope(&mut qb, EntityKind::Lead, scope_for(&manager));
        assert_eq!(qb.sql(), "SELECT * FROM leads l WHERE 1=1");
    }

    #[test]
    fn agent_scope_restricts_leads_to_owner() {
        let agent = user(Role::Agent);
        let mut qb = QueryBuilder::new("SELECT * FROM leads l WHERE 1=1");
        push_scope(&mut qb, EntityKind::Lead, scope_for(&agent));
        assert_eq!(qb.sql(), "SELECT * FROM leads l WHERE 1=1 AND l.owner_id = $1");
    }

    #[test]
    fn agent_scope_resolves_ownership_chain_per_kind() {
        let agent = user(Role::Agent);
        let cases = [
            (EntityKind::Contact, "c.linked_lead_id IN (SELECT id FROM leads"),
            (EntityKind::Note, "n.lead_id IN (SELECT id FROM leads"),
            (EntityKind::Reminder, "r.lead_id IN (SELECT id FROM leads"),
            (EntityKind::Correspondence, "co.contact_id IN (SELECT ct.id FROM contacts"),
            (EntityKind::AuditTrail, "a.user_id = $1"),
        ];
        for (kind, fragment) in cases {
            let mut qb = QueryBuilder::new("SELECT 1 WHERE 1=1");
            push_scope(&mut qb, kind, scope_for(&agent));
            assert!(
                qb.sql().contains(fragment),
                "kind {kind:?}: esperado `{fragment}` em `{}`",
                qb.sql()
            );
        }
    }

    #[test]
    fn manager_can_do_anything() {
        let manager = user(Role::Manager);
        let someone_else = Uuid::new_v4();
        for kind in [
            EntityKind::Lead,
            EntityKind::Contact,
            EntityKind::Note,
            EntityKind::Reminder,
            EntityKind::Correspondence,
        ] {
            for op in [Operation::Create, Operation::Update, Operation::Delete] {
                assert!(can_mutate(&manager, kind, someone_else, op).is_ok());
            }
        }
    }

    #[test]
    fn agent_can_never_delete_leads_or_contacts() {
        let agent = user(Role::Agent);
        // Nem quando a cadeia de posse é dele mesmo.
        let err = can_mutate(&agent, EntityKind::Lead, agent.id, Operation::Delete).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "Agents cannot delete leads"));
        let err = can_mutate(&agent, EntityKind::Contact, agent.id, Operation::Delete).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "Agents cannot delete contacts"));
    }

    #[test]
    fn agent_mutations_require_chain_ownership() {
        let agent = user(Role::Agent);
        let someone_else = Uuid::new_v4();

        assert!(can_mutate(&agent, EntityKind::Note, agent.id, Operation::Create).is_ok());
        assert!(can_mutate(&agent, EntityKind::Note, agent.id, Operation::Delete).is_ok());
        assert!(can_mutate(&agent, EntityKind::Lead, agent.id, Operation::Update).is_ok());

        let err =
            can_mutate(&agent, EntityKind::Note, someone_else, Operation::Create).unwrap_err();
        assert!(
            matches!(err, AppError::Forbidden(ref m) if m == "You can only create notes for your own leads")
        );
        let err =
            can_mutate(&agent, EntityKind::Reminder, someone_else, Operation::Update).unwrap_err();
        assert!(
            matches!(err, AppError::Forbidden(ref m) if m == "You can only update reminders for your own leads")
        );
    }

    #[test]
    fn lead_creation_is_open_to_any_authenticated_user() {
        let agent = user(Role::Agent);
        assert!(can_mutate(&agent, EntityKind::Lead, Uuid::new_v4(), Operation::Create).is_ok());
    }

    #[test]
    fn summary_visibility_follows_ownership() {
        let agent = user(Role::Agent);
        let manager = user(Role::Manager);
        assert!(can_view_lead(&agent, agent.id));
        assert!(!can_view_lead(&agent, Uuid::new_v4()));
        assert!(can_view_lead(&manager, Uuid::new_v4()));
    }
}
