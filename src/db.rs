pub mod user_repo;
pub use user_repo::UserRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod contact_repo;
pub use contact_repo::ContactRepository;
pub mod note_repo;
pub use note_repo::NoteRepository;
pub mod reminder_repo;
pub use reminder_repo::ReminderRepository;
pub mod correspondence_repo;
pub use correspondence_repo::CorrespondenceRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
