pub mod access;
pub mod audit;
pub mod auth;
pub mod summary;

pub use audit::AuditRecorder;
pub use auth::AuthService;
pub use summary::SummaryService;
