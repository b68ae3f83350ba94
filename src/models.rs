pub mod auth;
pub mod lead;
pub use lead::Lead;
pub mod contact;
pub use contact::Contact;
pub mod note;
pub use note::Note;
pub mod reminder;
pub use reminder::Reminder;
pub mod correspondence;
pub use correspondence::Correspondence;
pub mod audit;
pub mod dashboard;
