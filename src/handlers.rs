pub mod audit;
pub mod auth;
pub mod contact;
pub mod correspondence;
pub mod dashboard;
pub mod lead;
pub mod note;
pub mod reminder;
