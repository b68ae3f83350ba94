pub mod auth;
pub mod client_meta;
