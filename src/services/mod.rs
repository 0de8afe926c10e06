// src/services/mod.rs
pub mod analytics;
pub mod auth;
pub mod chat;
pub mod conversation_log;
pub mod sentiment;

pub use auth::AuthService;
pub use conversation_log::ConversationLog;
