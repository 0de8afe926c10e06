// src/handlers/mod.rs
pub mod analytics;
pub mod auth;
pub mod chat;
pub mod meditation;
