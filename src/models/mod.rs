// src/models/mod.rs
pub mod analytics;
pub mod auth;
pub mod chat;
