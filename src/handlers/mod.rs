// src/handlers/mod.rs

pub mod auth;
pub mod comments;
pub mod explore;
pub mod films;
pub mod follows;
pub mod interaction;
pub mod notifications;
pub mod profile;
pub mod series;
