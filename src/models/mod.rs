// src/models/mod.rs

pub mod comment;
pub mod film;
pub mod follow;
pub mod notification;
pub mod series;
pub mod user;
