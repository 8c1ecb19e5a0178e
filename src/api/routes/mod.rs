//! API Routes
//!
//! Route handlers organized by functionality.

pub mod account;
pub mod chat;
pub mod health;
pub mod operations;
pub mod session;
pub mod settings;
pub mod tokens;
pub mod transfer;
