// handlers/public/mod.rs - handlers that need no authentication

pub mod auth;
pub mod health;

pub use health::{health, root};
