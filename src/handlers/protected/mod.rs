// handlers/protected/mod.rs - handlers behind `require_auth`

pub mod auth;
pub mod leads;
