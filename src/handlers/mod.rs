// handlers/mod.rs - two security tiers
//
// Public (no auth) -> Protected (access token required)

pub mod protected;
pub mod public;
