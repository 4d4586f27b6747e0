// handlers/mod.rs - Request handlers grouped by access tier
//
// Public (no auth) → Protected (authenticate, some routes also authorize ADMIN)
pub mod protected;
pub mod public;
pub mod validation;
