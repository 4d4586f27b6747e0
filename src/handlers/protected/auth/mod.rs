// handlers/protected/auth/mod.rs - Authenticated account endpoints
pub mod me;

pub use me::me_get;
