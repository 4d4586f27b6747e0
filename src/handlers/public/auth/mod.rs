// handlers/public/auth/mod.rs - Token acquisition and first-run setup
pub mod login;
pub mod seed;

pub use login::login_post;
pub use seed::seed_post;
