// handlers/protected/mod.rs - Handlers behind `authenticate`
//
// Every query is scoped to `AuthUser::org_id`. Mutating routes are mounted
// behind `authorize(ADMIN_ONLY)` in app.rs.
pub mod articles;
pub mod auth;
pub mod categories;
pub mod users;
