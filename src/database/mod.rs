pub mod articles;
pub mod categories;
pub mod manager;
pub mod models;
pub mod organizations;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
