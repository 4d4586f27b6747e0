pub mod auth;
pub mod response;

pub use auth::{authenticate, authorize, AuthUser, ADMIN_ONLY};
pub use response::{ApiResponse, ApiResult, Message};
