pub mod auth;
pub mod json;
pub mod response;
pub mod validate_user;

pub use auth::{jwt_auth_middleware, AuthUser, TOKEN_HEADER};
pub use json::JsonBody;
pub use response::{ApiResponse, ApiResult, Message};
pub use validate_user::require_admin;
