mod handlers;
mod types;

pub use handlers::{create_user, current_user, delete_user, list_users};
pub use types::{CreateUserRequest, DeleteUserResponse, UserPage, UserResponse};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{__path_create_user, __path_current_user, __path_delete_user, __path_list_users};
