use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

pub mod admin;
pub mod attendance;
pub mod document;
pub mod leave;
pub mod user;

/// Credentials payload shared by the admin and user login endpoints.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginReq {
    #[schema(example = "jdoe")]
    #[validate(length(min = 1, message = "userName is required"))]
    pub user_name: String,
    #[schema(example = "s3cret-pw")]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}
