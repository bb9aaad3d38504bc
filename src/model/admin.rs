use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

/// Admin account. Independent root; owns no child records.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[schema(example = 1)]
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "hr-admin")]
    pub user_name: String,
    #[serde(skip_serializing)]
    #[schema(write_only)]
    pub password: String,
    #[schema(example = "Admin")]
    pub roles: String,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}
