use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

/// Employee record. Aggregate root for leaves, attendance and documents;
/// deleting a user cascades over all three.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "EMP-1024")]
    pub emp_id: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "jdoe")]
    pub user_name: String,
    #[serde(skip_serializing)]
    #[schema(write_only)]
    pub password: String,
    #[schema(example = "8801712345678")]
    pub phone: String,
    pub address: String,
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date_of_joining: NaiveDate,
    #[schema(example = "O+")]
    pub blood_group: String,
    #[schema(example = "1995-06-15", value_type = String, format = "date")]
    pub date_of_birth: NaiveDate,
    pub team: String,
    pub designation: String,
    pub avatar: Option<String>,
    #[schema(example = "User")]
    pub roles: String,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}
