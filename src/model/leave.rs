use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, ToSchema)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Leave request. `approved_by` is populated exactly when the status is
/// `Approved`.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Leave {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "jdoe")]
    pub user_name: String,
    #[schema(example = "Sick")]
    pub leave_type: String,
    #[schema(example = 2)]
    pub total_day: u32,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-06", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub reason: String,
    #[schema(value_type = String)]
    pub request_date: NaiveDateTime,
    #[schema(example = "Pending")]
    pub status: String,
    pub approved_by: Option<u64>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_parses_capitalized_values_only() {
        assert_eq!(LeaveStatus::from_str("Pending").unwrap(), LeaveStatus::Pending);
        assert_eq!(LeaveStatus::from_str("Approved").unwrap(), LeaveStatus::Approved);
        assert_eq!(LeaveStatus::from_str("Rejected").unwrap(), LeaveStatus::Rejected);
        // lowercase variants are rejected across the whole API
        assert!(LeaveStatus::from_str("approved").is_err());
        assert!(LeaveStatus::from_str("pending").is_err());
    }
}
