use chrono::NaiveDateTime;
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, ToSchema)]
pub enum AttendanceStatus {
    Present,
    Absent,
    #[strum(serialize = "On Leave")]
    OnLeave,
    Holiday,
}

/// Daily attendance entry; conceptually one row per (user, date). `entry_id`
/// is a generated uuid used by the admin update/delete endpoints.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "f6a7f3f2-8e1e-4a8f-9f5b-2c3d4e5f6a7b")]
    pub entry_id: String,
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "jdoe")]
    pub user_name: String,
    #[schema(example = "2026-01-05")]
    pub date: String,
    #[schema(example = "09:02")]
    pub entry_time: String,
    #[schema(example = "18:11")]
    pub exit_time: Option<String>,
    #[schema(example = "Present")]
    pub status: String,
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
    fn status_round_trips_including_spaced_label() {
        assert_eq!(AttendanceStatus::from_str("On Leave").unwrap(), AttendanceStatus::OnLeave);
        assert_eq!(AttendanceStatus::OnLeave.to_string(), "On Leave");
        assert!(AttendanceStatus::from_str("OnLeave").is_err());
        assert!(AttendanceStatus::from_str("present").is_err());
    }
}
