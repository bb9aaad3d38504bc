use std::collections::BTreeMap;
use std::str::FromStr;

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::user::fetch_user;
use crate::envelope::{ErrorEnvelope, Pagination, SuccessEnvelope};
use crate::error::{ApiError, check_valid};
use crate::model::attendance::{Attendance, AttendanceStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttendanceReq {
    #[schema(example = "2026-01-05")]
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    /// Exactly one of entryTime/exitTime per call.
    #[schema(example = "09:02")]
    pub entry_time: Option<String>,
    #[schema(example = "18:11")]
    pub exit_time: Option<String>,
    #[schema(example = "Present")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendanceReq {
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "entryTime is required"))]
    pub entry_time: String,
    #[validate(length(min = 1, message = "exitTime is required"))]
    pub exit_time: String,
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListAttendanceQuery {
    /// 1-based page number
    pub page: Option<i64>,
    /// Items per page
    pub limit: Option<i64>,
    /// Case-insensitive substring match on username
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ByDateQuery {
    /// Calendar date string, e.g. 2026-01-05
    pub date: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDetail {
    pub entry_id: String,
    pub date: String,
    pub entry_time: String,
    pub exit_time: Option<String>,
    pub status: String,
}

/// Per-user grouping used by the admin listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceGroup {
    pub user_id: u64,
    pub user_name: String,
    pub attendance_details: Vec<AttendanceDetail>,
}

pub(crate) enum EntryAction {
    /// Start the day: insert a new row carrying the entry time.
    Open,
    /// Close the day: set the exit time on the existing row.
    Close,
}

/// The one-of rule for attendance writes. With no row for (user, date) only
/// the entry-time path is valid; with an existing row only the exit-time path
/// is, and a duplicate entry time is rejected.
pub(crate) fn resolve_entry_action(
    has_existing: bool,
    entry_time: Option<&str>,
    exit_time: Option<&str>,
) -> Result<EntryAction, ApiError> {
    match (entry_time, exit_time) {
        (Some(_), Some(_)) => Err(ApiError::Validation(
            "Only one of Entry Time or Exit Time can be provided".into(),
        )),
        (None, None) => Err(ApiError::Validation(
            "Either Entry Time or Exit Time is required".into(),
        )),
        (Some(_), None) if has_existing => Err(ApiError::Validation(
            "Attendance record for this date already exists with entry time".into(),
        )),
        (Some(_), None) => Ok(EntryAction::Open),
        (None, Some(_)) if !has_existing => Err(ApiError::Validation(
            "No existing entry found for this date to add exit time".into(),
        )),
        (None, Some(_)) => Ok(EntryAction::Close),
    }
}

async fn fetch_by_entry_id(
    pool: &MySqlPool,
    entry_id: &str,
) -> Result<Option<Attendance>, ApiError> {
    Ok(
        sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE entry_id = ?")
            .bind(entry_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Record an entry or exit time for a user on a date
#[utoipa::path(
    post,
    path = "/api/user/createAttendance-record/{userId}",
    params(("userId", description = "User ID")),
    request_body = CreateAttendanceReq,
    responses(
        (status = 201, description = "Attendance record created or updated successfully", body = Attendance),
        (status = 400, description = "One-of rule violated / user not found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_create(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateAttendanceReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;
    let user_id = path.into_inner();

    let user = fetch_user(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::Validation("User not found".into()))?;

    let status = match &payload.status {
        Some(raw) => Some(
            AttendanceStatus::from_str(raw)
                .map_err(|_| ApiError::Validation("Invalid status value".into()))?,
        ),
        None => None,
    };

    let existing = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendance WHERE user_id = ? AND date = ?",
    )
    .bind(user_id)
    .bind(&payload.date)
    .fetch_optional(pool.get_ref())
    .await?;

    let action = resolve_entry_action(
        existing.is_some(),
        payload.entry_time.as_deref(),
        payload.exit_time.as_deref(),
    )?;

    let entry_id = match action {
        EntryAction::Open => {
            let entry_id = Uuid::new_v4().to_string();
            let status = status.unwrap_or(AttendanceStatus::Present);
            sqlx::query(
                r#"
                INSERT INTO attendance (entry_id, user_id, user_name, date, entry_time, status)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&entry_id)
            .bind(user_id)
            .bind(&user.user_name)
            .bind(&payload.date)
            .bind(payload.entry_time.as_deref())
            .bind(status.to_string())
            .execute(pool.get_ref())
            .await?;
            entry_id
        }
        EntryAction::Close => {
            // existing row guaranteed by resolve_entry_action
            let row = existing.ok_or_else(ApiError::internal)?;
            match status {
                Some(status) => {
                    sqlx::query("UPDATE attendance SET exit_time = ?, status = ? WHERE id = ?")
                        .bind(payload.exit_time.as_deref())
                        .bind(status.to_string())
                        .bind(row.id)
                        .execute(pool.get_ref())
                        .await?;
                }
                None => {
                    sqlx::query("UPDATE attendance SET exit_time = ? WHERE id = ?")
                        .bind(payload.exit_time.as_deref())
                        .bind(row.id)
                        .execute(pool.get_ref())
                        .await?;
                }
            }
            row.entry_id
        }
    };

    let attendance = fetch_by_entry_id(pool.get_ref(), &entry_id)
        .await?
        .ok_or_else(ApiError::internal)?;

    Ok(HttpResponse::Created().json(SuccessEnvelope::new(
        attendance,
        201,
        "Attendance record created or updated successfully",
    )))
}

/// Get an attendance record by id
#[utoipa::path(
    get,
    path = "/api/getAttendance/{id}",
    params(("id", description = "Attendance record ID")),
    responses(
        (status = 200, description = "Attendance record retrieved successfully for Id", body = Attendance),
        (status = 404, description = "Attendance record not found", body = ErrorEnvelope)
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let attendance = sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE id = ?")
        .bind(path.into_inner())
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Attendance record not found".into()))?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        attendance,
        200,
        "Attendance record retrieved successfully for Id",
    )))
}

/// List attendance records grouped per user
#[utoipa::path(
    get,
    path = "/api/user/getAllAttendance",
    params(ListAttendanceQuery),
    responses(
        (status = 200, description = "Attendance records retrieved successfully", body = Object),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_all_attendance(
    pool: web::Data<MySqlPool>,
    query: web::Query<ListAttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).max(1);
    let offset = (page - 1) * limit;
    let search = query.search.clone().unwrap_or_default();

    let (total, rows) = if search.is_empty() {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance")
            .fetch_one(pool.get_ref())
            .await?;
        let rows = sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendance ORDER BY user_id, id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;
        (total, rows)
    } else {
        let like = format!("%{search}%");
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE user_name LIKE ?")
                .bind(&like)
                .fetch_one(pool.get_ref())
                .await?;
        let rows = sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendance WHERE user_name LIKE ? ORDER BY user_id, id LIMIT ? OFFSET ?",
        )
        .bind(&like)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;
        (total, rows)
    };

    let mut grouped: BTreeMap<u64, AttendanceGroup> = BTreeMap::new();
    for row in rows {
        grouped
            .entry(row.user_id)
            .or_insert_with(|| AttendanceGroup {
                user_id: row.user_id,
                user_name: row.user_name.clone(),
                attendance_details: Vec::new(),
            })
            .attendance_details
            .push(AttendanceDetail {
                entry_id: row.entry_id,
                date: row.date,
                entry_time: row.entry_time,
                exit_time: row.exit_time,
                status: row.status,
            });
    }
    let groups: Vec<AttendanceGroup> = grouped.into_values().collect();

    Ok(HttpResponse::Ok().json(SuccessEnvelope::paginated(
        groups,
        200,
        "Attendance records retrieved successfully",
        Pagination::new(page, limit, total),
    )))
}

/// Replace an attendance record by entry id
#[utoipa::path(
    put,
    path = "/api/user/updateAttendance/{entryId}",
    params(("entryId", description = "Attendance entry ID")),
    request_body = UpdateAttendanceReq,
    responses(
        (status = 200, description = "Attendance record updated successfully", body = Attendance),
        (status = 404, description = "Attendance record not found for the provided entryId", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn update_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<UpdateAttendanceReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;
    let entry_id = path.into_inner();

    let status = AttendanceStatus::from_str(&payload.status)
        .map_err(|_| ApiError::Validation("Invalid status value".into()))?;

    let affected = sqlx::query(
        "UPDATE attendance SET date = ?, entry_time = ?, exit_time = ?, status = ? WHERE entry_id = ?",
    )
    .bind(&payload.date)
    .bind(&payload.entry_time)
    .bind(&payload.exit_time)
    .bind(status.to_string())
    .bind(&entry_id)
    .execute(pool.get_ref())
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(ApiError::NotFound(
            "Attendance record not found for the provided entryId".into(),
        ));
    }

    let attendance = fetch_by_entry_id(pool.get_ref(), &entry_id)
        .await?
        .ok_or_else(ApiError::internal)?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        attendance,
        200,
        "Attendance record updated successfully",
    )))
}

/// Delete an attendance record by entry id
#[utoipa::path(
    delete,
    path = "/api/user/deleteAttendance/{entryId}",
    params(("entryId", description = "Attendance entry ID")),
    responses(
        (status = 200, description = "Attendance record deleted successfully", body = Attendance),
        (status = 404, description = "Attendance record not found for the provided entryId", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let entry_id = path.into_inner();

    let attendance = fetch_by_entry_id(pool.get_ref(), &entry_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Attendance record not found for the provided entryId".into())
        })?;

    sqlx::query("DELETE FROM attendance WHERE entry_id = ?")
        .bind(&entry_id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        attendance,
        200,
        "Attendance record deleted successfully",
    )))
}

/// List attendance records of one user
#[utoipa::path(
    get,
    path = "/api/user-getAttendance/{userId}",
    params(("userId", description = "User ID")),
    responses(
        (status = 200, description = "Attendance records retrieved successfully for user", body = Object),
        (status = 404, description = "No attendance records found for this user", body = ErrorEnvelope)
    ),
    tag = "Attendance"
)]
pub async fn get_user_attendance(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let records =
        sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE user_id = ? ORDER BY id")
            .bind(path.into_inner())
            .fetch_all(pool.get_ref())
            .await?;

    if records.is_empty() {
        return Err(ApiError::NotFound(
            "No attendance records found for this user".into(),
        ));
    }

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        records,
        200,
        "Attendance records retrieved successfully for user",
    )))
}

/// List attendance records of one calendar date
#[utoipa::path(
    get,
    path = "/api/attendance/date",
    params(ByDateQuery),
    responses(
        (status = 200, description = "Attendance records retrieved successfully by date", body = Object),
        (status = 400, description = "Date parameter is required", body = ErrorEnvelope),
        (status = 404, description = "No attendance records found for the provided date", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_attendance_by_date(
    pool: web::Data<MySqlPool>,
    query: web::Query<ByDateQuery>,
) -> Result<HttpResponse, ApiError> {
    let date = query
        .date
        .as_deref()
        .filter(|date| !date.is_empty())
        .ok_or_else(|| ApiError::Validation("Date parameter is required".into()))?;

    let records =
        sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE date = ? ORDER BY id")
            .bind(date)
            .fetch_all(pool.get_ref())
            .await?;

    if records.is_empty() {
        return Err(ApiError::NotFound(
            "No attendance records found for the provided date".into(),
        ));
    }

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        records,
        200,
        "Attendance records retrieved successfully by date",
    )))
}

/// List attendance records with a given status
#[utoipa::path(
    get,
    path = "/api/attendance/status/{status}",
    params(("status", description = "Present | Absent | On Leave")),
    responses(
        (status = 200, description = "Attendance records retrieved successfully", body = Object),
        (status = 400, description = "Invalid status value", body = ErrorEnvelope),
        (status = 404, description = "No attendance records found for this status", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_attendance_by_status(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let status = path.into_inner();

    // Holiday is deliberately not queryable here
    if !matches!(status.as_str(), "Present" | "Absent" | "On Leave") {
        return Err(ApiError::Validation("Invalid status value".into()));
    }

    let records =
        sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE status = ? ORDER BY id")
            .bind(&status)
            .fetch_all(pool.get_ref())
            .await?;

    if records.is_empty() {
        return Err(ApiError::NotFound(
            "No attendance records found for this status".into(),
        ));
    }

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        records,
        200,
        "Attendance records retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: ApiError) -> String {
        err.to_string()
    }

    #[test]
    fn both_times_rejected() {
        for has_existing in [false, true] {
            let err = resolve_entry_action(has_existing, Some("09:00"), Some("18:00"))
                .err()
                .expect("both times must be rejected");
            assert_eq!(
                message(err),
                "Only one of Entry Time or Exit Time can be provided"
            );
        }
    }

    #[test]
    fn neither_time_rejected() {
        let err = resolve_entry_action(false, None, None).err().unwrap();
        assert_eq!(message(err), "Either Entry Time or Exit Time is required");
    }

    #[test]
    fn entry_time_opens_fresh_date() {
        assert!(matches!(
            resolve_entry_action(false, Some("09:00"), None),
            Ok(EntryAction::Open)
        ));
    }

    #[test]
    fn exit_time_without_existing_row_rejected() {
        let err = resolve_entry_action(false, None, Some("18:00")).err().unwrap();
        assert_eq!(
            message(err),
            "No existing entry found for this date to add exit time"
        );
    }

    #[test]
    fn duplicate_entry_time_rejected() {
        let err = resolve_entry_action(true, Some("09:00"), None).err().unwrap();
        assert_eq!(
            message(err),
            "Attendance record for this date already exists with entry time"
        );
    }

    #[test]
    fn exit_time_closes_existing_row() {
        assert!(matches!(
            resolve_entry_action(true, None, Some("18:00")),
            Ok(EntryAction::Close)
        ));
    }
}
