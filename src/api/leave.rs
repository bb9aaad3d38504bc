use std::str::FromStr;

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::user::fetch_user;
use crate::auth::principal::Principal;
use crate::envelope::{ErrorEnvelope, Pagination, SuccessEnvelope};
use crate::error::{ApiError, check_valid};
use crate::model::leave::{Leave, LeaveStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveReq {
    #[schema(example = "Sick")]
    #[validate(length(min = 1, message = "Leave type is required"))]
    pub leave_type: String,
    #[schema(example = 2)]
    #[validate(range(min = 1, message = "Total day must be a positive integer"))]
    pub total_day: u32,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-06", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,
    /// Defaults to `Pending`.
    #[schema(example = "Pending")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaveReq {
    pub leave_type: Option<String>,
    #[validate(range(min = 1, message = "Total day must be a positive integer"))]
    pub total_day: Option<u32>,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-06", value_type = String, format = "date")]
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaveStatusReq {
    #[schema(example = "Approved")]
    pub status: String,
    /// Admin id; required when status is `Approved`.
    pub approved_by: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListLeavesQuery {
    /// 1-based page number
    pub page: Option<i64>,
    /// Items per page
    pub page_size: Option<i64>,
    /// Filter by leave status (Pending | Approved | Rejected)
    pub status: Option<String>,
}

async fn fetch_leave(pool: &MySqlPool, id: u64) -> Result<Option<Leave>, ApiError> {
    Ok(sqlx::query_as::<_, Leave>("SELECT * FROM leaves WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Create a leave request for a user
#[utoipa::path(
    post,
    path = "/api/user/createLeaves/{userId}",
    params(("userId", description = "User ID")),
    request_body = CreateLeaveReq,
    responses(
        (status = 201, description = "Leave request created successfully", body = Leave),
        (status = 404, description = "User not found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_user_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateLeaveReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;
    let user_id = path.into_inner();

    let user = fetch_user(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let status = match &payload.status {
        Some(raw) => LeaveStatus::from_str(raw)
            .map_err(|_| ApiError::Validation("Invalid status".into()))?,
        None => LeaveStatus::Pending,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO leaves (user_id, user_name, leave_type, total_day, start_date, end_date, reason, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&user.user_name)
    .bind(&payload.leave_type)
    .bind(payload.total_day)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.reason)
    .bind(status.to_string())
    .execute(pool.get_ref())
    .await?;

    let leave = fetch_leave(pool.get_ref(), result.last_insert_id())
        .await?
        .ok_or_else(ApiError::internal)?;

    Ok(HttpResponse::Created().json(SuccessEnvelope::new(
        leave,
        201,
        "Leave request created successfully",
    )))
}

/// List leave requests, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/user/getAllLeaveRequests",
    params(ListLeavesQuery),
    responses(
        (status = 200, description = "Leave requests retrieved successfully", body = Object),
        (status = 400, description = "Invalid status parameter", body = ErrorEnvelope),
        (status = 404, description = "No leave requests found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_all_leave_requests(
    pool: web::Data<MySqlPool>,
    query: web::Query<ListLeavesQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(10).max(1);
    let offset = (page - 1) * page_size;

    let status = match &query.status {
        Some(raw) => Some(
            LeaveStatus::from_str(raw)
                .map_err(|_| ApiError::Validation("Invalid status parameter".into()))?,
        ),
        None => None,
    };

    let (total, leaves) = match status {
        Some(status) => {
            let status = status.to_string();
            let total =
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leaves WHERE status = ?")
                    .bind(&status)
                    .fetch_one(pool.get_ref())
                    .await?;
            let leaves = sqlx::query_as::<_, Leave>(
                "SELECT * FROM leaves WHERE status = ? ORDER BY id LIMIT ? OFFSET ?",
            )
            .bind(&status)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool.get_ref())
            .await?;
            (total, leaves)
        }
        None => {
            let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leaves")
                .fetch_one(pool.get_ref())
                .await?;
            let leaves =
                sqlx::query_as::<_, Leave>("SELECT * FROM leaves ORDER BY id LIMIT ? OFFSET ?")
                    .bind(page_size)
                    .bind(offset)
                    .fetch_all(pool.get_ref())
                    .await?;
            (total, leaves)
        }
    };

    if leaves.is_empty() {
        return Err(ApiError::NotFound("No leave requests found".into()));
    }

    Ok(HttpResponse::Ok().json(SuccessEnvelope::paginated(
        leaves,
        200,
        "Leave requests retrieved successfully",
        Pagination::new(page, page_size, total),
    )))
}

/// Get a leave request by id
#[utoipa::path(
    get,
    path = "/api/user/leaveRequest/{id}",
    params(("id", description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request retrieved successfully", body = Leave),
        (status = 404, description = "Leave request not found", body = ErrorEnvelope)
    ),
    tag = "Leave"
)]
pub async fn get_leave_request(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let leave = fetch_leave(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Leave request not found".into()))?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        leave,
        200,
        "Leave request retrieved successfully",
    )))
}

/// Edit the fields of a leave request
#[utoipa::path(
    put,
    path = "/api/user/updateLeaveRequest/{id}",
    params(("id", description = "Leave request ID")),
    request_body = UpdateLeaveReq,
    responses(
        (status = 200, description = "Leave request updated successfully", body = Leave),
        (status = 404, description = "Leave request not found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave_request(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;
    let leave_id = path.into_inner();

    if fetch_leave(pool.get_ref(), leave_id).await?.is_none() {
        return Err(ApiError::NotFound("Leave request not found".into()));
    }

    sqlx::query(
        r#"
        UPDATE leaves SET
            leave_type = COALESCE(?, leave_type),
            total_day = COALESCE(?, total_day),
            start_date = COALESCE(?, start_date),
            end_date = COALESCE(?, end_date),
            reason = COALESCE(?, reason)
        WHERE id = ?
        "#,
    )
    .bind(&payload.leave_type)
    .bind(payload.total_day)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.reason)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await?;

    let leave = fetch_leave(pool.get_ref(), leave_id)
        .await?
        .ok_or_else(ApiError::internal)?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        leave,
        200,
        "Leave request updated successfully",
    )))
}

/// Delete a leave request
#[utoipa::path(
    delete,
    path = "/api/user/deleteLeaveRequest/{id}",
    params(("id", description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request deleted successfully", body = Leave),
        (status = 404, description = "Leave request not found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn delete_leave_request(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let leave = fetch_leave(pool.get_ref(), leave_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Leave request not found".into()))?;

    sqlx::query("DELETE FROM leaves WHERE id = ?")
        .bind(leave_id)
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        leave,
        200,
        "Leave request deleted successfully",
    )))
}

/// Approve or reject a leave request
///
/// `Approved` requires and records the approving admin; other statuses leave
/// `approvedBy` untouched.
#[utoipa::path(
    put,
    path = "/api/user/leaveStatus/{leaveId}",
    params(("leaveId", description = "Leave request ID")),
    request_body = UpdateLeaveStatusReq,
    responses(
        (status = 200, description = "Leave request updated successfully", body = Leave),
        (status = 400, description = "Invalid status value / ApprovedBy missing", body = ErrorEnvelope),
        (status = 404, description = "Leave request not found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave_status(
    admin: Principal,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveStatusReq>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let status = LeaveStatus::from_str(&payload.status)
        .map_err(|_| ApiError::Validation("Invalid status value".into()))?;
    if status == LeaveStatus::Pending {
        return Err(ApiError::Validation("Invalid status value".into()));
    }

    if fetch_leave(pool.get_ref(), leave_id).await?.is_none() {
        return Err(ApiError::NotFound("Leave request not found".into()));
    }

    if status == LeaveStatus::Approved {
        let approved_by = payload.approved_by.ok_or_else(|| {
            ApiError::Validation("ApprovedBy is required when status is Approved".into())
        })?;
        sqlx::query("UPDATE leaves SET status = ?, approved_by = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(approved_by)
            .bind(leave_id)
            .execute(pool.get_ref())
            .await?;
    } else {
        sqlx::query("UPDATE leaves SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(leave_id)
            .execute(pool.get_ref())
            .await?;
    }

    let leave = fetch_leave(pool.get_ref(), leave_id)
        .await?
        .ok_or_else(ApiError::internal)?;

    info!(
        admin = %admin.username,
        leave_id,
        status = %status,
        "leave status updated"
    );

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        leave,
        200,
        "Leave request updated successfully",
    )))
}

/// List the leave applications of one user
#[utoipa::path(
    get,
    path = "/api/leaves/{userId}",
    params(("userId", description = "User ID")),
    responses(
        (status = 200, description = "Leave applications for the user", body = Object)
    ),
    tag = "Leave"
)]
pub async fn user_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leaves WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool.get_ref())
        .await?;

    if count == 0 {
        return Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
            count,
            200,
            format!("No leave applications found for user with ID {user_id}"),
        )));
    }

    let leaves = sqlx::query_as::<_, Leave>("SELECT * FROM leaves WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        leaves,
        200,
        format!("Found {count} leave applications for user with ID {user_id}"),
    )))
}
