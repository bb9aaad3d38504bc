use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::LoginReq;
use crate::auth::jwt::issue_token;
use crate::auth::password::{hash_password, verify_password};
use crate::config::Config;
use crate::envelope::{ErrorEnvelope, Pagination, SuccessEnvelope};
use crate::error::{ApiError, check_valid, conflict_on_duplicate_key};
use crate::model::attendance::Attendance;
use crate::model::document::Document;
use crate::model::leave::Leave;
use crate::model::role::{Role, join_roles};
use crate::model::user::User;
use crate::storage::StorageClient;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    #[schema(example = "EMP-1024")]
    #[validate(length(min = 1, message = "Employee ID is required"))]
    pub emp_id: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[schema(example = "jdoe")]
    #[validate(length(min = 1, message = "Username is required"))]
    pub user_name: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[schema(example = "8801712345678")]
    #[validate(length(min = 10, max = 13, message = "Phone number is not valid"))]
    pub phone: String,
    #[validate(length(min = 10, max = 80, message = "Address should be between 10 and 80 characters"))]
    pub address: String,
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date_of_joining: NaiveDate,
    #[validate(length(min = 1, message = "Blood group is required"))]
    pub blood_group: String,
    #[schema(example = "1995-06-15", value_type = String, format = "date")]
    pub date_of_birth: NaiveDate,
    #[validate(length(min = 1, message = "Team is required"))]
    pub team: String,
    #[validate(length(min = 1, message = "Designation is required"))]
    pub designation: String,
    /// Embedded file payload; stored through the object-storage provider.
    #[validate(length(min = 1, message = "Avatar is required"))]
    pub avatar: String,
    #[schema(example = json!(["User"]))]
    pub roles: Option<Vec<Role>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserReq {
    pub emp_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_name: Option<String>,
    #[validate(length(min = 10, max = 13, message = "Invalid phone number"))]
    pub phone: Option<String>,
    #[validate(length(min = 10, max = 80, message = "Address should be between 10 and 80 characters"))]
    pub address: Option<String>,
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date_of_joining: Option<NaiveDate>,
    pub blood_group: Option<String>,
    #[schema(example = "1995-06-15", value_type = String, format = "date")]
    pub date_of_birth: Option<NaiveDate>,
    pub team: Option<String>,
    pub designation: Option<String>,
    /// Re-uploaded when present; the stored URL is kept otherwise.
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// 1-based page number
    pub page: Option<i64>,
    /// Items per page
    pub page_size: Option<i64>,
    /// Case-insensitive substring match on username
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordReq {
    pub user_id: u64,
    #[validate(length(min = 1, message = "Old password is required"))]
    pub old_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "Confirm password is required"))]
    pub confirm_password: String,
}

// insert-race fallback messages, matched against the unique key the driver
// reports as violated
const USER_UNIQUE_KEYS: &[(&str, &str)] = &[
    ("user_name", "Username already exists"),
    ("emp_id", "Employee ID already exists"),
    ("phone", "Phone number already exists"),
];

async fn user_field_taken(
    pool: &MySqlPool,
    column: &str,
    value: &str,
    exclude_id: Option<u64>,
) -> Result<bool, ApiError> {
    // column names are internal constants, never client input
    let sql = match exclude_id {
        Some(_) => format!("SELECT EXISTS(SELECT 1 FROM users WHERE {column} = ? AND id <> ?)"),
        None => format!("SELECT EXISTS(SELECT 1 FROM users WHERE {column} = ?)"),
    };

    let mut query = sqlx::query_scalar::<_, bool>(&sql).bind(value);
    if let Some(id) = exclude_id {
        query = query.bind(id);
    }
    Ok(query.fetch_one(pool).await?)
}

pub(crate) async fn fetch_user(pool: &MySqlPool, id: u64) -> Result<Option<User>, ApiError> {
    Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Create User
///
/// Uniqueness is checked in order username, employee id, phone; the avatar
/// must upload successfully before the record is persisted.
#[utoipa::path(
    post,
    path = "/api/admin/createUser",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, description = "Username / employee ID / phone already exists", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn create_user(
    pool: web::Data<MySqlPool>,
    storage: web::Data<StorageClient>,
    payload: web::Json<CreateUserReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;

    if user_field_taken(pool.get_ref(), "user_name", &payload.user_name, None).await? {
        return Err(ApiError::Conflict("Username already exists".into()));
    }
    if user_field_taken(pool.get_ref(), "emp_id", &payload.emp_id, None).await? {
        return Err(ApiError::Conflict("Employee ID already exists".into()));
    }
    if user_field_taken(pool.get_ref(), "phone", &payload.phone, None).await? {
        return Err(ApiError::Conflict("Phone number already exists".into()));
    }

    let avatar_url = storage.upload(&payload.avatar).await?;

    let hashed = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "password hashing failed");
        ApiError::internal()
    })?;
    let roles = match &payload.roles {
        Some(roles) if !roles.is_empty() => join_roles(roles),
        _ => Role::User.to_string(),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO users
        (emp_id, first_name, last_name, user_name, password, phone, address,
         date_of_joining, blood_group, date_of_birth, team, designation, avatar, roles)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.emp_id)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.user_name)
    .bind(&hashed)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(payload.date_of_joining)
    .bind(&payload.blood_group)
    .bind(payload.date_of_birth)
    .bind(&payload.team)
    .bind(&payload.designation)
    .bind(&avatar_url)
    .bind(&roles)
    .execute(pool.get_ref())
    .await
    .map_err(|e| conflict_on_duplicate_key(e, USER_UNIQUE_KEYS, "User already exists"))?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(result.last_insert_id())
        .fetch_one(pool.get_ref())
        .await?;

    info!(user_id = user.id, "user created");

    Ok(HttpResponse::Created().json(SuccessEnvelope::new(
        user,
        201,
        "User created successfully",
    )))
}

/// User login
#[utoipa::path(
    post,
    path = "/api/user-login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "User login successfully", body = Object, example = json!({
            "data": {"id": 7, "userName": "jdoe", "accessToken": "<jwt>", "userType": "User"},
            "success": true,
            "responseCode": 200,
            "message": "User login successfully"
        })),
        (status = 400, description = "Invalid userName or Password", body = ErrorEnvelope)
    ),
    tag = "User"
)]
#[instrument(name = "user_login", skip(pool, config, payload), fields(username = %payload.user_name))]
pub async fn login_user(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<LoginReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;

    debug!("fetching user");
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_name = ?")
        .bind(&payload.user_name)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::Validation("Invalid userName or Password".into()))?;

    if verify_password(&payload.password, &user.password).is_err() {
        info!("invalid credentials: password mismatch");
        return Err(ApiError::Validation("Invalid userName or Password".into()));
    }

    let access_token = issue_token(
        user.id,
        user.user_name.clone(),
        Role::User,
        &config.jwt_secret,
        config.token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "token issuance failed");
        ApiError::internal()
    })?;

    info!(user_id = user.id, "user login successful");

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        json!({
            "id": user.id,
            "userName": user.user_name,
            "accessToken": access_token,
            "userType": "User",
        }),
        200,
        "User login successfully",
    )))
}

/// Get a user together with its leave, attendance and document records
#[utoipa::path(
    get,
    path = "/api/user/{id}",
    params(("id", description = "User ID")),
    responses(
        (status = 200, description = "User and owned records", body = Object),
        (status = 400, description = "User not found", body = ErrorEnvelope)
    ),
    tag = "User"
)]
pub async fn get_user(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let user = fetch_user(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::Validation("User not found".into()))?;

    let leave_data = sqlx::query_as::<_, Leave>("SELECT * FROM leaves WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool.get_ref())
        .await?;
    let attendance_data =
        sqlx::query_as::<_, Attendance>("SELECT * FROM attendance WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(pool.get_ref())
            .await?;
    let document_data = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        json!({
            "user": user,
            "leaveData": leave_data,
            "attendanceData": attendance_data,
            "documentData": document_data,
        }),
        200,
        "User and leave data fetched successfully",
    )))
}

/// List users with pagination and username search
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Paginated user list", body = Object),
        (status = 400, description = "No users found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn get_all_users(
    pool: web::Data<MySqlPool>,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(10).max(1);
    let offset = (page - 1) * page_size;
    let search = query.search.clone().unwrap_or_default();

    let (total, users) = if search.is_empty() {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool.get_ref())
            .await?;
        let users =
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id LIMIT ? OFFSET ?")
                .bind(page_size)
                .bind(offset)
                .fetch_all(pool.get_ref())
                .await?;
        (total, users)
    } else {
        let like = format!("%{search}%");
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE user_name LIKE ?")
                .bind(&like)
                .fetch_one(pool.get_ref())
                .await?;
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE user_name LIKE ? ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(&like)
        .bind(page_size)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;
        (total, users)
    };

    if users.is_empty() {
        return Err(ApiError::Validation("No users found".into()));
    }

    Ok(HttpResponse::Ok().json(SuccessEnvelope::paginated(
        users,
        200,
        "Users fetched successfully",
        Pagination::new(page, page_size, total),
    )))
}

/// Update user profile fields
#[utoipa::path(
    put,
    path = "/api/admin/update-user/{userId}",
    params(("userId", description = "User ID")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "User updated successfully", body = User),
        (status = 400, description = "User Not Found / uniqueness violation", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update_user(
    pool: web::Data<MySqlPool>,
    storage: web::Data<StorageClient>,
    path: web::Path<u64>,
    payload: web::Json<UpdateUserReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;
    let user_id = path.into_inner();

    let user = fetch_user(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::Validation("User Not Found".into()))?;

    // uniqueness checks exclude the record being updated
    if let Some(user_name) = &payload.user_name {
        if user_field_taken(pool.get_ref(), "user_name", user_name, Some(user_id)).await? {
            return Err(ApiError::Conflict("Username already exists".into()));
        }
    }
    if let Some(phone) = &payload.phone {
        if user_field_taken(pool.get_ref(), "phone", phone, Some(user_id)).await? {
            return Err(ApiError::Conflict("Phone number already exists".into()));
        }
    }
    if let Some(emp_id) = &payload.emp_id {
        if user_field_taken(pool.get_ref(), "emp_id", emp_id, Some(user_id)).await? {
            return Err(ApiError::Conflict("Employee ID already exists".into()));
        }
    }

    let avatar_url = match &payload.avatar {
        Some(file) => Some(storage.upload(file).await?),
        None => user.avatar.clone(),
    };

    sqlx::query(
        r#"
        UPDATE users SET
            emp_id = COALESCE(?, emp_id),
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            user_name = COALESCE(?, user_name),
            phone = COALESCE(?, phone),
            address = COALESCE(?, address),
            date_of_joining = COALESCE(?, date_of_joining),
            blood_group = COALESCE(?, blood_group),
            date_of_birth = COALESCE(?, date_of_birth),
            team = COALESCE(?, team),
            designation = COALESCE(?, designation),
            avatar = COALESCE(?, avatar)
        WHERE id = ?
        "#,
    )
    .bind(&payload.emp_id)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.user_name)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(payload.date_of_joining)
    .bind(&payload.blood_group)
    .bind(payload.date_of_birth)
    .bind(&payload.team)
    .bind(&payload.designation)
    .bind(&avatar_url)
    .bind(user_id)
    .execute(pool.get_ref())
    .await?;

    let updated = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        updated,
        200,
        "User updated successfully",
    )))
}

/// Delete a user and cascade over its leave, attendance and document records
#[utoipa::path(
    delete,
    path = "/api/admin/delete-user/{id}",
    params(("id", description = "User ID")),
    responses(
        (status = 200, description = "User and associated data deleted successfully", body = Object, example = json!({
            "data": {"userDeleted": 1, "leaveDeleted": 3, "attendanceDeleted": 12, "documentDeleted": 2},
            "success": true,
            "responseCode": 200,
            "message": "User and associated data deleted successfully"
        })),
        (status = 404, description = "User not found", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn delete_user(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    if fetch_user(pool.get_ref(), user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".into()));
    }

    // single transaction so a partial cascade never commits
    let mut tx = pool.begin().await?;

    let leaves = sqlx::query("DELETE FROM leaves WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let attendance = sqlx::query("DELETE FROM attendance WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let documents = sqlx::query("DELETE FROM documents WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let user_deleted = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    info!(
        user_id,
        leaves, attendance, documents, "user and associated data deleted"
    );

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        json!({
            "userDeleted": user_deleted,
            "leaveDeleted": leaves,
            "attendanceDeleted": attendance,
            "documentDeleted": documents,
        }),
        200,
        "User and associated data deleted successfully",
    )))
}

/// Reset a user password
#[utoipa::path(
    post,
    path = "/api/reset-password",
    request_body = ResetPasswordReq,
    responses(
        (status = 200, description = "Password Reset Successfully"),
        (status = 400, description = "Validation failure", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn reset_password(
    pool: web::Data<MySqlPool>,
    payload: web::Json<ResetPasswordReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;

    if payload.password != payload.confirm_password {
        return Err(ApiError::Validation(
            "New password and confirm password do not match".into(),
        ));
    }

    let user = fetch_user(pool.get_ref(), payload.user_id)
        .await?
        .ok_or_else(|| ApiError::Validation("User Not Found".into()))?;

    if verify_password(&payload.old_password, &user.password).is_err() {
        return Err(ApiError::Validation("Invalid old password".into()));
    }

    let hashed = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "password hashing failed");
        ApiError::internal()
    })?;

    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(&hashed)
        .bind(payload.user_id)
        .execute(pool.get_ref())
        .await?;

    info!(user_id = payload.user_id, "password reset");

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        serde_json::Value::Null,
        200,
        "Password Reset Successfully",
    )))
}
