use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::LoginReq;
use crate::auth::jwt::issue_token;
use crate::auth::password::{hash_password, verify_password};
use crate::config::Config;
use crate::envelope::{ErrorEnvelope, SuccessEnvelope};
use crate::error::{ApiError, check_valid, conflict_on_duplicate};
use crate::model::admin::Admin;
use crate::model::role::{Role, join_roles};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminReq {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[schema(example = "hr-admin")]
    #[validate(length(min = 4, message = "Username must be at least 4 characters long"))]
    pub user_name: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[schema(example = json!(["Admin"]))]
    pub roles: Option<Vec<Role>>,
}

/// Create Admin
#[utoipa::path(
    post,
    path = "/api/admin-create",
    request_body = CreateAdminReq,
    responses(
        (status = 201, description = "Admin created successfully", body = Admin),
        (status = 400, description = "Admin Already Exists", body = ErrorEnvelope),
        (status = 500, description = "Internal server error")
    ),
    tag = "Admin"
)]
pub async fn create_admin(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAdminReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;

    let existing = sqlx::query_scalar::<_, u64>("SELECT id FROM admins WHERE user_name = ?")
        .bind(&payload.user_name)
        .fetch_optional(pool.get_ref())
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Admin Already Exists".into()));
    }

    let hashed = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "password hashing failed");
        ApiError::internal()
    })?;
    let roles = match &payload.roles {
        Some(roles) if !roles.is_empty() => join_roles(roles),
        _ => Role::Admin.to_string(),
    };

    let result = sqlx::query(
        "INSERT INTO admins (first_name, last_name, user_name, password, roles) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.user_name)
    .bind(&hashed)
    .bind(&roles)
    .execute(pool.get_ref())
    .await
    .map_err(|e| conflict_on_duplicate(e, "Admin Already Exists"))?;

    let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
        .bind(result.last_insert_id())
        .fetch_one(pool.get_ref())
        .await?;

    info!(admin_id = admin.id, "admin account created");

    Ok(HttpResponse::Created().json(SuccessEnvelope::new(
        admin,
        201,
        "Admin created successfully",
    )))
}

/// Admin login
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Admin login successfully", body = Object, example = json!({
            "data": {"id": 1, "userName": "hr-admin", "accessToken": "<jwt>", "userType": "Admin"},
            "success": true,
            "responseCode": 200,
            "message": "Admin login successfully"
        })),
        (status = 400, description = "Invalid username or password", body = ErrorEnvelope)
    ),
    tag = "Admin"
)]
#[instrument(name = "admin_login", skip(pool, config, payload), fields(username = %payload.user_name))]
pub async fn login_admin(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<LoginReq>,
) -> Result<HttpResponse, ApiError> {
    check_valid(&*payload)?;

    let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE user_name = ?")
        .bind(&payload.user_name)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::Validation("Admin Does Not Exist".into()))?;

    if verify_password(&payload.password, &admin.password).is_err() {
        info!("invalid credentials: password mismatch");
        return Err(ApiError::Validation("Invalid username or password".into()));
    }

    let access_token = issue_token(
        admin.id,
        admin.user_name.clone(),
        Role::Admin,
        &config.jwt_secret,
        config.token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "token issuance failed");
        ApiError::internal()
    })?;

    info!(admin_id = admin.id, "admin login successful");

    Ok(HttpResponse::Ok().json(SuccessEnvelope::new(
        json!({
            "id": admin.id,
            "userName": admin.user_name,
            "accessToken": access_token,
            "userType": "Admin",
        }),
        200,
        "Admin login successfully",
    )))
}
