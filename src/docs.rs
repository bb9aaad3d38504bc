use crate::api::LoginReq;
use crate::api::admin::CreateAdminReq;
use crate::api::attendance::{
    AttendanceDetail, AttendanceGroup, CreateAttendanceReq, UpdateAttendanceReq,
};
use crate::api::document::{UpdateDocumentReq, UploadDocumentReq};
use crate::api::leave::{CreateLeaveReq, UpdateLeaveReq, UpdateLeaveStatusReq};
use crate::api::user::{CreateUserReq, ResetPasswordReq, UpdateUserReq};
use crate::envelope::{ErrorEnvelope, Pagination};
use crate::model::admin::Admin;
use crate::model::attendance::Attendance;
use crate::model::document::Document;
use crate::model::leave::Leave;
use crate::model::role::Role;
use crate::model::user::User;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS Backend API",
        version = "1.0.0",
        description = r#"
## Human Resource Management System

REST backend for day-to-day HR operations within an organization.

### 🔹 Key Features
- **User Management**
  - Create, search, update and delete employee profiles (admin only)
- **Leave Management**
  - Submit leave requests and approve/reject them with an approver trail
- **Attendance Management**
  - One record per user per day with entry/exit times and status filters
- **Document Management**
  - Upload employee documents to external storage and manage them per user

### 🔐 Security
Protected endpoints require **JWT Bearer authentication**.
Admin-only operations reject tokens that only carry the **User** role.

### 📦 Response Format
Every response carries a uniform envelope:
success bodies expose `data`, `success`, `responseCode` and `message`
(plus `pagination` on list endpoints); error bodies expose `errMessage`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::admin::create_admin,
        crate::api::admin::login_admin,

        crate::api::user::create_user,
        crate::api::user::login_user,
        crate::api::user::get_user,
        crate::api::user::get_all_users,
        crate::api::user::update_user,
        crate::api::user::delete_user,
        crate::api::user::reset_password,

        crate::api::leave::create_user_leave,
        crate::api::leave::get_all_leave_requests,
        crate::api::leave::get_leave_request,
        crate::api::leave::update_leave_request,
        crate::api::leave::delete_leave_request,
        crate::api::leave::update_leave_status,
        crate::api::leave::user_leave,

        crate::api::attendance::attendance_create,
        crate::api::attendance::get_attendance,
        crate::api::attendance::get_all_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,
        crate::api::attendance::get_user_attendance,
        crate::api::attendance::get_attendance_by_date,
        crate::api::attendance::get_attendance_by_status,

        crate::api::document::upload_document,
        crate::api::document::get_documents,
        crate::api::document::update_document,
        crate::api::document::delete_document
    ),
    components(
        schemas(
            LoginReq,
            CreateAdminReq,
            CreateUserReq,
            UpdateUserReq,
            ResetPasswordReq,
            CreateLeaveReq,
            UpdateLeaveReq,
            UpdateLeaveStatusReq,
            CreateAttendanceReq,
            UpdateAttendanceReq,
            AttendanceDetail,
            AttendanceGroup,
            UploadDocumentReq,
            UpdateDocumentReq,
            Role,
            User,
            Admin,
            Leave,
            Attendance,
            Document,
            ErrorEnvelope,
            Pagination
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Admin", description = "Admin account and login APIs"),
        (name = "User", description = "User management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Attendance", description = "Attendance tracking APIs"),
        (name = "Documents", description = "Document management APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
