use crate::{
    api::{admin, attendance, document, leave, user},
    auth::middleware::Authorize,
    config::Config,
    model::role::Role,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter) // rate limiting
            // account creation and login
            .service(
                web::resource("/admin-create")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(admin::create_admin)),
            )
            .service(
                web::resource("/admin/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(admin::login_admin)),
            )
            .service(
                web::resource("/user-login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(user::login_user)),
            )
            // user administration
            .service(
                web::resource("/admin/createUser")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::post().to(user::create_user)),
            )
            .service(
                web::resource("/admin/users")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::get().to(user::get_all_users)),
            )
            .service(
                web::resource("/admin/update-user/{userId}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::put().to(user::update_user)),
            )
            .service(
                web::resource("/admin/delete-user/{id}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::delete().to(user::delete_user)),
            )
            .service(
                web::resource("/reset-password")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::post().to(user::reset_password)),
            )
            // leave management
            .service(
                web::resource("/user/createLeaves/{userId}")
                    .wrap(Authorize::roles(&[Role::User, Role::Admin]))
                    .route(web::post().to(leave::create_user_leave)),
            )
            .service(
                web::resource("/user/leaveRequest/{id}")
                    .route(web::get().to(leave::get_leave_request)),
            )
            .service(
                web::resource("/user/getAllLeaveRequests")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::get().to(leave::get_all_leave_requests)),
            )
            .service(
                web::resource("/user/updateLeaveRequest/{id}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::put().to(leave::update_leave_request)),
            )
            .service(
                web::resource("/user/deleteLeaveRequest/{id}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::delete().to(leave::delete_leave_request)),
            )
            .service(
                web::resource("/user/leaveStatus/{leaveId}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::put().to(leave::update_leave_status)),
            )
            .service(web::resource("/leaves/{userId}").route(web::get().to(leave::user_leave)))
            // attendance tracking
            .service(
                web::resource("/user/createAttendance-record/{userId}")
                    .wrap(Authorize::roles(&[Role::User, Role::Admin]))
                    .route(web::post().to(attendance::attendance_create)),
            )
            .service(
                web::resource("/getAttendance/{id}")
                    .route(web::get().to(attendance::get_attendance)),
            )
            .service(
                web::resource("/user/getAllAttendance")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::get().to(attendance::get_all_attendance)),
            )
            .service(
                web::resource("/user/updateAttendance/{entryId}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::put().to(attendance::update_attendance)),
            )
            .service(
                web::resource("/user/deleteAttendance/{entryId}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::delete().to(attendance::delete_attendance)),
            )
            .service(
                web::resource("/user-getAttendance/{userId}")
                    .route(web::get().to(attendance::get_user_attendance)),
            )
            .service(
                web::resource("/attendance/date")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::get().to(attendance::get_attendance_by_date)),
            )
            .service(
                web::resource("/attendance/status/{status}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::get().to(attendance::get_attendance_by_status)),
            )
            // document management
            .service(
                web::resource("/uploadDocument/{userId}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::post().to(document::upload_document)),
            )
            .service(
                web::resource("/documents/{userId}")
                    .route(web::get().to(document::get_documents)),
            )
            .service(
                web::resource("/updateDocument/{userId}/{documentId}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::put().to(document::update_document)),
            )
            .service(
                web::resource("/document/{documentId}")
                    .wrap(Authorize::roles(&[Role::Admin]))
                    .route(web::delete().to(document::delete_document)),
            )
            // keep last so literal /user/* routes above win the match
            .service(web::resource("/user/{id}").route(web::get().to(user::get_user))),
    );
}
