use std::rc::Rc;

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, ResponseError};
use futures::future::{Ready, ready};
use futures_util::future::LocalBoxFuture;
use sqlx::MySqlPool;
use tracing::debug;

use crate::auth::jwt::{Claims, verify_token};
use crate::auth::principal::Principal;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::{Role, parse_roles};

/// Role-gated guard for a route: `.wrap(Authorize::roles(&[Role::Admin]))`.
///
/// Stateless per-request check: bearer token is verified under the shared
/// secret, the claims id is resolved against the admins and/or users table
/// depending on the required set, and the resolved principal's roles must
/// intersect it. Any failure at any step responds 401 with the error
/// envelope; no partial processing.
pub struct Authorize {
    required: Rc<Vec<Role>>,
}

impl Authorize {
    pub fn roles(required: &[Role]) -> Self {
        Self {
            required: Rc::new(required.to_vec()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authorize
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthorizeMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizeMiddleware {
            service: Rc::new(service),
            required: Rc::clone(&self.required),
        }))
    }
}

pub struct AuthorizeMiddleware<S> {
    service: Rc<S>,
    required: Rc<Vec<Role>>,
}

impl<S, B> Service<ServiceRequest> for AuthorizeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = Rc::clone(&self.required);

        Box::pin(async move {
            let principal = match authenticate(&req, &required).await {
                Ok(principal) => principal,
                Err(err) => {
                    let res = err.error_response().map_into_right_body();
                    return Ok(req.into_response(res));
                }
            };

            req.extensions_mut().insert(principal);
            service
                .call(req)
                .await
                .map(|res| res.map_into_left_body())
        })
    }
}

/// Header must be exactly `Bearer <token>`.
pub(crate) fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: u64,
    user_name: String,
    roles: String,
}

/// Ids are per-table AUTO_INCREMENT values, so the table a token resolves
/// against is fixed by the role it was issued under. A User token must never
/// be looked up in `admins`, even on an admin-guarded route: a user and an
/// admin can share the same numeric id.
fn principal_lookup_sql(role: Role) -> &'static str {
    match role {
        Role::Admin => "SELECT id, user_name, roles FROM admins WHERE id = ?",
        Role::User => "SELECT id, user_name, roles FROM users WHERE id = ?",
    }
}

/// Post-lookup decision: the token must name the resolved account, and the
/// account's stored roles must intersect the route's required set.
fn resolve_principal(
    claims: &Claims,
    row: Option<PrincipalRow>,
    required: &[Role],
) -> Result<Principal, ApiError> {
    let row = row.ok_or_else(ApiError::unauthorized)?;

    if row.user_name != claims.username {
        return Err(ApiError::unauthorized());
    }

    let principal = Principal {
        id: row.id,
        username: row.user_name,
        roles: parse_roles(&row.roles),
    };

    if !principal.has_any(required) {
        return Err(ApiError::unauthorized());
    }

    Ok(principal)
}

async fn authenticate(req: &ServiceRequest, required: &[Role]) -> Result<Principal, ApiError> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| ApiError::Internal("App config missing".into()))?;
    let pool = req
        .app_data::<Data<MySqlPool>>()
        .ok_or_else(|| ApiError::Internal("Database pool missing".into()))?;

    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(ApiError::unauthorized)?;

    let token = parse_bearer(header).ok_or_else(ApiError::unauthorized)?;

    // crypto error detail stays in the debug log, never on the wire
    let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
        debug!(error = %e, "token rejected");
        ApiError::unauthorized()
    })?;

    let row = sqlx::query_as::<_, PrincipalRow>(principal_lookup_sql(claims.role))
        .bind(claims.sub)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "principal lookup failed");
            ApiError::unauthorized()
        })?;

    resolve_principal(&claims, row, required)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: u64, username: &str, role: Role) -> Claims {
        Claims {
            sub,
            username: username.into(),
            role,
            exp: 0,
        }
    }

    fn row(id: u64, user_name: &str, roles: &str) -> PrincipalRow {
        PrincipalRow {
            id,
            user_name: user_name.into(),
            roles: roles.into(),
        }
    }

    #[test]
    fn bearer_header_must_be_exact() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(parse_bearer("bearer abc"), None);
        assert_eq!(parse_bearer("Bearer"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("Bearer abc def"), None);
        assert_eq!(parse_bearer("Basic abc"), None);
        assert_eq!(parse_bearer(""), None);
    }

    #[test]
    fn lookup_table_follows_token_role() {
        assert!(principal_lookup_sql(Role::User).contains("FROM users"));
        assert!(principal_lookup_sql(Role::Admin).contains("FROM admins"));
    }

    #[test]
    fn id_collision_across_tables_grants_nothing() {
        // user id 1 and admin id 1 are different accounts; a User token that
        // somehow resolved the admin row still fails the username check
        let user_token = claims(1, "jdoe", Role::User);
        let admin_row = row(1, "root", "Admin");

        assert!(resolve_principal(&user_token, Some(admin_row), &[Role::Admin]).is_err());
    }

    #[test]
    fn user_role_token_is_rejected_on_admin_routes() {
        let user_token = claims(7, "jdoe", Role::User);
        let user_row = row(7, "jdoe", "User");

        assert!(resolve_principal(&user_token, Some(user_row), &[Role::Admin]).is_err());
    }

    #[test]
    fn missing_account_is_rejected() {
        let token = claims(7, "jdoe", Role::User);
        assert!(resolve_principal(&token, None, &[Role::User]).is_err());
    }

    #[test]
    fn matching_admin_passes_admin_routes() {
        let token = claims(1, "root", Role::Admin);
        let admin_row = row(1, "root", "Admin");

        let principal = resolve_principal(&token, Some(admin_row), &[Role::Admin]).unwrap();
        assert_eq!(principal.id, 1);
        assert_eq!(principal.roles, vec![Role::Admin]);
    }

    #[test]
    fn user_token_passes_combined_role_routes() {
        let token = claims(7, "jdoe", Role::User);
        let user_row = row(7, "jdoe", "User");

        assert!(resolve_principal(&token, Some(user_row), &[Role::User, Role::Admin]).is_ok());
    }
}
