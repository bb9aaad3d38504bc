use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::error::ApiError;
use crate::model::role::Role;

/// The authenticated Admin or User resolved from a verified token, attached
/// to the request by the authorization middleware.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: u64,
    pub username: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn has_any(&self, required: &[Role]) -> bool {
        self.roles.iter().any(|role| required.contains(role))
    }
}

impl FromRequest for Principal {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Principal>()
                .cloned()
                .ok_or_else(|| ApiError::unauthorized().into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_intersection() {
        let user = Principal {
            id: 1,
            username: "jdoe".into(),
            roles: vec![Role::User],
        };
        // a User-role principal never satisfies an Admin-only requirement
        assert!(!user.has_any(&[Role::Admin]));
        assert!(user.has_any(&[Role::User, Role::Admin]));

        let admin = Principal {
            id: 2,
            username: "root".into(),
            roles: vec![Role::Admin],
        };
        assert!(admin.has_any(&[Role::Admin]));
    }
}
