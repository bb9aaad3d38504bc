use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::model::role::Role;

/// Signed claim set: principal id, username and the single role label under
/// which the token was issued.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: u64,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}

pub fn issue_token(
    id: u64,
    username: String,
    role: Role,
    secret: &str,
    ttl: usize,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: id,
        username,
        role,
        exp: now() + ttl,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Signature and expiry check; fails closed on any structural or
/// cryptographic failure.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn claims_round_trip() {
        let token = issue_token(42, "jdoe".into(), Role::User, SECRET, 3600).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(42, "jdoe".into(), Role::Admin, SECRET, 3600).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // exp well past the default decode leeway
        let claims = Claims {
            sub: 42,
            username: "jdoe".into(),
            role: Role::User,
            exp: now() - 600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token("not.a.token", SECRET).is_err());
    }
}
