use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Role labels carried by principals. Stored in the `roles` column as a
/// comma-separated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema)]
pub enum Role {
    User,
    Admin,
}

pub fn parse_roles(raw: &str) -> Vec<Role> {
    raw.split(',')
        .filter_map(|label| label.trim().parse().ok())
        .collect()
}

pub fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_labels() {
        assert_eq!(parse_roles("User"), vec![Role::User]);
        assert_eq!(parse_roles("User,Admin"), vec![Role::User, Role::Admin]);
        assert_eq!(parse_roles("User, Admin"), vec![Role::User, Role::Admin]);
    }

    #[test]
    fn unknown_labels_are_dropped() {
        assert_eq!(parse_roles("Root,User"), vec![Role::User]);
        assert!(parse_roles("").is_empty());
    }

    #[test]
    fn joins_back_to_labels() {
        assert_eq!(join_roles(&[Role::User, Role::Admin]), "User,Admin");
    }
}
