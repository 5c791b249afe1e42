//! Well-known role name constants.
//!
//! These must match the `ck_users_role` CHECK constraint in
//! `20250101000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_STUDENT: &str = "student";

/// All assignable roles.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_STAFF, ROLE_STUDENT];

/// Whether the role may manage catalogue content (courses, events, orders).
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_is_admin() {
        assert!(is_admin(ROLE_ADMIN));
        assert!(!is_admin(ROLE_STAFF));
        assert!(!is_admin(ROLE_STUDENT));
        assert!(!is_admin(""));
    }

    #[test]
    fn valid_roles_contains_all_three() {
        assert_eq!(VALID_ROLES.len(), 3);
    }
}
