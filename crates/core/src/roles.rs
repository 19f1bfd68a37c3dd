//! Well-known role name constants.
//!
//! Roles are stored as plain text on `users.role`; the `users_role_check`
//! constraint in `20261001000003_create_users.sql` must list the same values.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_HR: &str = "hr";
pub const ROLE_EMPLOYEE: &str = "employee";

/// Role assigned to a provisioned user when the invitation named none.
pub const DEFAULT_ROLE: &str = ROLE_EMPLOYEE;

const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_HR, ROLE_EMPLOYEE];

/// Whether the role may use the company-administration endpoints.
pub fn is_admin_role(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_HR
}

/// Whether `role` is one of the known role names.
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_hr_administer() {
        assert!(is_admin_role("admin"));
        assert!(is_admin_role("hr"));
        assert!(!is_admin_role("employee"));
        assert!(!is_admin_role(""));
    }

    #[test]
    fn valid_roles() {
        assert!(is_valid_role("employee"));
        assert!(!is_valid_role("superuser"));
        assert_eq!(DEFAULT_ROLE, "employee");
    }
}
