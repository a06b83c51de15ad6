//! Role and status enums.

use serde::{Deserialize, Serialize};

/// Permission level of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "employee_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    /// Manages staff, stock references and archives.
    Admin,
    /// Sells and maintains stock.
    #[default]
    Employee,
}

impl EmployeeRole {
    /// Whether this role may perform admin-only operations.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// The stable string form used in tokens and the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
        }
    }
}

impl std::fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmployeeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "employee" => Ok(Self::Employee),
            _ => Err(format!("invalid employee role: {s}")),
        }
    }
}

/// Outcome of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "login_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum LoginStatus {
    Success,
    Failure,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [EmployeeRole::Admin, EmployeeRole::Employee] {
            assert_eq!(role.to_string().parse::<EmployeeRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_rejects_unknown() {
        assert!("funcionario".parse::<EmployeeRole>().is_err());
        assert!("Admin".parse::<EmployeeRole>().is_err());
    }

    #[test]
    fn test_only_admin_is_admin() {
        assert!(EmployeeRole::Admin.is_admin());
        assert!(!EmployeeRole::Employee.is_admin());
    }

    #[test]
    fn test_role_json_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&EmployeeRole::Employee).unwrap(),
            "\"employee\""
        );
        assert_eq!(
            serde_json::to_string(&LoginStatus::Failure).unwrap(),
            "\"failure\""
        );
    }
}
