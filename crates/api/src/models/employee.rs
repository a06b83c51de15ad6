//! Employee domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{
    Contact, Email, EmployeeHistoryId, EmployeeId, EmployeeRole, LoginStatus, StockReferenceId,
};

/// A member of staff who can sign in.
#[derive(Debug, Clone, Serialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub username: String,
    pub email: Email,
    #[serde(skip)]
    pub password_hash: String,
    pub name: String,
    pub contact: Contact,
    pub address: String,
    pub role: EmployeeRole,
    pub is_active: bool,
    /// Stock reference the employee is assigned to.
    #[serde(rename = "sector")]
    pub stock_reference_id: Option<StockReferenceId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of an employee's profile, written on creation and on name or
/// role changes.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeHistory {
    pub id: EmployeeHistoryId,
    /// `None` once the employee has been deleted.
    pub employee_id: Option<EmployeeId>,
    pub name: String,
    pub contact: String,
    pub address: String,
    pub role: EmployeeRole,
    pub recorded_at: DateTime<Utc>,
}

/// One login attempt.
#[derive(Debug, Clone, Serialize)]
pub struct LoginActivity {
    pub id: i64,
    pub employee_id: Option<EmployeeId>,
    pub username: String,
    pub status: LoginStatus,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller, as carried in an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentEmployee {
    pub id: EmployeeId,
    pub username: String,
    pub role: EmployeeRole,
}

impl CurrentEmployee {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&Employee> for CurrentEmployee {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            username: employee.username.clone(),
            role: employee.role,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn employee() -> Employee {
        Employee {
            id: EmployeeId::generate(),
            username: "marta".to_string(),
            email: Email::parse("marta@loja.pt").unwrap(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            name: "Marta Reis".to_string(),
            contact: Contact::parse("912345678").unwrap(),
            address: "Rua do Ouro 5".to_string(),
            role: EmployeeRole::Employee,
            is_active: true,
            stock_reference_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_serialize_hides_password_hash() {
        let json = serde_json::to_value(employee()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "marta");
    }

    #[test]
    fn test_serialize_exposes_sector() {
        let json = serde_json::to_value(employee()).unwrap();
        assert!(json.get("sector").is_some());
        assert!(json.get("stock_reference_id").is_none());
    }

    #[test]
    fn test_current_employee_from_employee() {
        let employee = employee();
        let current = CurrentEmployee::from(&employee);
        assert_eq!(current.id, employee.id);
        assert!(!current.is_admin());
    }
}
