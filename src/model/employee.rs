use serde::{Deserialize, Serialize};

/// The slice of an employee record the scheduler needs.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeRef {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub department_id: Option<u64>,
    pub status: String,
}

impl EmployeeRef {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(status: &str) -> EmployeeRef {
        EmployeeRef {
            id: 7,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            department_id: Some(1),
            status: status.into(),
        }
    }

    #[test]
    fn only_active_employees_can_interview() {
        assert!(employee("active").is_active());
        assert!(employee("Active").is_active());
        assert!(!employee("inactive").is_active());
        assert!(!employee("terminated").is_active());
    }
}
