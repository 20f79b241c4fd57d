#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    System = 4,
    ApiUser = 5,
    Manager = 6,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::System),
            5 => Some(Role::ApiUser),
            6 => Some(Role::Manager),
            _ => None,
        }
    }

    /// Roles allowed to book interviews and act on PTO requests.
    pub fn can_approve(self) -> bool {
        matches!(self, Role::Admin | Role::Hr | Role::Manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_and_unknown_ids_are_rejected() {
        for role in [Role::Admin, Role::Hr, Role::Employee, Role::System, Role::ApiUser, Role::Manager] {
            assert_eq!(Role::from_id(role as u8), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(7), None);
    }

    #[test]
    fn employees_cannot_approve() {
        assert!(Role::Manager.can_approve());
        assert!(Role::Hr.can_approve());
        assert!(!Role::Employee.can_approve());
        assert!(!Role::ApiUser.can_approve());
    }
}
