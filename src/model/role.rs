#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Role granted to self-service registrations. Elevation is a separate
    /// admin-only action, never part of the public register flow.
    pub fn for_registration() -> Self {
        Role::Employee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_always_yields_the_employee_role() {
        // A caller-supplied role id must never survive registration.
        assert_eq!(Role::for_registration(), Role::Employee);
        assert_eq!(Role::for_registration() as u8, 3);
    }

    #[test]
    fn unknown_role_ids_are_rejected() {
        assert_eq!(Role::from_id(1), Some(Role::Admin));
        assert_eq!(Role::from_id(2), Some(Role::Hr));
        assert_eq!(Role::from_id(3), Some(Role::Employee));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(4), None);
    }
}
