use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of account roles. Persisted as lowercase text; validated at
/// the boundary before any role-scoped query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Employee,
    Admin,
    Hr,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "manager" => Some(Role::Manager),
            "employee" => Some(Role::Employee),
            "admin" => Some(Role::Admin),
            "hr" => Some(Role::Hr),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Employee => "employee",
            Role::Admin => "admin",
            Role::Hr => "hr",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
