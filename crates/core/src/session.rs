//! Explicit request session.
//!
//! Every mutating service call receives the acting user instead of reading
//! ambient login state.

use serde::{Deserialize, Serialize};
use crate::id::FacultyId;

/// Role of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Teaches and logs topics for owned subjects
    Faculty,
    /// Reviews alerts and decides catch-up plans
    HeadOfDepartment,
}

/// The acting user for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Acting user
    pub user: FacultyId,

    /// Display name
    pub name: String,

    /// Role
    pub role: Role,
}

impl Session {
    /// Session for a faculty member.
    pub fn faculty(user: impl Into<FacultyId>, name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
            role: Role::Faculty,
        }
    }

    /// Session for a head of department.
    pub fn head_of_department(user: impl Into<FacultyId>, name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
            role: Role::HeadOfDepartment,
        }
    }

    /// Whether the session may approve, reject or resolve.
    pub fn is_head_of_department(&self) -> bool {
        self.role == Role::HeadOfDepartment
    }
}
