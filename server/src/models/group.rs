use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GroupSummary {
    pub id: Uuid,
    pub name: String,
    pub member_count: i64,
}

/// The three groups that grant a role, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Admin,
    Organizer,
    Participant,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Organizer, Role::Participant];

    pub fn group_name(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Organizer => "Organizer",
            Role::Participant => "Participant",
        }
    }

    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Role::Admin => "/users/admin/dashboard/",
            Role::Organizer => "/users/organizer/dashboard/",
            Role::Participant => "/users/participant/dashboard/",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_name())
    }
}
