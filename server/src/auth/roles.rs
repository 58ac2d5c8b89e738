//! Role predicates. A role is membership in the group of the same name;
//! superusers count as admins.

use crate::models::{Role, User};

pub const NO_GROUP_LABEL: &str = "No Group Assigned";

pub fn is_admin(user: &User) -> bool {
    user.is_superuser || user.in_group(Role::Admin.group_name())
}

pub fn is_organizer(user: &User) -> bool {
    user.in_group(Role::Organizer.group_name())
}

pub fn is_participant(user: &User) -> bool {
    user.in_group(Role::Participant.group_name())
}

/// The user's effective role, first match in Admin > Organizer > Participant.
pub fn user_role(user: &User) -> Option<Role> {
    if is_admin(user) {
        Some(Role::Admin)
    } else if is_organizer(user) {
        Some(Role::Organizer)
    } else if is_participant(user) {
        Some(Role::Participant)
    } else {
        None
    }
}

/// Label shown next to a user in admin listings.
pub fn role_label(user: &User) -> String {
    match user_role(user) {
        Some(role) => role.to_string(),
        None => user
            .groups
            .first()
            .cloned()
            .unwrap_or_else(|| NO_GROUP_LABEL.to_string()),
    }
}

/// Where a freshly signed-in user lands.
pub fn dashboard_for(user: &User) -> &'static str {
    user_role(user).map(Role::dashboard_path).unwrap_or("/")
}

/// A gate over the role predicates, checked by the `Authorized` extractor.
pub trait Policy: Send + Sync + 'static {
    const NAME: &'static str;

    fn allows(user: &User) -> bool;
}

pub struct AdminOnly;
pub struct OrganizerOnly;
pub struct ParticipantOnly;
/// Organizers and admins: whoever may manage events and categories.
pub struct EventManager;

impl Policy for AdminOnly {
    const NAME: &'static str = "admin";

    fn allows(user: &User) -> bool {
        is_admin(user)
    }
}

impl Policy for OrganizerOnly {
    const NAME: &'static str = "organizer";

    fn allows(user: &User) -> bool {
        is_organizer(user)
    }
}

impl Policy for ParticipantOnly {
    const NAME: &'static str = "participant";

    fn allows(user: &User) -> bool {
        is_participant(user)
    }
}

impl Policy for EventManager {
    const NAME: &'static str = "organizer or admin";

    fn allows(user: &User) -> bool {
        is_organizer(user) || is_admin(user)
    }
}
