pub mod extractor;
pub mod password;
pub mod roles;
pub mod session;
pub mod token;

pub use extractor::{AuthenticatedUser, Authorized, CurrentUser};
pub use roles::{
    dashboard_for, is_admin, is_organizer, is_participant, role_label, user_role, AdminOnly,
    EventManager, OrganizerOnly, ParticipantOnly, Policy,
};
