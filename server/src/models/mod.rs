pub mod category;
pub mod event;
pub mod group;
pub mod rsvp;
pub mod session;
pub mod user;

pub use category::{Category, CategoryInput};
pub use event::{DateScope, Event, EventInput, EventQuery};
pub use group::{Group, GroupSummary, Role};
pub use rsvp::RsvpOutcome;
pub use session::Session;
pub use user::{NewUser, ProfileUpdate, User};
