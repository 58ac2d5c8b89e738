use std::marker::PhantomData;

use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use uuid::Uuid;

use super::{CATEGORY_LIST_PATH, EVENT_LIST_PATH};
use crate::models::Role;
use crate::utils::flash::FlashRedirect;

/// Where a lookup of this kind of record sends the visitor when it fails.
pub trait Record: Send + Sync + 'static {
    const LIST_PATH: &'static str;
    const NOT_FOUND: &'static str;
}

pub struct EventRecord;

impl Record for EventRecord {
    const LIST_PATH: &'static str = EVENT_LIST_PATH;
    const NOT_FOUND: &'static str = "Event not found.";
}

pub struct CategoryRecord;

impl Record for CategoryRecord {
    const LIST_PATH: &'static str = CATEGORY_LIST_PATH;
    const NOT_FOUND: &'static str = "Category not found.";
}

pub struct UserRecord;

impl Record for UserRecord {
    const LIST_PATH: &'static str = Role::Admin.dashboard_path();
    const NOT_FOUND: &'static str = "User not found";
}

/// The single id segment of the route. A malformed id is answered like a
/// missing record: flash and back to the list.
pub struct RecordId<R>(pub Uuid, pub PhantomData<R>);

/// The flash redirect for a record that does not exist.
pub fn not_found<R: Record>() -> FlashRedirect {
    FlashRedirect::to(R::LIST_PATH).error(R::NOT_FOUND)
}

#[async_trait]
impl<S, R> FromRequestParts<S> for RecordId<R>
where
    S: Send + Sync,
    R: Record,
{
    type Rejection = FlashRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| not_found::<R>())?;

        match Uuid::parse_str(&raw) {
            Ok(id) => Ok(Self(id, PhantomData)),
            Err(_) => {
                tracing::debug!(id = %raw, path = %parts.uri.path(), "Malformed record id");
                Err(not_found::<R>())
            }
        }
    }
}
