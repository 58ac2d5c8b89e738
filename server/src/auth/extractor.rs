use std::marker::PhantomData;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use crate::auth::roles::Policy;
use crate::auth::session;
use crate::models::User;
use crate::state::AppState;
use crate::utils::error::AppError;

/// The signed-in user, if any. Never rejects.
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = session::current_user(state, &CookieJar::from_headers(&parts.headers)).await?;
        Ok(Self(user))
    }
}

/// Any signed-in user; anonymous visitors are sent to sign in.
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match session::current_user(state, &CookieJar::from_headers(&parts.headers)).await? {
            Some(user) => Ok(Self(user)),
            None => Err(AppError::AuthError {
                next: parts.uri.path_and_query().map(|pq| pq.as_str().to_string()),
            }),
        }
    }
}

/// A signed-in user who passes policy `P`; everyone else is redirected to
/// the no-permission page.
pub struct Authorized<P> {
    pub user: User,
    policy: PhantomData<P>,
}

impl<P> Authorized<P> {
    pub fn into_user(self) -> User {
        self.user
    }
}

#[async_trait]
impl<P> FromRequestParts<AppState> for Authorized<P>
where
    P: Policy,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !P::allows(&user) {
            return Err(AppError::Forbidden(format!(
                "user {} is not {} ({})",
                user.username,
                P::NAME,
                parts.uri.path()
            )));
        }

        Ok(Self {
            user,
            policy: PhantomData,
        })
    }
}
