//! Login sessions: a row in the session store, referenced by an opaque id in
//! an `HttpOnly` cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use uuid::Uuid;

use crate::models::User;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

pub const SESSION_COOKIE: &str = "eventhub_session";

pub fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

fn session_cookie(session_id: Uuid, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(max_age_secs))
        .build()
}

/// Opens a session for `user` and adds its cookie to `jar`.
pub async fn start(state: &AppState, jar: CookieJar, user: &User) -> AppResult<CookieJar> {
    let config = state.config();
    let now = Utc::now();
    let expires_at = now.checked_add_signed(config.session_ttl).ok_or_else(|| {
        AppError::InternalServerError(format!(
            "session ttl {} overflows the clock",
            config.session_ttl
        ))
    })?;
    let session = state.sessions().create(user.id, expires_at).await?;
    state.users().record_login(user.id, now).await?;

    tracing::info!(user_id = %user.id, session_id = %session.id, "Session started");

    Ok(jar.add(session_cookie(
        session.id,
        config.session_ttl.num_seconds(),
        config.production,
    )))
}

/// Destroys the session named by the request cookie, if any, and expires the cookie.
pub async fn end(state: &AppState, jar: CookieJar) -> AppResult<CookieJar> {
    if let Some(session_id) = session_id(&jar) {
        state.sessions().delete(session_id).await?;
        tracing::info!(session_id = %session_id, "Session ended");
    }
    Ok(jar.remove(Cookie::build(SESSION_COOKIE).path("/")))
}

/// Resolves the request cookie to an active user. Expired sessions are purged.
pub async fn current_user(state: &AppState, jar: &CookieJar) -> AppResult<Option<User>> {
    let Some(session_id) = session_id(jar) else {
        return Ok(None);
    };
    let Some(session) = state.sessions().find(session_id).await? else {
        return Ok(None);
    };
    if session.is_expired(Utc::now()) {
        state.sessions().delete(session.id).await?;
        return Ok(None);
    }

    let user = state.users().find_by_id(session.user_id).await?;
    Ok(user.filter(|user| user.is_active))
}
