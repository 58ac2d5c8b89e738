//! One-shot status messages carried across a redirect.
//!
//! A redirect stores its messages in a short-lived cookie; the next page
//! reads them through the [`Flashes`] extractor and clears the cookie when it
//! renders.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "eventhub_flash";
const FLASH_MAX_AGE_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn new(level: FlashLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Messages left for this request by the previous redirect.
#[derive(Debug, Clone, Default)]
pub struct Flashes(pub Vec<FlashMessage>);

impl Flashes {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let messages = CookieJar::from_headers(headers)
            .get(FLASH_COOKIE)
            .and_then(|cookie| decode(cookie.value()))
            .unwrap_or_default();
        Self(messages)
    }

    #[cfg(test)]
    pub fn push(&mut self, level: FlashLevel, text: impl Into<String>) {
        self.0.push(FlashMessage::new(level, text));
    }

    pub fn into_inner(self) -> Vec<FlashMessage> {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flashes
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn encode(messages: &[FlashMessage]) -> Option<String> {
    serde_json::to_vec(messages)
        .ok()
        .map(|json| URL_SAFE_NO_PAD.encode(json))
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(FLASH_MAX_AGE_SECS))
        .build()
}

/// A jar that expires the flash cookie in the browser.
pub fn expire_flash_cookie() -> CookieJar {
    let mut expired = flash_cookie(String::new());
    expired.make_removal();
    CookieJar::new().add(expired)
}

fn decode(raw: &str) -> Option<Vec<FlashMessage>> {
    let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(messages) => Some(messages),
        Err(e) => {
            tracing::debug!(error = %e, "Discarding malformed flash cookie");
            None
        }
    }
}

/// `303 See Other` to `location` with no flash attached.
pub fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

/// A `303 See Other` that leaves flash messages for the destination page.
#[derive(Debug, Clone)]
pub struct FlashRedirect {
    location: String,
    messages: Vec<FlashMessage>,
    jar: CookieJar,
}

impl FlashRedirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            messages: Vec::new(),
            jar: CookieJar::new(),
        }
    }

    pub fn success(self, text: impl Into<String>) -> Self {
        self.flash(FlashLevel::Success, text)
    }

    pub fn warning(self, text: impl Into<String>) -> Self {
        self.flash(FlashLevel::Warning, text)
    }

    pub fn error(self, text: impl Into<String>) -> Self {
        self.flash(FlashLevel::Error, text)
    }

    pub fn flash(mut self, level: FlashLevel, text: impl Into<String>) -> Self {
        self.messages.push(FlashMessage::new(level, text));
        self
    }

    /// Sends the cookie changes in `jar` along with the redirect, e.g. a new session.
    pub fn with_jar(mut self, jar: CookieJar) -> Self {
        self.jar = jar;
        self
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut jar = self.jar;
        if !self.messages.is_empty() {
            if let Some(encoded) = encode(&self.messages) {
                jar = jar.add(flash_cookie(encoded));
            }
        }

        (jar, Redirect::to(&self.location)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue, StatusCode};

    #[test]
    fn redirect_carries_messages_to_the_next_request() {
        let response = FlashRedirect::to("/events/")
            .success("Event Created Successfully")
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        let pair = set_cookie.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(pair).unwrap());
        let flashes = Flashes::from_headers(&headers).into_inner();

        assert_eq!(
            flashes,
            vec![FlashMessage::new(FlashLevel::Success, "Event Created Successfully")]
        );
    }

    #[test]
    fn redirect_without_messages_sets_no_cookie() {
        let response = FlashRedirect::to("/").into_response();
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[test]
    fn garbage_cookie_yields_no_messages() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("eventhub_flash=!!not-base64!!"),
        );
        assert!(Flashes::from_headers(&headers).0.is_empty());
    }
}
