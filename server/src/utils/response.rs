use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::utils::flash::{expire_flash_cookie, FlashLevel, FlashMessage, Flashes};

#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorBody,
}

/// What a template needs to render a page: its name, its context and the
/// flash messages to display.
#[derive(Serialize)]
pub struct PageBody<T>
where
    T: Serialize,
{
    pub template: &'static str,
    pub context: T,
    pub messages: Vec<FlashMessage>,
}

pub struct Page<T> {
    template: &'static str,
    context: T,
    messages: Vec<FlashMessage>,
    consumed_flash: bool,
}

impl<T> Page<T>
where
    T: Serialize,
{
    pub fn new(template: &'static str, context: T) -> Self {
        Self {
            template,
            context,
            messages: Vec::new(),
            consumed_flash: false,
        }
    }

    /// Shows the messages left by the previous redirect and expires them.
    pub fn with_flashes(mut self, flashes: Flashes) -> Self {
        let incoming = flashes.into_inner();
        self.consumed_flash |= !incoming.is_empty();
        self.messages.extend(incoming);
        self
    }

    pub fn flash(mut self, level: FlashLevel, text: impl Into<String>) -> Self {
        self.messages.push(FlashMessage::new(level, text));
        self
    }
}

impl<T> IntoResponse for Page<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let body = ApiResponse {
            success: true,
            data: Some(PageBody {
                template: self.template,
                context: self.context,
                messages: self.messages,
            }),
            message: None,
        };
        if self.consumed_flash {
            (StatusCode::OK, expire_flash_cookie(), Json(body)).into_response()
        } else {
            (StatusCode::OK, Json(body)).into_response()
        }
    }
}

pub fn success<T>(data: T, message: impl Into<String>) -> impl IntoResponse
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: Some(message.into()),
    };
    (StatusCode::OK, Json(body))
}

pub fn error(
    code: &str,
    message: impl Into<String>,
    details: Option<Value>,
    status: StatusCode,
) -> Response {
    let body = ApiErrorResponse {
        success: false,
        error: ApiErrorBody {
            code: code.to_string(),
            message: message.into(),
            details,
        },
    };

    (status, Json(body)).into_response()
}
