// src/web/types.rs

use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::Serialize;
use rocket::{Request, Response};
use tracing::error;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A serialized JSON body with an explicit status and UTF-8 content type.
pub struct JsonResponse {
    pub status: Status,
    pub body: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub error: String,
}

impl JsonResponse {
    pub fn new<T: Serialize>(status: Status, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                Self::error(Status::InternalServerError, "internal server error")
            }
        }
    }

    pub fn error(status: Status, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }
}

impl<'r> Responder<'r, 'static> for JsonResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .status(self.status)
            .raw_header("Content-Type", JSON_CONTENT_TYPE)
            .sized_body(self.body.len(), std::io::Cursor::new(self.body))
            .ok()
    }
}
