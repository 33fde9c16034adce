// src/web/handlers.rs
use crate::chat::ChatService;
use crate::web::types::{ErrorResponse, JsonResponse};

use rocket::http::Status;
use rocket::State;
use tracing::error;

pub async fn chat_handler(body: &[u8], service: &State<ChatService>) -> JsonResponse {
    match service.handle(body).await {
        Ok(response) => JsonResponse::new(Status::Ok, &response),
        Err(e) => {
            if let crate::chat::ChatError::Internal(detail) = &e {
                error!("Chat request failed: {}", detail);
            }
            let status = Status::from_code(e.status_code()).unwrap_or(Status::InternalServerError);
            JsonResponse::new(
                status,
                &ErrorResponse {
                    error: e.to_string(),
                },
            )
        }
    }
}
