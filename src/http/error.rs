use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::menu_actor::MenuError;
use crate::order_actor::OrderError;

use super::dto::MessageResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Menu(#[from] MenuError),

    #[error("Malformed request: {0}")]
    MalformedPayload(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Order(e) => match e {
                OrderError::NotFound(_) => StatusCode::NOT_FOUND,
                OrderError::ValidationError(_) | OrderError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
                OrderError::InvalidTransition { .. } => StatusCode::CONFLICT,
                OrderError::StoreError(_) | OrderError::ActorCommunicationError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Menu(e) => match e {
                MenuError::NotFound(_) => StatusCode::NOT_FOUND,
                MenuError::ValidationError(_) | MenuError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
                MenuError::StoreError(_) | MenuError::ActorCommunicationError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        (status, Json(MessageResponse::failure(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(OrderError::NotFound("9".into())), StatusCode::NOT_FOUND),
            (ApiError::from(OrderError::InvalidStatus("done".into())), StatusCode::BAD_REQUEST),
            (
                ApiError::from(OrderError::InvalidTransition {
                    from: OrderStatus::Completed,
                    to: OrderStatus::Pending,
                }),
                StatusCode::CONFLICT,
            ),
            (ApiError::from(OrderError::StoreError("io".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::from(MenuError::InvalidCategory("warm".into())), StatusCode::BAD_REQUEST),
            (ApiError::MalformedPayload("eof".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
        }
    }
}
