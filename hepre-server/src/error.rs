use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl ServerError {
    pub fn code(&self) -> i32 {
        match self {
            ServerError::Gateway(err) => err.code(),
            ServerError::BadRequest(_) => -1,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Gateway(err) => match err {
                GatewayError::InvalidRequest(_) | GatewayError::Malformed(_) => {
                    StatusCode::BAD_REQUEST
                }
                GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
                GatewayError::ParameterMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
                GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
                GatewayError::Conflict(_) => StatusCode::CONFLICT,
                GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServerError::Gateway(GatewayError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(json!({ "code": self.code(), "error": message })),
        )
            .into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mirrors_code() {
        let cases = [
            (GatewayError::InvalidRequest("x".into()), 400),
            (GatewayError::NotFound("x".into()), 404),
            (GatewayError::Malformed("x".into()), 400),
            (GatewayError::ParameterMismatch("x".into()), 422),
            (GatewayError::PayloadTooLarge { size: 2, max: 1 }, 413),
            (GatewayError::Forbidden("x".into()), 403),
            (GatewayError::Internal("x".into()), 500),
            (GatewayError::Conflict("x".into()), 409),
        ];
        for (err, status) in cases {
            let response = ServerError::from(err).into_response();
            assert_eq!(response.status().as_u16(), status);
        }
    }
}
