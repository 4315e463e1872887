use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Admin access required")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(_) => AppError::NotFound(e.to_string()),
            DomainError::InvalidInput(msg) => AppError::BadRequest(msg),
            DomainError::EmptyCart(msg) => AppError::BadRequest(msg.to_string()),
            DomainError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Forbidden => HttpResponse::Forbidden().json(serde_json::json!({
                "error": self.to_string()
            })),
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Cart not found".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_request_returns_400() {
        let resp = AppError::BadRequest("No items to checkout".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_returns_401() {
        let resp = AppError::Unauthorized("Missing x-user-id header".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn forbidden_returns_403() {
        assert_eq!(AppError::Forbidden.error_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_error_returns_500_with_opaque_body() {
        let err = AppError::Internal("connection reset".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_not_found_maps_to_404() {
        let app_err: AppError = DomainError::cart_not_found().into();
        assert!(matches!(app_err, AppError::NotFound(_)));
        assert_eq!(app_err.to_string(), "Cart not found");
    }

    #[test]
    fn domain_invalid_input_maps_to_400() {
        let app_err: AppError =
            DomainError::InvalidInput("Quantity must be a positive integer".to_string()).into();
        assert!(matches!(app_err, AppError::BadRequest(_)));
    }

    #[test]
    fn domain_empty_cart_maps_to_400() {
        let app_err: AppError = DomainError::EmptyCart("No items to checkout").into();
        assert!(matches!(app_err, AppError::BadRequest(_)));
        assert_eq!(app_err.to_string(), "No items to checkout");
    }

    #[test]
    fn domain_storage_maps_to_500() {
        let app_err: AppError = DomainError::Storage("deadlock".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }
}
