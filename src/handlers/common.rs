use crate::config::AppConfig;
use crate::errors::{ApiError, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

/// Standard success response, wrapped in the API envelope
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(crate::ApiResponse::success(data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(crate::ApiResponse::success(data))).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Pagination parameters for list operations. Page numbering is 1-based;
/// a missing limit falls back to the configured default.
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    pub limit: Option<u64>,
}

fn default_page() -> u64 {
    1
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: None,
        }
    }
}

impl PaginationParams {
    /// Applies the configured default and cap, rejecting zero values.
    pub fn resolve(&self, config: &AppConfig) -> Result<(u64, u64), ApiError> {
        if self.page == 0 {
            return Err(ApiError::ValidationError(
                "page must be greater than zero".to_string(),
            ));
        }
        let limit = self.limit.unwrap_or(config.api_default_page_size as u64);
        if limit == 0 {
            return Err(ApiError::ValidationError(
                "limit must be greater than zero".to_string(),
            ));
        }
        let max = config.api_max_page_size as u64;
        if limit > max {
            return Err(ApiError::ValidationError(format!(
                "limit cannot exceed {max}"
            )));
        }
        Ok((self.page, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            8080,
            "test".to_string(),
        )
    }

    #[test]
    fn missing_limit_uses_configured_default() {
        let config = test_config();
        let params = PaginationParams::default();
        let (page, limit) = params.resolve(&config).unwrap();
        assert_eq!(page, 1);
        assert_eq!(limit, config.api_default_page_size as u64);
    }

    #[test]
    fn zero_page_is_rejected() {
        let config = test_config();
        let params = PaginationParams {
            page: 0,
            limit: Some(10),
        };
        assert!(params.resolve(&config).is_err());
    }

    #[test]
    fn oversized_limit_is_rejected() {
        let config = test_config();
        let params = PaginationParams {
            page: 1,
            limit: Some(config.api_max_page_size as u64 + 1),
        };
        assert!(params.resolve(&config).is_err());
    }
}
