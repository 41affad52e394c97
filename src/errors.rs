use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use thiserror::Error;

use crate::external::market_data::ProviderError;
use crate::models::{Notice, NoticeLevel};

/// Outcome classification for calls into the market-data provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No data found for ticker '{ticker}'. It might be delisted or incorrect.")]
    EmptyResult { ticker: String },
    #[error("An error occurred: {0}")]
    Provider(ProviderError),
    #[error("Could not fetch stock info: {0}")]
    ProfileFetch(ProviderError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Please enter a stock ticker.")]
    MissingTicker,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("{0}")]
    External(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let message = self.to_string();
        match self {
            AppError::MissingTicker => (
                StatusCode::BAD_REQUEST,
                Json(Notice::new(NoticeLevel::Warning, message)),
            )
                .into_response(),
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                Json(Notice::new(NoticeLevel::Error, message)),
            )
                .into_response(),
            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(Notice::new(NoticeLevel::Error, message)),
            )
                .into_response(),
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    headers,
                    Json(Notice::new(NoticeLevel::Error, message)),
                )
                    .into_response()
            }
            AppError::External(_) => (
                StatusCode::BAD_GATEWAY,
                Json(Notice::new(NoticeLevel::Error, message)),
            )
                .into_response(),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(value: FetchError) -> Self {
        let message = value.to_string();
        match value {
            FetchError::EmptyResult { .. } => AppError::NotFound(message),
            FetchError::Provider(ProviderError::RateLimited) => AppError::RateLimited,
            _ => AppError::External(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_message() {
        let err = FetchError::EmptyResult { ticker: "ZZZZ".into() };
        assert_eq!(
            err.to_string(),
            "No data found for ticker 'ZZZZ'. It might be delisted or incorrect."
        );
    }

    #[test]
    fn test_provider_message_is_preserved() {
        let err = FetchError::Provider(ProviderError::Network("connection reset".into()));
        assert_eq!(err.to_string(), "An error occurred: network error: connection reset");
    }

    #[test]
    fn test_fetch_errors_map_to_status_codes() {
        let cases = [
            (FetchError::EmptyResult { ticker: "X".into() }, StatusCode::NOT_FOUND),
            (FetchError::Provider(ProviderError::RateLimited), StatusCode::TOO_MANY_REQUESTS),
            (FetchError::Provider(ProviderError::Parse("bad".into())), StatusCode::BAD_GATEWAY),
            (FetchError::Provider(ProviderError::Unauthorized), StatusCode::BAD_GATEWAY),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
    }
}
