use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{templates, tmdb::GatewayError, watchlist::StoreError};

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<GatewayError>() {
            Some(GatewayError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(_) => StatusCode::BAD_GATEWAY,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "request failed");
        }

        let body = match status {
            StatusCode::NOT_FOUND => templates::not_found_page(),
            StatusCode::BAD_GATEWAY => templates::error_page(
                "Failed to fetch movie details. Please try again later.",
                &self.to_string(),
            ),
            _ => templates::error_page(
                "We're sorry, but an error occurred while rendering this page.",
                &self.to_string(),
            ),
        };
        (status, Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn gateway_errors_map_to_http_status() {
        assert_eq!(AppError::from(GatewayError::NotFound(1)).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(GatewayError::MissingCredentials).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn store_errors_are_internal() {
        let err = StoreError::Storage(StorageError::Unavailable("disk full".to_string()));
        let err = AppError::from(err);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("disk full"));
    }
}
