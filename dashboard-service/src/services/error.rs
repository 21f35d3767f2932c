use service_core::error::AppError;
use thiserror::Error;

/// Errors that reject a request outright.
///
/// Upstream failures are not in here: they are reported inside the
/// dashboard body with the platform's status code.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Configuration(e) => AppError::BadRequest(anyhow::anyhow!(e)),
        }
    }
}
