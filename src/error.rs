//! Application-wide error types.
//!
//! Layer-specific errors live next to their layer: [`crate::llm::ProviderError`],
//! [`crate::resolver::ResolveError`], [`crate::presenter::ClientError`].
//! `AppError` covers process-level failures that end a binary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("invalid PORT".into());
        assert!(e.to_string().starts_with("config error"));
        assert!(e.to_string().contains("invalid PORT"));
    }

    #[test]
    fn server_error_display() {
        let e = AppError::Server("bind failed on 127.0.0.1:8787".into());
        assert!(e.to_string().contains("bind failed"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
