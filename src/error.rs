//! Application-wide error types.
//!
//! Start-up and infrastructure failures only. Request-level failures of the
//! recommendation core live in [`crate::advisor::AdvisorError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("template error: {0}")]
    Templates(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().starts_with("config error"));
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn templates_error_display() {
        let e = AppError::Templates("unknown intent section 'greeting'".into());
        assert!(e.to_string().contains("greeting"));
    }

    #[test]
    fn http_error_display() {
        let e = AppError::Http("bind failed".into());
        assert_eq!(e.to_string(), "http error: bind failed");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
