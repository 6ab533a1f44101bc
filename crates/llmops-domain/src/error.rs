// error.rs
use thiserror::Error;

/// Errores del dominio de datasets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Dataset no encontrado: {0}")]
    NotFound(String),

    #[error("Error de validación: {0}")]
    ValidationError(String),
}
