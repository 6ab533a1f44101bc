use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error interno: {0}")]
    Internal(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Variable de entorno inválida {key}={value}: {reason}")]
    InvalidEnv { key: String, value: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_variant_from() {
        let io_err = std::io::Error::other("falló IO");
        let err: CoreError = io_err.into();
        assert_eq!(err.to_string(), "Error en IO: falló IO");
    }

    #[test]
    fn test_invalid_env_format() {
        let err = CoreError::InvalidEnv { key: "LLMOPS_FAILURE_PROBABILITY".into(),
                                          value: "2".into(),
                                          reason: "fuera de rango".into() };
        assert_eq!(err.to_string(),
                   "Variable de entorno inválida LLMOPS_FAILURE_PROBABILITY=2: fuera de rango");
    }
}
