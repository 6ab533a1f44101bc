use llmops_core::PipelineError;
use llmops_domain::DomainError;
use thiserror::Error;
use uuid::Uuid;

use super::core_error::CoreError;

/// Errores expuestos por el servicio de pipelines.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Pipeline no encontrado: {0}")]
    PipelineNotFound(Uuid),
    /// El pipeline tiene un run activo y no admite cambios.
    #[error("Pipeline en ejecución: {0}")]
    PipelineBusy(Uuid),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Core(#[from] CoreError),
}
