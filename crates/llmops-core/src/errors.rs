//! Errores del core de pipelines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::step::{StepId, StepKind};

#[derive(Debug, Error, PartialEq, Clone, Serialize, Deserialize)]
pub enum PipelineError {
    /// Único error de ejecución: nunca se recupera automáticamente.
    #[error("el step {step_id} falló: {message}")] StepExecutionFailure { step_id: StepId, message: String },
    #[error("step desconocido {0}")] UnknownStep(StepId),
    #[error("tipo de step desconocido '{0}'")] UnknownStepKind(String),
    #[error("config de tipo {found} no corresponde al step de tipo {expected}")] ConfigKindMismatch { expected: StepKind, found: StepKind },
    #[error("config inválida para {kind}: {reason}")] InvalidConfig { kind: StepKind, reason: String },
    #[error("probabilidad de fallo inválida {0} (se espera 0.0..=1.0)")] InvalidProbability(f64),
    #[error("plantilla rechazada: {0}")] InvalidTemplate(String),
    #[error("el pipeline no tiene steps")] EmptyPipeline,
    #[error("no hay dataset seleccionado")] NoDatasetSelected,
    #[error("ya hay un run activo en este pipeline")] RunAlreadyActive,
    #[error("error interno: {0}")] Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_failure_message() {
        let err = PipelineError::StepExecutionFailure { step_id: StepId(2),
                                                        message: "CUDA out of memory during Dedupe operation.".into() };
        assert_eq!(err.to_string(), "el step #2 falló: CUDA out of memory during Dedupe operation.");
        assert_eq!(PipelineError::RunAlreadyActive.to_string(), "ya hay un run activo en este pipeline");
    }
}
