//! Tipos de evento de un run y estructura `RunEvent`.
//!
//! Cada transición del runner se registra en un `EventStore` append-only y
//! se empuja en vivo al `RunHandle` del run.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::step::{StepId, StepStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Inicio de un run. `start_index` es 0 en un run nuevo y el índice del
    /// primer fallo en un retry.
    RunStarted {
        start_index: usize,
        step_count: usize,
        definition_hash: String,
    },
    /// El operador pidió reintentar desde `from_index`.
    RetryRequested { from_index: usize },
    StepStatusChanged {
        step_index: usize,
        step_id: StepId,
        status: StepStatus,
        error: Option<String>,
    },
    ProgressChanged { progress: f64 },
    RunCompleted,
    /// El run se detuvo en el primer fallo; los steps siguientes quedan
    /// `Pending`.
    RunFailed {
        step_index: usize,
        step_id: StepId,
        message: String,
    },
    RunCancelled { step_index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // orden de append dentro del pipeline
    pub pipeline_id: Uuid,
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>,
}
