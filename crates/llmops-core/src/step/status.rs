use serde::{Deserialize, Serialize};

/// Estado de un Step en tiempo de ejecución.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Running`
/// - `Running` -> `Completed`
/// - `Running` -> `Failed`
/// - `Running` -> `Pending` (sólo por cancelación)
///
/// Un retry devuelve a `Pending` el step fallido y todos los posteriores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// El paso está pendiente de ejecución.
    Pending,
    /// El paso está en ejecución.
    Running,
    /// El paso finalizó correctamente.
    Completed,
    /// El paso falló.
    Failed,
}

impl StepStatus {
    pub fn label(self) -> &'static str {
        match self {
            StepStatus::Pending => "waiting",
            StepStatus::Running => "in progress",
            StepStatus::Completed => "done",
            StepStatus::Failed => "failed",
        }
    }
}

/// Estado + mensaje de error (sólo presente en `Failed`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepState {
    pub status: StepStatus,
    pub error: Option<String>,
}

impl StepState {
    pub fn pending() -> Self {
        StepState { status: StepStatus::Pending, error: None }
    }
    pub fn running() -> Self {
        StepState { status: StepStatus::Running, error: None }
    }
    pub fn completed() -> Self {
        StepState { status: StepStatus::Completed, error: None }
    }
    pub fn failed(message: impl Into<String>) -> Self {
        StepState { status: StepStatus::Failed, error: Some(message.into()) }
    }

    /// Etiqueta para mostrar; en `Failed` incluye el motivo.
    pub fn label(&self) -> String {
        match (&self.status, &self.error) {
            (StepStatus::Failed, Some(reason)) => format!("failed: {reason}"),
            (status, _) => status.label().to_string(),
        }
    }
}

impl Default for StepState {
    fn default() -> Self {
        Self::pending()
    }
}
