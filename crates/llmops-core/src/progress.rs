//! Vista de progreso para mostrar al operador.

use serde::{Deserialize, Serialize};

use crate::engine::{RunPhase, RunState};
use crate::step::{StepId, StepInstance, StepKind, StepStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepProgress {
    pub step_id: StepId,
    pub kind: StepKind,
    pub display_name: String,
    pub status: StepStatus,
    pub label: String,
    pub error: Option<String>,
}

/// Snapshot agregado de un run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub phase: RunPhase,
    pub progress: f64,
    pub steps: Vec<StepProgress>,
    pub has_failed: bool,
    pub is_complete: bool,
}

impl ProgressReport {
    /// Construye el reporte en el orden de `steps`. Un step sin entrada en el
    /// mapa de estados se muestra como `Pending`.
    pub fn from_state(steps: &[StepInstance], state: &RunState) -> Self {
        let steps: Vec<StepProgress> = steps.iter()
                                            .map(|s| {
                                                let st = state.status_or_pending(s.id);
                                                StepProgress { step_id: s.id,
                                                               kind: s.kind(),
                                                               display_name: s.display_name().to_string(),
                                                               status: st.status,
                                                               label: st.label(),
                                                               error: st.error }
                                            })
                                            .collect();
        let has_failed = steps.iter().any(|s| s.status == StepStatus::Failed);
        let is_complete = !steps.is_empty() && steps.iter().all(|s| s.status == StepStatus::Completed);
        Self { phase: state.phase(),
               progress: state.progress(),
               is_complete,
               has_failed,
               steps }
    }

    pub fn title(&self) -> &'static str {
        if self.has_failed {
            "Pipeline execution failed"
        } else if self.is_complete {
            "Pipeline completed"
        } else if self.phase == RunPhase::Cancelled {
            "Pipeline cancelled"
        } else {
            "Running pipeline..."
        }
    }

    pub fn percent_rounded(&self) -> u8 {
        self.progress.round().clamp(0.0, 100.0) as u8
    }

    /// Primer step fallido, que es donde empezaría un retry.
    pub fn failed_step(&self) -> Option<&StepProgress> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }
}
