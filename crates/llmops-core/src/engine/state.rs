//! Estado mutable de un run: mapa de estados por step y progreso agregado.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::step::{StepId, StepInstance, StepState, StepStatus};

/// Estado global del run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Completed,
    /// Detenido en el primer step fallido.
    Failed,
    Cancelled,
}

impl RunPhase {
    pub fn is_active(self) -> bool {
        matches!(self, RunPhase::Running)
    }
}

/// Mapa `StepId -> StepState` en orden de pipeline, más el contador de steps
/// completados y el progreso (0..=100) derivado de él.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    run_id: Option<Uuid>,
    phase: RunPhase,
    statuses: IndexMap<StepId, StepState>,
    progress: f64,
    completed: usize,
    total: usize,
    attempts: u32,
}

impl RunState {
    /// Todos los steps a `Pending`, progreso a 0.
    pub(crate) fn reset(&mut self, steps: &[StepInstance]) {
        self.statuses = steps.iter().map(|s| (s.id, StepState::pending())).collect();
        self.total = steps.len();
        self.completed = 0;
        self.progress = 0.0;
    }

    /// Reordena el mapa según `steps`: conserva estados de ids existentes,
    /// añade `Pending` para ids nuevos y descarta ids que ya no están. Si la
    /// secuencia cambió, progreso y fase se recalculan desde los estados.
    pub(crate) fn align(&mut self, steps: &[StepInstance]) {
        let unchanged = self.statuses.len() == steps.len()
                        && self.statuses.keys().zip(steps).all(|(id, s)| *id == s.id);
        if unchanged {
            return;
        }
        let mut previous = std::mem::take(&mut self.statuses);
        self.statuses = steps.iter()
                             .map(|s| (s.id, previous.swap_remove(&s.id).unwrap_or_default()))
                             .collect();
        self.total = steps.len();
        self.completed = self.statuses.values().filter(|s| s.status == StepStatus::Completed).count();
        self.progress = if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        };
        if !self.phase.is_active() {
            self.phase = match self.phase {
                RunPhase::Failed if self.has_failed() => RunPhase::Failed,
                RunPhase::Completed if self.is_complete() => RunPhase::Completed,
                _ => RunPhase::Idle,
            };
        }
    }

    /// Índice (en orden de pipeline) del primer step `Failed`.
    pub fn first_failed_index(&self) -> Option<usize> {
        self.statuses.values().position(|s| s.status == StepStatus::Failed)
    }

    /// `Pending` para el step `index` y todos los posteriores.
    pub(crate) fn reset_from(&mut self, index: usize) {
        for (_, state) in self.statuses.iter_mut().skip(index) {
            *state = StepState::pending();
        }
    }

    /// Marca el inicio de un intento. El contador de completados arranca en
    /// `start_index`: los steps previos ya están `Completed`.
    pub(crate) fn start(&mut self, run_id: Uuid, start_index: usize) {
        self.run_id = Some(run_id);
        self.phase = RunPhase::Running;
        self.completed = start_index;
        self.attempts += 1;
    }

    pub(crate) fn set(&mut self, id: StepId, state: StepState) {
        self.statuses.insert(id, state);
    }

    /// Incrementa completados y recalcula el progreso.
    pub(crate) fn record_completion(&mut self) -> f64 {
        self.completed += 1;
        self.progress = if self.total == 0 {
            100.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        };
        self.progress
    }

    pub(crate) fn finish(&mut self, phase: RunPhase) {
        self.phase = phase;
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Número de intentos iniciados (run inicial + retries).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn statuses(&self) -> &IndexMap<StepId, StepState> {
        &self.statuses
    }

    pub fn status(&self, id: StepId) -> Option<&StepState> {
        self.statuses.get(&id)
    }

    /// Estado de un step; sin entrada se considera `Pending`.
    pub fn status_or_pending(&self, id: StepId) -> StepState {
        self.statuses.get(&id).cloned().unwrap_or_default()
    }

    pub fn has_failed(&self) -> bool {
        self.statuses.values().any(|s| s.status == StepStatus::Failed)
    }

    /// Todos los steps `Completed` (y al menos uno).
    pub fn is_complete(&self) -> bool {
        !self.statuses.is_empty() && self.statuses.values().all(|s| s.status == StepStatus::Completed)
    }
}
