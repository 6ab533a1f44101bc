//! Seguimiento compartido de los runs de un pipeline.
//!
//! `RunTracker` es el único punto de escritura del `RunState`: el run activo
//! lo muta y los observadores leen snapshots. Cada mutación se registra en el
//! `EventStore` y se empuja a los suscriptores del run que la produjo. Los
//! locks nunca se mantienen a través de un `.await`.
//!
//! Orden de locks: `state`, `store`, `subscribers`. El cierre de un run (fase
//! terminal, evento terminal y baja de sus suscriptores) ocurre con `state`
//! tomado, así que ningún run nuevo puede empezar a mitad del cierre.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use super::state::{RunPhase, RunState};
use crate::errors::PipelineError;
use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
use crate::hashing::definition_hash;
use crate::step::{StepConfig, StepInstance, StepState, StepStatus};

/// Datos de un intento recién iniciado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    pub run_id: Uuid,
    pub start_index: usize,
}

struct Subscriber {
    run_id: Uuid,
    tx: UnboundedSender<RunEvent>,
}

#[derive(Clone)]
pub struct RunTracker {
    pipeline_id: Uuid,
    state: Arc<Mutex<RunState>>,
    store: Arc<Mutex<dyn EventStore>>,
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RunTracker {
    /// Tracker con store de eventos en memoria.
    pub fn new(pipeline_id: Uuid) -> Self {
        Self::with_store(pipeline_id, InMemoryEventStore::default())
    }

    pub fn with_store<E: EventStore + 'static>(pipeline_id: Uuid, store: E) -> Self {
        let store: Arc<Mutex<dyn EventStore>> = Arc::new(Mutex::new(store));
        Self { pipeline_id,
               state: Arc::new(Mutex::new(RunState::default())),
               store,
               subscribers: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn pipeline_id(&self) -> Uuid {
        self.pipeline_id
    }

    pub fn snapshot(&self) -> RunState {
        lock(&self.state).clone()
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).phase().is_active()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        lock(&self.store).list(self.pipeline_id)
    }

    /// Ajusta el estado a la secuencia editada del pipeline. Sin efecto
    /// mientras hay un run activo.
    pub fn realign(&self, steps: &[StepInstance]) {
        let mut state = lock(&self.state);
        if !state.phase().is_active() {
            state.align(steps);
        }
    }

    /// Canal con los eventos del run `run_id`; se cierra cuando ese run
    /// termina.
    fn subscribe(&self, run_id: Uuid) -> UnboundedReceiver<RunEvent> {
        let (tx, rx) = unbounded_channel();
        lock(&self.subscribers).push(Subscriber { run_id, tx });
        rx
    }

    /// Inicia un run desde el principio: todos los estados a `Pending`.
    pub(crate) fn begin_fresh(&self,
                              steps: &[StepInstance])
                              -> Result<(RunTicket, UnboundedReceiver<RunEvent>), PipelineError> {
        if steps.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }
        let run_id = Uuid::new_v4();
        let events = {
            let mut state = lock(&self.state);
            if state.phase().is_active() {
                return Err(PipelineError::RunAlreadyActive);
            }
            state.reset(steps);
            state.start(run_id, 0);
            self.subscribe(run_id)
        };
        info!("pipeline {} run {} started ({} steps)", self.pipeline_id, run_id, steps.len());
        self.emit_started(run_id, 0, steps);
        self.emit(run_id, RunEventKind::ProgressChanged { progress: 0.0 });
        Ok((RunTicket { run_id, start_index: 0 }, events))
    }

    /// Prepara un retry: localiza el primer `Failed` y devuelve a `Pending`
    /// ese step y todos los posteriores. `None` si no hay fallo.
    pub(crate) fn begin_retry(&self,
                              steps: &[StepInstance])
                              -> Result<Option<(RunTicket, UnboundedReceiver<RunEvent>)>, PipelineError> {
        let run_id = Uuid::new_v4();
        let (from_index, reset, events): (usize, Vec<(usize, &StepInstance)>, _) = {
            let mut state = lock(&self.state);
            if state.phase().is_active() {
                return Err(PipelineError::RunAlreadyActive);
            }
            state.align(steps);
            let Some(from_index) = state.first_failed_index() else {
                debug!("pipeline {}: retry requested without failed step", self.pipeline_id);
                return Ok(None);
            };
            state.reset_from(from_index);
            state.start(run_id, from_index);
            (from_index, steps.iter().enumerate().skip(from_index).collect(), self.subscribe(run_id))
        };
        info!("pipeline {} run {} retrying from step {}", self.pipeline_id, run_id, from_index);
        self.emit(run_id, RunEventKind::RetryRequested { from_index });
        for (index, step) in reset {
            self.emit_status(run_id, index, step, &StepState::pending());
        }
        self.emit_started(run_id, from_index, steps);
        Ok(Some((RunTicket { run_id, start_index: from_index }, events)))
    }

    pub(crate) fn step_running(&self, run_id: Uuid, index: usize, step: &StepInstance) {
        self.transition(run_id, index, step, StepState::running());
    }

    pub(crate) fn step_completed(&self, run_id: Uuid, index: usize, step: &StepInstance) {
        let progress = {
            let mut state = lock(&self.state);
            state.set(step.id, StepState::completed());
            state.record_completion()
        };
        self.emit_status(run_id, index, step, &StepState::completed());
        self.emit(run_id, RunEventKind::ProgressChanged { progress });
    }

    pub(crate) fn step_failed(&self, run_id: Uuid, index: usize, step: &StepInstance, message: &str) {
        warn!("pipeline {} run {}: step {} ({}) failed: {}",
              self.pipeline_id,
              run_id,
              step.id,
              step.kind(),
              message);
        self.transition(run_id, index, step, StepState::failed(message));
        self.finish(run_id,
                    RunPhase::Failed,
                    RunEventKind::RunFailed { step_index: index,
                                              step_id: step.id,
                                              message: message.to_string() });
    }

    /// Cancelación: el step interrumpido (si lo hay) vuelve a `Pending`.
    pub(crate) fn cancelled(&self, run_id: Uuid, index: usize, interrupted: Option<&StepInstance>) {
        info!("pipeline {} run {} cancelled at step {}", self.pipeline_id, run_id, index);
        if let Some(step) = interrupted {
            self.transition(run_id, index, step, StepState::pending());
        }
        self.finish(run_id, RunPhase::Cancelled, RunEventKind::RunCancelled { step_index: index });
    }

    pub(crate) fn completed(&self, run_id: Uuid) {
        info!("pipeline {} run {} completed", self.pipeline_id, run_id);
        self.finish(run_id, RunPhase::Completed, RunEventKind::RunCompleted);
    }

    /// Fase terminal, evento terminal y cierre de los suscriptores del run,
    /// todo bajo el lock de `state`.
    fn finish(&self, run_id: Uuid, phase: RunPhase, terminal: RunEventKind) {
        let mut state = lock(&self.state);
        state.finish(phase);
        self.emit(run_id, terminal);
        lock(&self.subscribers).retain(|s| s.run_id != run_id);
        drop(state);
    }

    fn transition(&self, run_id: Uuid, index: usize, step: &StepInstance, next: StepState) {
        lock(&self.state).set(step.id, next.clone());
        self.emit_status(run_id, index, step, &next);
    }

    fn emit_started(&self, run_id: Uuid, start_index: usize, steps: &[StepInstance]) {
        let configs: Vec<&StepConfig> = steps.iter().map(|s| &s.config).collect();
        self.emit(run_id,
                  RunEventKind::RunStarted { start_index,
                                             step_count: steps.len(),
                                             definition_hash: definition_hash(&configs) });
    }

    fn emit_status(&self, run_id: Uuid, index: usize, step: &StepInstance, state: &StepState) {
        if state.status == StepStatus::Running {
            debug!("pipeline {} run {}: step {} ({}) running", self.pipeline_id, run_id, step.id, step.kind());
        }
        self.emit(run_id,
                  RunEventKind::StepStatusChanged { step_index: index,
                                                    step_id: step.id,
                                                    status: state.status,
                                                    error: state.error.clone() });
    }

    fn emit(&self, run_id: Uuid, kind: RunEventKind) {
        let event = lock(&self.store).append_kind(self.pipeline_id, run_id, kind);
        // suscriptores con el receptor cerrado se descartan
        lock(&self.subscribers).retain(|s| s.run_id != run_id || s.tx.send(event.clone()).is_ok());
    }
}

impl fmt::Debug for RunTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunTracker")
         .field("pipeline_id", &self.pipeline_id)
         .field("state", &*lock(&self.state))
         .finish_non_exhaustive()
    }
}
