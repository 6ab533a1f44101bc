//! Runner de simulación.
//!
//! Ejecuta los steps en orden estricto, uno a la vez. Cada step pasa por
//! `Running`, espera la latencia simulada y termina `Completed` o `Failed`
//! según el `FailureInjector`. El primer fallo detiene el run: los steps
//! posteriores quedan `Pending` hasta un retry.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use super::handle::RunHandle;
use super::tracker::{RunTicket, RunTracker};
use crate::constants::{DEFAULT_FAILURE_PROBABILITY, DEFAULT_STEP_LATENCY};
use crate::errors::PipelineError;
use crate::event::RunEvent;
use crate::injection::{Delay, FailureInjector, RandomFailure, TokioDelay};
use crate::step::{StepId, StepInstance};

/// Parámetros de la simulación.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub step_latency: Duration,
    pub failure_probability: f64,
    /// Semilla del generador de fallos; `None` usa entropía del sistema.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { step_latency: DEFAULT_STEP_LATENCY,
               failure_probability: DEFAULT_FAILURE_PROBABILITY,
               seed: None }
    }
}

/// Resultado de un intento.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed,
    Failed { step_index: usize, error: PipelineError },
    Cancelled { step_index: usize },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }

    /// Step fallido, si el intento terminó en fallo.
    pub fn failed_step(&self) -> Option<StepId> {
        match self {
            RunOutcome::Failed { error: PipelineError::StepExecutionFailure { step_id, .. },
                                 .. } => Some(*step_id),
            _ => None,
        }
    }
}

pub struct PipelineRunner {
    failure: Arc<dyn FailureInjector>,
    delay: Arc<dyn Delay>,
    latency: Duration,
}

impl PipelineRunner {
    pub fn new(failure: Arc<dyn FailureInjector>, delay: Arc<dyn Delay>, latency: Duration) -> Self {
        Self { failure, delay, latency }
    }

    /// Runner con fallos aleatorios y espera real.
    pub fn simulated(config: &SimulationConfig) -> Result<Self, PipelineError> {
        let failure = match config.seed {
            Some(seed) => RandomFailure::seeded(config.failure_probability, seed)?,
            None => RandomFailure::new(config.failure_probability)?,
        };
        Ok(Self::new(Arc::new(failure), Arc::new(TokioDelay), config.step_latency))
    }

    /// Ejecuta todos los steps desde el primero. Todos los estados vuelven a
    /// `Pending` antes de empezar.
    pub async fn execute(&self,
                         steps: &[StepInstance],
                         tracker: &RunTracker,
                         cancel: &CancellationToken)
                         -> Result<RunOutcome, PipelineError> {
        let (ticket, _events) = tracker.begin_fresh(steps)?;
        Ok(self.run_from(steps, tracker, ticket, cancel).await)
    }

    /// Reanuda desde el primer step `Failed`. Los steps anteriores no se
    /// vuelven a ejecutar. `Ok(None)` si no hay ningún fallo registrado.
    pub async fn retry(&self,
                       steps: &[StepInstance],
                       tracker: &RunTracker,
                       cancel: &CancellationToken)
                       -> Result<Option<RunOutcome>, PipelineError> {
        match tracker.begin_retry(steps)? {
            Some((ticket, _events)) => Ok(Some(self.run_from(steps, tracker, ticket, cancel).await)),
            None => Ok(None),
        }
    }

    /// Versión en background de `execute`. El estado inicial ya está
    /// publicado cuando esta función retorna.
    pub fn spawn_execute(self: &Arc<Self>,
                         steps: Vec<StepInstance>,
                         tracker: RunTracker)
                         -> Result<RunHandle, PipelineError> {
        let (ticket, events) = tracker.begin_fresh(&steps)?;
        Ok(self.spawn(steps, tracker, ticket, events))
    }

    /// Versión en background de `retry`.
    pub fn spawn_retry(self: &Arc<Self>,
                       steps: Vec<StepInstance>,
                       tracker: RunTracker)
                       -> Result<Option<RunHandle>, PipelineError> {
        match tracker.begin_retry(&steps)? {
            Some((ticket, events)) => Ok(Some(self.spawn(steps, tracker, ticket, events))),
            None => Ok(None),
        }
    }

    fn spawn(self: &Arc<Self>,
             steps: Vec<StepInstance>,
             tracker: RunTracker,
             ticket: RunTicket,
             events: UnboundedReceiver<RunEvent>)
             -> RunHandle {
        let cancel = CancellationToken::new();
        let runner = Arc::clone(self);
        let token = cancel.clone();
        let join = tokio::spawn(async move { runner.run_from(&steps, &tracker, ticket, &token).await });
        RunHandle::new(ticket.run_id, ticket.start_index, events, cancel, join)
    }

    async fn run_from(&self,
                      steps: &[StepInstance],
                      tracker: &RunTracker,
                      ticket: RunTicket,
                      cancel: &CancellationToken)
                      -> RunOutcome {
        let run_id = ticket.run_id;
        for (index, step) in steps.iter().enumerate().skip(ticket.start_index) {
            if cancel.is_cancelled() {
                tracker.cancelled(run_id, index, None);
                return RunOutcome::Cancelled { step_index: index };
            }

            tracker.step_running(run_id, index, step);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracker.cancelled(run_id, index, Some(step));
                    return RunOutcome::Cancelled { step_index: index };
                }
                _ = self.delay.sleep(self.latency) => {}
            }

            if self.failure.should_fail(index, step) {
                let message = format!("CUDA out of memory during {} operation.", step.display_name());
                tracker.step_failed(run_id, index, step, &message);
                return RunOutcome::Failed { step_index: index,
                                            error: PipelineError::StepExecutionFailure { step_id: step.id,
                                                                                         message } };
            }
            tracker.step_completed(run_id, index, step);
            debug!("run {}: step {} done ({}/{})", run_id, step.id, index + 1, steps.len());
        }
        tracker.completed(run_id);
        RunOutcome::Completed
    }
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
         .field("failure", &self.failure)
         .field("delay", &self.delay)
         .field("latency", &self.latency)
         .finish()
    }
}
