use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::runner::RunOutcome;
use crate::errors::PipelineError;
use crate::event::RunEvent;

/// Handle de un run en background: eventos en vivo, cancelación y resultado.
///
/// El stream de eventos termina (`next_event` devuelve `None`) cuando el run
/// llega a un estado terminal.
#[derive(Debug)]
pub struct RunHandle {
    run_id: Uuid,
    start_index: usize,
    events: UnboundedReceiver<RunEvent>,
    cancel: CancellationToken,
    join: JoinHandle<RunOutcome>,
}

impl RunHandle {
    pub(crate) fn new(run_id: Uuid,
                      start_index: usize,
                      events: UnboundedReceiver<RunEvent>,
                      cancel: CancellationToken,
                      join: JoinHandle<RunOutcome>)
                      -> Self {
        Self { run_id,
               start_index,
               events,
               cancel,
               join }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// 0 para un run nuevo; índice del step reintentado en un retry.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Pide la cancelación. El step en curso vuelve a `Pending`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Espera el resultado del run.
    pub async fn wait(self) -> Result<RunOutcome, PipelineError> {
        self.join.await.map_err(|e| PipelineError::Internal(format!("la tarea del run falló: {e}")))
    }
}
