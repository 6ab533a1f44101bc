//! Motor de ejecución de pipelines.
//!
//! `PipelineRunner` ejecuta la secuencia, `RunTracker` guarda el estado
//! compartido y el log de eventos de un pipeline, y `RunHandle` expone un run
//! en background.

mod handle;
mod runner;
mod state;
mod tracker;

pub use handle::RunHandle;
pub use runner::{PipelineRunner, RunOutcome, SimulationConfig};
pub use state::{RunPhase, RunState};
pub use tracker::{RunTicket, RunTracker};
