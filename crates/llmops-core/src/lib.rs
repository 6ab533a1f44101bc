//! llmops-core: simulación lineal de pipelines de preprocesamiento de datos.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod injection;
pub mod pipeline;
pub mod progress;
pub mod step;

pub use engine::{PipelineRunner, RunHandle, RunOutcome, RunPhase, RunState, RunTracker, SimulationConfig};
pub use errors::PipelineError;
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use injection::{Delay, FailureInjector, NeverFail, NoDelay, RandomFailure, ScriptedFailures, TokioDelay};
pub use pipeline::{PipelineBuilder, PipelineTemplate};
pub use progress::{ProgressReport, StepProgress};
pub use step::{StepConfig, StepDefinition, StepId, StepInstance, StepKind, StepState, StepStatus};
