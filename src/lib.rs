//! LLMOps Console
//!
//! Este crate actúa como la librería de aplicación de la consola:
//! - Expone `config` para cargar los parámetros de simulación desde el entorno.
//! - Expone `errors` para los errores de núcleo y de servicio.
//! - Expone `service` con las operaciones sobre pipelines que usa la CLI.

pub mod config;
pub mod errors;
pub mod service;

pub use config::{AppConfig, RunnerConfig};
pub use errors::{ConsoleError, CoreError};
pub use service::{PipelineService, PipelineSummary};
