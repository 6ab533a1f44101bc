//! Definiciones relacionadas a Steps.
//!
//! Un step es una unidad de procesamiento de datos dentro de un pipeline
//! (filtrar, transformar, deduplicar, traducir, agrupar, aumentar o aplicar un
//! modelo). Este módulo define:
//! - `StepKind` y el catálogo fijo de `StepDefinition`.
//! - `StepConfig`: configuración tipada por kind.
//! - `StepInstance`: step concreto dentro de un pipeline, con `StepId`.
//! - `StepStatus` / `StepState`: estado en tiempo de ejecución.

pub mod config;
pub mod definition;
mod instance;
mod status;

pub use config::{AugmentMethod, ClusterAlgorithm, DedupKey, StepConfig, TargetFormat};
pub use definition::{catalog, StepDefinition, StepKind};
pub use instance::{StepId, StepInstance};
pub use status::{StepState, StepStatus};
