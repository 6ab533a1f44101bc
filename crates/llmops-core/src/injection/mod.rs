//! Puntos de inyección del runner: decisión de fallo y espera simulada.
//!
//! Ambos son traits para que los tests fuercen resultados deterministas y
//! ejecuten sin esperas reales.

mod delay;
mod failure;

pub use delay::{Delay, NoDelay, TokioDelay};
pub use failure::{FailureInjector, NeverFail, RandomFailure, ScriptedFailures};
