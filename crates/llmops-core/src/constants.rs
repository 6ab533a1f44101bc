//! Constantes del motor de simulación.
//!
//! `ENGINE_VERSION` forma parte del input del hash de definición de un
//! pipeline: cambiarla invalida las plantillas exportadas con otra versión.

use std::time::Duration;

/// Versión lógica del motor.
pub const ENGINE_VERSION: &str = "P1.0";

/// Latencia simulada por paso.
pub const DEFAULT_STEP_LATENCY: Duration = Duration::from_millis(1500);

/// Probabilidad de fallo inyectado por paso.
pub const DEFAULT_FAILURE_PROBABILITY: f64 = 0.3;
