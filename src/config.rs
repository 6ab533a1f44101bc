//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone los parámetros de simulación
//! del runner.
use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use llmops_core::constants::{DEFAULT_FAILURE_PROBABILITY, DEFAULT_STEP_LATENCY};
use llmops_core::SimulationConfig;
use once_cell::sync::Lazy;

use crate::errors::CoreError;

pub const STEP_LATENCY_MS_VAR: &str = "LLMOPS_STEP_LATENCY_MS";
pub const FAILURE_PROBABILITY_VAR: &str = "LLMOPS_FAILURE_PROBABILITY";
pub const FAILURE_SEED_VAR: &str = "LLMOPS_FAILURE_SEED";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub runner: RunnerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self { runner: RunnerConfig::from_env()? })
    }
}

/// Parámetros de la simulación de runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Latencia simulada por step.
    pub step_latency: Duration,
    /// Probabilidad de fallo por step, en `[0, 1]`.
    pub failure_probability: f64,
    /// Semilla opcional para reproducir una secuencia de fallos.
    pub seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { step_latency: DEFAULT_STEP_LATENCY,
               failure_probability: DEFAULT_FAILURE_PROBABILITY,
               seed: None }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Variante testeable: `lookup` resuelve cada variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let step_latency = match lookup(STEP_LATENCY_MS_VAR) {
            Some(raw) => Duration::from_millis(parse(STEP_LATENCY_MS_VAR, &raw)?),
            None => defaults.step_latency,
        };
        let failure_probability = match lookup(FAILURE_PROBABILITY_VAR) {
            Some(raw) => parse_probability(FAILURE_PROBABILITY_VAR, &raw)?,
            None => defaults.failure_probability,
        };
        let seed = match lookup(FAILURE_SEED_VAR) {
            Some(raw) => Some(parse(FAILURE_SEED_VAR, &raw)?),
            None => None,
        };
        Ok(Self { step_latency,
                  failure_probability,
                  seed })
    }

    pub fn to_simulation(&self) -> SimulationConfig {
        SimulationConfig { step_latency: self.step_latency,
                           failure_probability: self.failure_probability,
                           seed: self.seed }
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, CoreError>
    where T: std::str::FromStr,
          T::Err: std::fmt::Display
{
    raw.trim().parse::<T>().map_err(|e| CoreError::InvalidEnv { key: key.to_string(),
                                                             value: raw.to_string(),
                                                             reason: e.to_string() })
}

pub fn parse_probability(key: &str, raw: &str) -> Result<f64, CoreError> {
    let p: f64 = parse(key, raw)?;
    if !(0.0..=1.0).contains(&p) {
        return Err(CoreError::InvalidEnv { key: key.to_string(),
                                           value: raw.to_string(),
                                           reason: "debe estar entre 0 y 1".to_string() });
    }
    Ok(p)
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
