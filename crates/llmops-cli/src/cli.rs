use std::path::PathBuf;

use clap::{Parser, Subcommand};
use llmops_core::StepKind;

#[derive(Parser)]
#[command(name = "llmops", about = "Simulador de pipelines de preprocesamiento de datasets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lista las operaciones disponibles para construir un pipeline
    Catalog,
    /// Lista los datasets disponibles
    Datasets,
    /// Construye un pipeline sobre un dataset y lo ejecuta
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Dataset por nombre (`dolly-v2-15k`) o id completo (`dolly-v2-15k/v2.0`)
    #[arg(short, long)]
    pub dataset: String,

    /// Steps en orden de ejecución, p.ej. `filter,dedupe,translate`
    #[arg(short, long, value_delimiter = ',')]
    pub steps: Vec<StepKind>,

    /// Plantilla JSON a aplicar en lugar de `--steps`
    #[arg(long, conflicts_with = "steps")]
    pub template: Option<PathBuf>,

    /// Guarda la definición del pipeline como plantilla JSON
    #[arg(long)]
    pub save_template: Option<PathBuf>,

    /// Exporta el log de eventos (JSON) al terminar
    #[arg(long)]
    pub events_out: Option<PathBuf>,

    /// Latencia simulada por step en milisegundos (por defecto LLMOPS_STEP_LATENCY_MS o 1500)
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Probabilidad de fallo por step (por defecto LLMOPS_FAILURE_PROBABILITY o 0.3)
    #[arg(long)]
    pub failure_rate: Option<String>,

    /// Semilla para reproducir los fallos
    #[arg(long)]
    pub seed: Option<u64>,

    /// Reintentos manuales a lanzar tras un fallo
    #[arg(long, default_value_t = 0)]
    pub retries: u32,
}
