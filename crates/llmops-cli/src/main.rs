mod cli;

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use llmops_console::config::{init_dotenv, parse_probability};
use llmops_console::{ConsoleError, PipelineService, RunnerConfig};
use llmops_core::step::catalog;
use llmops_core::{PipelineTemplate, RunEvent, RunEventKind, RunHandle, RunOutcome};
use log::{info, warn};

use crate::cli::{Cli, Commands, RunArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // RUST_LOG=debug para ver el detalle del runner
    env_logger::init();
    init_dotenv();

    match Cli::parse().command {
        Commands::Catalog => print_catalog(),
        Commands::Datasets => print_datasets(),
        Commands::Run(args) => run(args).await?,
    }
    Ok(())
}

fn print_catalog() {
    for def in catalog() {
        println!("{:<12} {:<10} {}", def.kind.as_str(), def.display_name, def.description);
    }
}

fn print_datasets() {
    let catalog = llmops_domain::DatasetCatalog::mock();
    for ds in catalog.list() {
        println!("{:<32} {:>6} {:>8} q={:<3} {:?} [{}] by {}",
                 ds.id().as_str(),
                 ds.samples(),
                 ds.size(),
                 ds.quality(),
                 ds.status(),
                 ds.tags().join(", "),
                 ds.creator());
    }
}

async fn run(args: RunArgs) -> Result<(), ConsoleError> {
    let mut config = RunnerConfig::from_env()?;
    if let Some(ms) = args.latency_ms {
        config.step_latency = Duration::from_millis(ms);
    }
    if let Some(raw) = &args.failure_rate {
        config.failure_probability = parse_probability("--failure-rate", raw)?;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut service = PipelineService::from_config(&config)?;
    let dataset = service.catalog().resolve(&args.dataset)?.id().clone();
    let pipeline = service.create_pipeline(&dataset)?;

    match &args.template {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(llmops_console::CoreError::from)?;
            let template = PipelineTemplate::from_json(&raw)?;
            service.apply_template(pipeline, &template)?;
            info!("plantilla '{}' aplicada ({} steps)", template.name, template.steps.len());
        }
        None => {
            for kind in &args.steps {
                service.add_step(pipeline, *kind, None)?;
            }
        }
    }

    if let Some(path) = &args.save_template {
        let template = service.save_template(pipeline, &dataset.to_string())?;
        std::fs::write(path, template.to_json()?).map_err(llmops_console::CoreError::from)?;
        println!("[llmops] plantilla guardada en {}", path.display());
    }

    println!("[llmops] pipeline {} sobre {} ({} steps)",
             pipeline,
             dataset,
             service.steps(pipeline)?.len());

    let mut outcome = follow(service.run_pipeline(pipeline)?).await?;
    let mut retries_left = args.retries;
    while matches!(outcome, RunOutcome::Failed { .. }) && retries_left > 0 {
        retries_left -= 1;
        match service.retry_pipeline(pipeline)? {
            Some(handle) => outcome = follow(handle).await?,
            None => break,
        }
    }

    let report = service.progress(pipeline)?;
    println!("[llmops] {} ({}%)", report.title(), report.percent_rounded());
    for step in &report.steps {
        println!("  {} {:<10} {}", step.step_id, step.display_name, step.label);
    }

    if let Some(path) = &args.events_out {
        std::fs::write(path, service.events_json(pipeline)?).map_err(llmops_console::CoreError::from)?;
    }

    match outcome {
        RunOutcome::Failed { error, .. } => Err(error.into()),
        RunOutcome::Completed | RunOutcome::Cancelled { .. } => Ok(()),
    }
}

/// Imprime los eventos del run hasta que termina. Ctrl-C cancela el run.
async fn follow(mut handle: RunHandle) -> Result<RunOutcome, ConsoleError> {
    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(event) => print_event(&event),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("cancelación solicitada");
                handle.cancel();
            }
        }
    }
    Ok(handle.wait().await?)
}

fn print_event(event: &RunEvent) {
    match &event.kind {
        RunEventKind::RunStarted { start_index, step_count, .. } => {
            println!("[llmops] run {} desde el step {} de {}", event.run_id, start_index + 1, step_count)
        }
        RunEventKind::RetryRequested { from_index } => println!("[llmops] reintentando desde el step {}", from_index + 1),
        RunEventKind::StepStatusChanged { step_index, step_id, status, error } => match error {
            Some(reason) => println!("  [{}] {} {}: {}", step_index + 1, step_id, status.label(), reason),
            None => println!("  [{}] {} {}", step_index + 1, step_id, status.label()),
        },
        RunEventKind::ProgressChanged { progress } => println!("  progreso {:.0}%", progress),
        RunEventKind::RunCompleted => println!("[llmops] run completado"),
        RunEventKind::RunFailed { step_id, .. } => println!("[llmops] run detenido en el step {}", step_id),
        RunEventKind::RunCancelled { step_index } => println!("[llmops] run cancelado en el step {}", step_index + 1),
    }
}
