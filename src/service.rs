//! Servicio de pipelines: punto de entrada para CLI y clientes.
//!
//! Mantiene, por pipeline, el builder (steps y selección) y el tracker de
//! runs. Invariantes:
//! - a lo sumo un run activo por pipeline;
//! - mientras hay un run activo el pipeline no admite cambios;
//! - tras cada edición el estado del run se ajusta a los steps actuales;
//! - cada pipeline referencia un dataset del catálogo.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use llmops_core::step::{StepConfig, StepId, StepInstance, StepKind};
use llmops_core::{PipelineBuilder, PipelineError, PipelineRunner, PipelineTemplate, ProgressReport, RunEvent,
                  RunHandle, RunTracker};
use llmops_domain::{DatasetCatalog, DatasetId};
use log::info;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::RunnerConfig;
use crate::errors::{ConsoleError, CoreError};

struct PipelineEntry {
    builder: PipelineBuilder,
    tracker: RunTracker,
    cancel: Option<CancellationToken>,
    created_at: DateTime<Utc>,
}

/// Resumen de un pipeline para listados.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub id: Uuid,
    pub dataset: Option<DatasetId>,
    pub step_count: usize,
    pub running: bool,
    pub created_at: DateTime<Utc>,
}

pub struct PipelineService {
    catalog: DatasetCatalog,
    runner: Arc<PipelineRunner>,
    pipelines: IndexMap<Uuid, PipelineEntry>,
}

impl PipelineService {
    pub fn new(catalog: DatasetCatalog, runner: PipelineRunner) -> Self {
        Self { catalog,
               runner: Arc::new(runner),
               pipelines: IndexMap::new() }
    }

    /// Servicio con el catálogo de ejemplo y un runner simulado según `config`.
    pub fn from_config(config: &RunnerConfig) -> Result<Self, ConsoleError> {
        let runner = PipelineRunner::simulated(&config.to_simulation())?;
        Ok(Self::new(DatasetCatalog::mock(), runner))
    }

    pub fn catalog(&self) -> &DatasetCatalog {
        &self.catalog
    }

    pub fn create_pipeline(&mut self, dataset: &DatasetId) -> Result<Uuid, ConsoleError> {
        self.catalog.get(dataset)?;
        let id = Uuid::new_v4();
        self.pipelines.insert(id,
                              PipelineEntry { builder: PipelineBuilder::for_dataset(dataset.clone()),
                                              tracker: RunTracker::new(id),
                                              cancel: None,
                                              created_at: Utc::now() });
        info!("pipeline {} created for dataset {}", id, dataset);
        Ok(id)
    }

    pub fn pipelines(&self) -> Vec<PipelineSummary> {
        self.pipelines
            .iter()
            .map(|(id, e)| PipelineSummary { id: *id,
                                             dataset: e.builder.dataset().cloned(),
                                             step_count: e.builder.len(),
                                             running: e.tracker.is_active(),
                                             created_at: e.created_at })
            .collect()
    }

    /// Cambia el dataset. Si cambia, el pipeline queda vacío.
    pub fn select_dataset(&mut self, pipeline_id: Uuid, dataset: Option<DatasetId>) -> Result<bool, ConsoleError> {
        if let Some(d) = &dataset {
            self.catalog.get(d)?;
        }
        let entry = self.idle_entry_mut(pipeline_id)?;
        let changed = entry.builder.select_dataset(dataset);
        entry.tracker.realign(entry.builder.steps());
        Ok(changed)
    }

    /// Añade un step al final. `Ok(None)` si el pipeline no tiene dataset.
    pub fn add_step(&mut self,
                    pipeline_id: Uuid,
                    kind: StepKind,
                    config: Option<StepConfig>)
                    -> Result<Option<StepId>, ConsoleError> {
        let config = match config {
            Some(c) if c.kind() != kind => {
                return Err(PipelineError::ConfigKindMismatch { expected: kind,
                                                               found: c.kind() }.into())
            }
            Some(c) => c,
            None => StepConfig::default_for(kind),
        };
        let entry = self.idle_entry_mut(pipeline_id)?;
        let id = entry.builder.add_step_with(config).map(|s| s.id);
        entry.tracker.realign(entry.builder.steps());
        Ok(id)
    }

    pub fn remove_step(&mut self, pipeline_id: Uuid, step_id: StepId) -> Result<Option<StepInstance>, ConsoleError> {
        let entry = self.idle_entry_mut(pipeline_id)?;
        let removed = entry.builder.remove_step(step_id);
        entry.tracker.realign(entry.builder.steps());
        Ok(removed)
    }

    /// Selección para el panel de configuración; no altera el pipeline.
    pub fn select_step(&mut self, pipeline_id: Uuid, step_id: StepId) -> Result<StepInstance, ConsoleError> {
        let entry = self.entry_mut(pipeline_id)?;
        Ok(entry.builder.select_step(step_id)?.clone())
    }

    pub fn selected_step(&self, pipeline_id: Uuid) -> Result<Option<StepInstance>, ConsoleError> {
        Ok(self.entry(pipeline_id)?.builder.selected_step().cloned())
    }

    pub fn configure_step(&mut self,
                          pipeline_id: Uuid,
                          step_id: StepId,
                          config: StepConfig)
                          -> Result<(), ConsoleError> {
        let entry = self.idle_entry_mut(pipeline_id)?;
        entry.builder.configure_step(step_id, config)?;
        Ok(())
    }

    pub fn steps(&self, pipeline_id: Uuid) -> Result<Vec<StepInstance>, ConsoleError> {
        Ok(self.entry(pipeline_id)?.builder.steps().to_vec())
    }

    /// Lanza un run desde el primer step. La definición se valida antes de
    /// tocar el estado del run.
    pub fn run_pipeline(&mut self, pipeline_id: Uuid) -> Result<RunHandle, ConsoleError> {
        let runner = Arc::clone(&self.runner);
        let entry = self.entry_mut(pipeline_id)?;
        entry.builder.validate()?;
        let handle = runner.spawn_execute(entry.builder.steps().to_vec(), entry.tracker.clone())?;
        entry.cancel = Some(handle.cancellation_token());
        Ok(handle)
    }

    /// Reintenta desde el primer step fallido. `Ok(None)` si no hay fallo.
    pub fn retry_pipeline(&mut self, pipeline_id: Uuid) -> Result<Option<RunHandle>, ConsoleError> {
        let runner = Arc::clone(&self.runner);
        let entry = self.entry_mut(pipeline_id)?;
        entry.builder.validate()?;
        let handle = runner.spawn_retry(entry.builder.steps().to_vec(), entry.tracker.clone())?;
        if let Some(h) = &handle {
            entry.cancel = Some(h.cancellation_token());
        }
        Ok(handle)
    }

    /// Cancela el run activo. Devuelve `false` si no había ninguno.
    pub fn cancel_run(&mut self, pipeline_id: Uuid) -> Result<bool, ConsoleError> {
        let entry = self.entry_mut(pipeline_id)?;
        if !entry.tracker.is_active() {
            return Ok(false);
        }
        match entry.cancel.take() {
            Some(token) => {
                token.cancel();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn progress(&self, pipeline_id: Uuid) -> Result<ProgressReport, ConsoleError> {
        let entry = self.entry(pipeline_id)?;
        Ok(ProgressReport::from_state(entry.builder.steps(), &entry.tracker.snapshot()))
    }

    pub fn events(&self, pipeline_id: Uuid) -> Result<Vec<RunEvent>, ConsoleError> {
        Ok(self.entry(pipeline_id)?.tracker.events())
    }

    /// Log de eventos serializado (JSON), p.ej. para exportarlo desde la CLI.
    pub fn events_json(&self, pipeline_id: Uuid) -> Result<String, ConsoleError> {
        let events = self.events(pipeline_id)?;
        serde_json::to_string_pretty(&events).map_err(|e| CoreError::Internal(format!("serializando eventos: {e}")).into())
    }

    pub fn save_template(&self, pipeline_id: Uuid, name: &str) -> Result<PipelineTemplate, ConsoleError> {
        Ok(PipelineTemplate::from_builder(name, &self.entry(pipeline_id)?.builder))
    }

    /// Sustituye los steps por los de la plantilla (ids nuevos).
    pub fn apply_template(&mut self,
                          pipeline_id: Uuid,
                          template: &PipelineTemplate)
                          -> Result<Vec<StepId>, ConsoleError> {
        let entry = self.idle_entry_mut(pipeline_id)?;
        let ids = template.apply_to(&mut entry.builder)?;
        entry.tracker.realign(entry.builder.steps());
        Ok(ids)
    }

    fn entry(&self, pipeline_id: Uuid) -> Result<&PipelineEntry, ConsoleError> {
        self.pipelines.get(&pipeline_id).ok_or(ConsoleError::PipelineNotFound(pipeline_id))
    }

    fn entry_mut(&mut self, pipeline_id: Uuid) -> Result<&mut PipelineEntry, ConsoleError> {
        self.pipelines.get_mut(&pipeline_id).ok_or(ConsoleError::PipelineNotFound(pipeline_id))
    }

    fn idle_entry_mut(&mut self, pipeline_id: Uuid) -> Result<&mut PipelineEntry, ConsoleError> {
        let entry = self.entry_mut(pipeline_id)?;
        if entry.tracker.is_active() {
            return Err(ConsoleError::PipelineBusy(pipeline_id));
        }
        Ok(entry)
    }
}

impl std::fmt::Debug for PipelineService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineService")
         .field("runner", &self.runner)
         .field("pipelines", &self.pipelines.len())
         .finish_non_exhaustive()
    }
}
