//! Builder mutable de pipelines.
//!
//! Mantiene la secuencia ordenada de `StepInstance` asociada a un dataset y
//! el step seleccionado para configuración. Invariantes:
//! - los `StepId` son únicos (contador monotónico, nunca se reutilizan);
//! - el orden de inserción es el orden de ejecución;
//! - quitar el step seleccionado limpia la selección;
//! - cambiar de dataset vacía el pipeline.

use llmops_domain::DatasetId;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::hashing::definition_hash;
use crate::step::{StepConfig, StepId, StepInstance, StepKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineBuilder {
    dataset: Option<DatasetId>,
    steps: Vec<StepInstance>,
    selected: Option<StepId>,
    next_id: u64,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_dataset(dataset: DatasetId) -> Self {
        Self { dataset: Some(dataset),
               ..Self::default() }
    }

    pub fn dataset(&self) -> Option<&DatasetId> {
        self.dataset.as_ref()
    }

    /// Cambia el dataset seleccionado. Si cambia, el pipeline y la selección
    /// se vacían. Devuelve `true` si hubo cambio.
    pub fn select_dataset(&mut self, dataset: Option<DatasetId>) -> bool {
        if self.dataset == dataset {
            return false;
        }
        self.dataset = dataset;
        self.steps.clear();
        self.selected = None;
        true
    }

    /// Añade un step con la configuración por defecto de su kind.
    ///
    /// No-op (devuelve `None`) si no hay dataset seleccionado.
    pub fn add_step(&mut self, kind: StepKind) -> Option<&StepInstance> {
        self.add_step_with(StepConfig::default_for(kind))
    }

    /// Añade un step con configuración explícita y lo marca como
    /// seleccionado.
    pub fn add_step_with(&mut self, config: StepConfig) -> Option<&StepInstance> {
        self.dataset.as_ref()?;
        self.next_id += 1;
        let id = StepId(self.next_id);
        self.steps.push(StepInstance { id, config });
        self.selected = Some(id);
        self.steps.last()
    }

    pub fn remove_step(&mut self, id: StepId) -> Option<StepInstance> {
        let index = self.position(id)?;
        let removed = self.steps.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(removed)
    }

    pub fn select_step(&mut self, id: StepId) -> Result<&StepInstance, PipelineError> {
        let index = self.position(id).ok_or(PipelineError::UnknownStep(id))?;
        self.selected = Some(id);
        Ok(&self.steps[index])
    }

    pub fn selected_step(&self) -> Option<&StepInstance> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Sustituye la configuración de un step. El kind no puede cambiar.
    pub fn configure_step(&mut self, id: StepId, config: StepConfig) -> Result<(), PipelineError> {
        let index = self.position(id).ok_or(PipelineError::UnknownStep(id))?;
        let step = &mut self.steps[index];
        if step.kind() != config.kind() {
            return Err(PipelineError::ConfigKindMismatch { expected: step.kind(),
                                                           found: config.kind() });
        }
        step.config = config;
        Ok(())
    }

    pub fn get(&self, id: StepId) -> Option<&StepInstance> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn position(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    pub fn steps(&self) -> &[StepInstance] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Comprueba que el pipeline se puede ejecutar: dataset presente, al
    /// menos un step y configuraciones válidas.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.dataset.is_none() {
            return Err(PipelineError::NoDatasetSelected);
        }
        if self.steps.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }
        self.steps.iter().try_for_each(|s| s.config.validate())
    }

    /// Hash de la definición (kinds + configs en orden). No incluye ids ni
    /// dataset: dos pipelines con los mismos steps comparten hash.
    pub fn definition_hash(&self) -> String {
        let configs: Vec<&StepConfig> = self.steps.iter().map(|s| &s.config).collect();
        definition_hash(&configs)
    }

    /// Sustituye todos los steps por los indicados, con ids nuevos. La
    /// selección se limpia.
    pub(crate) fn replace_steps(&mut self, configs: Vec<StepConfig>) -> Result<Vec<StepId>, PipelineError> {
        if self.dataset.is_none() {
            return Err(PipelineError::NoDatasetSelected);
        }
        self.steps.clear();
        self.selected = None;
        let mut ids = Vec::with_capacity(configs.len());
        for config in configs {
            self.next_id += 1;
            let id = StepId(self.next_id);
            self.steps.push(StepInstance { id, config });
            ids.push(id);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> PipelineBuilder {
        PipelineBuilder::for_dataset(DatasetId::new("alpaca-gpt4-zh", "v1.2"))
    }

    #[test]
    fn add_step_without_dataset_is_noop() {
        let mut b = PipelineBuilder::new();
        assert!(b.add_step(StepKind::Filter).is_none());
        assert!(b.is_empty());
        assert!(b.selected_step().is_none());
    }

    #[test]
    fn add_step_appends_and_selects() {
        let mut b = builder();
        let first = b.add_step(StepKind::Filter).unwrap().id;
        let second = b.add_step(StepKind::Dedupe).unwrap().id;
        assert!(first < second, "ids must be creation ordered");
        assert_eq!(b.steps().iter().map(|s| s.kind()).collect::<Vec<_>>(),
                   vec![StepKind::Filter, StepKind::Dedupe]);
        assert_eq!(b.selected_step().map(|s| s.id), Some(second));
    }

    #[test]
    fn removing_unselected_step_keeps_selection() {
        let mut b = builder();
        let a = b.add_step(StepKind::Filter).unwrap().id;
        let c = b.add_step(StepKind::Translate).unwrap().id;
        assert!(b.remove_step(a).is_some());
        assert_eq!(b.selected_step().map(|s| s.id), Some(c));
    }

    #[test]
    fn removing_selected_step_clears_selection() {
        let mut b = builder();
        let a = b.add_step(StepKind::Filter).unwrap().id;
        let c = b.add_step(StepKind::Translate).unwrap().id;
        b.select_step(a).unwrap();
        b.remove_step(a);
        assert!(b.selected_step().is_none());
        assert_eq!(b.len(), 1);
        assert_eq!(b.steps()[0].id, c);
    }

    #[test]
    fn remove_unknown_step_is_none() {
        let mut b = builder();
        b.add_step(StepKind::Augment);
        assert!(b.remove_step(StepId(99)).is_none());
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut b = builder();
        let a = b.add_step(StepKind::Filter).unwrap().id;
        b.remove_step(a);
        let again = b.add_step(StepKind::Filter).unwrap().id;
        assert_ne!(a, again);
    }

    #[test]
    fn changing_dataset_clears_pipeline() {
        let mut b = builder();
        b.add_step(StepKind::Filter);
        assert!(!b.select_dataset(Some(DatasetId::new("alpaca-gpt4-zh", "v1.2"))));
        assert_eq!(b.len(), 1);

        assert!(b.select_dataset(Some(DatasetId::new("dolly-v2-15k", "v2.0"))));
        assert!(b.is_empty());
        assert!(b.selected_step().is_none());
    }

    #[test]
    fn configure_step_rejects_other_kind() {
        let mut b = builder();
        let id = b.add_step(StepKind::Filter).unwrap().id;
        let err = b.configure_step(id, StepConfig::default_for(StepKind::Cluster)).unwrap_err();
        assert_eq!(err,
                   PipelineError::ConfigKindMismatch { expected: StepKind::Filter,
                                                       found: StepKind::Cluster });

        b.configure_step(id, StepConfig::Filter { condition: "lang == 'en'".into() }).unwrap();
        assert_eq!(b.get(id).unwrap().config.summary(), "where lang == 'en'");
    }

    #[test]
    fn validate_reports_empty_and_invalid() {
        let mut b = builder();
        assert_eq!(b.validate(), Err(PipelineError::EmptyPipeline));
        b.add_step_with(StepConfig::Filter { condition: String::new() });
        assert!(matches!(b.validate(), Err(PipelineError::InvalidConfig { .. })));
    }

    #[test]
    fn definition_hash_ignores_ids() {
        let mut a = builder();
        let mut b = builder();
        b.add_step(StepKind::Cluster);
        let stale = b.steps()[0].id;
        b.remove_step(stale);
        for kind in [StepKind::Filter, StepKind::Dedupe] {
            a.add_step(kind);
            b.add_step(kind);
        }
        assert_eq!(a.definition_hash(), b.definition_hash());
    }
}
