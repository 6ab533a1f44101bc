//! Plantillas de pipeline: secuencia de configuraciones exportable, sin ids
//! ni dataset, que puede aplicarse a otro pipeline.

use serde::{Deserialize, Serialize};

use super::PipelineBuilder;
use crate::constants::ENGINE_VERSION;
use crate::errors::PipelineError;
use crate::hashing::definition_hash;
use crate::step::{StepConfig, StepId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTemplate {
    pub name: String,
    pub engine_version: String,
    pub steps: Vec<StepConfig>,
    pub definition_hash: String,
}

impl PipelineTemplate {
    pub fn from_builder(name: impl Into<String>, builder: &PipelineBuilder) -> Self {
        PipelineTemplate { name: name.into(),
                           engine_version: ENGINE_VERSION.to_string(),
                           steps: builder.steps().iter().map(|s| s.config.clone()).collect(),
                           definition_hash: builder.definition_hash() }
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(self).map_err(|e| PipelineError::Internal(format!("template serialization: {e}")))
    }

    /// Parsea y verifica versión del motor y hash de definición.
    pub fn from_json(raw: &str) -> Result<Self, PipelineError> {
        let template: PipelineTemplate =
            serde_json::from_str(raw).map_err(|e| PipelineError::InvalidTemplate(format!("JSON inválido: {e}")))?;
        template.verify()?;
        Ok(template)
    }

    pub fn verify(&self) -> Result<(), PipelineError> {
        if self.engine_version != ENGINE_VERSION {
            return Err(PipelineError::InvalidTemplate(format!("versión del motor {} != {}",
                                                              self.engine_version, ENGINE_VERSION)));
        }
        let configs: Vec<&StepConfig> = self.steps.iter().collect();
        if definition_hash(&configs) != self.definition_hash {
            return Err(PipelineError::InvalidTemplate("el hash de definición no coincide".to_string()));
        }
        self.steps.iter().try_for_each(|c| c.validate())
    }

    /// Sustituye los steps del builder por los de la plantilla.
    pub fn apply_to(&self, builder: &mut PipelineBuilder) -> Result<Vec<StepId>, PipelineError> {
        self.verify()?;
        builder.replace_steps(self.steps.clone())
    }
}
