use std::fmt;

use serde::{Deserialize, Serialize};

use super::{StepConfig, StepDefinition, StepKind};

/// Id de un step dentro de un pipeline. Se asigna con un contador monotónico
/// del builder: único y ordenado por creación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Step concreto de un pipeline. El kind se deriva de la configuración, así
/// que no pueden divergir.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInstance {
    pub id: StepId,
    pub config: StepConfig,
}

impl StepInstance {
    pub fn kind(&self) -> StepKind {
        self.config.kind()
    }

    pub fn definition(&self) -> &'static StepDefinition {
        self.kind().definition()
    }

    pub fn display_name(&self) -> &'static str {
        self.kind().display_name()
    }
}
