use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

/// Tipos de operación disponibles en la caja de herramientas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Filter,
    Transform,
    Dedupe,
    Translate,
    Cluster,
    Augment,
    ModelApply,
}

/// Entrada inmutable del catálogo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDefinition {
    pub kind: StepKind,
    pub display_name: &'static str,
    pub description: &'static str,
}

static CATALOG: [StepDefinition; 7] = [
    StepDefinition { kind: StepKind::Filter,
                     display_name: "Filter",
                     description: "Filter rows by a condition" },
    StepDefinition { kind: StepKind::Transform,
                     display_name: "Transform",
                     description: "Change the data format or structure" },
    StepDefinition { kind: StepKind::Dedupe,
                     display_name: "Dedupe",
                     description: "Remove exact duplicate samples" },
    StepDefinition { kind: StepKind::Translate,
                     display_name: "Translate",
                     description: "Translate text into another language" },
    StepDefinition { kind: StepKind::Cluster,
                     display_name: "Cluster",
                     description: "Group samples by similarity" },
    StepDefinition { kind: StepKind::Augment,
                     display_name: "Augment",
                     description: "Grow the data by rewriting or generation" },
    StepDefinition { kind: StepKind::ModelApply,
                     display_name: "Model",
                     description: "Process rows with a large language model" },
];

/// Catálogo completo, en el orden de la caja de herramientas.
pub fn catalog() -> &'static [StepDefinition] {
    &CATALOG
}

impl StepKind {
    pub const ALL: [StepKind; 7] = [StepKind::Filter,
                                    StepKind::Transform,
                                    StepKind::Dedupe,
                                    StepKind::Translate,
                                    StepKind::Cluster,
                                    StepKind::Augment,
                                    StepKind::ModelApply];

    pub fn definition(self) -> &'static StepDefinition {
        // CATALOG está en el mismo orden que la declaración del enum
        &CATALOG[self as usize]
    }

    pub fn display_name(self) -> &'static str {
        self.definition().display_name
    }

    /// Nombre estable usado en CLI y serialización.
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Filter => "filter",
            StepKind::Transform => "transform",
            StepKind::Dedupe => "dedupe",
            StepKind::Translate => "translate",
            StepKind::Cluster => "cluster",
            StepKind::Augment => "augment",
            StepKind::ModelApply => "model_apply",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "filter" => Ok(StepKind::Filter),
            "transform" => Ok(StepKind::Transform),
            "dedupe" | "deduplicate" => Ok(StepKind::Dedupe),
            "translate" => Ok(StepKind::Translate),
            "cluster" => Ok(StepKind::Cluster),
            "augment" => Ok(StepKind::Augment),
            "model_apply" | "model" => Ok(StepKind::ModelApply),
            other => Err(PipelineError::UnknownStepKind(other.to_string())),
        }
    }
}
