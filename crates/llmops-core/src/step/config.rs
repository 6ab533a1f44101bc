//! Configuración tipada por kind de step.
//!
//! Cada variante de `StepConfig` corresponde a los campos que el panel de
//! configuración muestra para ese kind. La simulación sólo valida presencia
//! (campos no vacíos, `k >= 1`); la semántica de la condición de filtro o de
//! la plantilla de prompt no se interpreta.

use serde::{Deserialize, Serialize};

use super::StepKind;
use crate::errors::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFormat {
    Jsonl,
    Alpaca,
    ShareGpt,
}

/// Columna usada para decidir si dos muestras son duplicadas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    AllColumns,
    Column(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterAlgorithm {
    KMeans,
    Dbscan,
    Agglomerative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentMethod {
    SynonymReplacement,
    BackTranslation,
    RandomInsertion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepConfig {
    Filter {
        /// Condición estilo SQL, p.ej. `length(text) > 100 AND lang == 'en'`.
        condition: String,
    },
    Transform { target_format: TargetFormat },
    Dedupe { key: DedupKey },
    Translate {
        /// `None` = autodetección.
        source_language: Option<String>,
        target_language: String,
    },
    Cluster {
        algorithm: ClusterAlgorithm,
        feature_column: String,
        k: u32,
    },
    Augment { method: AugmentMethod },
    ModelApply {
        model: String,
        /// Plantilla con referencias a columnas del tipo `{column_name}`.
        prompt_template: String,
    },
}

impl StepConfig {
    /// Configuración por defecto para un kind. Todas las defaults son válidas.
    pub fn default_for(kind: StepKind) -> Self {
        match kind {
            StepKind::Filter => StepConfig::Filter { condition: "true".to_string() },
            StepKind::Transform => StepConfig::Transform { target_format: TargetFormat::Jsonl },
            StepKind::Dedupe => StepConfig::Dedupe { key: DedupKey::AllColumns },
            StepKind::Translate => StepConfig::Translate { source_language: None,
                                                           target_language: "en".to_string() },
            StepKind::Cluster => StepConfig::Cluster { algorithm: ClusterAlgorithm::KMeans,
                                                       feature_column: "text_embedding".to_string(),
                                                       k: 5 },
            StepKind::Augment => StepConfig::Augment { method: AugmentMethod::SynonymReplacement },
            StepKind::ModelApply => StepConfig::ModelApply { model: "gemini-2.5-flash".to_string(),
                                                             prompt_template: "{text}".to_string() },
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            StepConfig::Filter { .. } => StepKind::Filter,
            StepConfig::Transform { .. } => StepKind::Transform,
            StepConfig::Dedupe { .. } => StepKind::Dedupe,
            StepConfig::Translate { .. } => StepKind::Translate,
            StepConfig::Cluster { .. } => StepKind::Cluster,
            StepConfig::Augment { .. } => StepKind::Augment,
            StepConfig::ModelApply { .. } => StepKind::ModelApply,
        }
    }

    /// Validación de presencia.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let missing = |field: &str| PipelineError::InvalidConfig { kind: self.kind(),
                                                                   reason: format!("falta {field}") };
        match self {
            StepConfig::Filter { condition } if condition.trim().is_empty() => Err(missing("condition")),
            StepConfig::Dedupe { key: DedupKey::Column(c) } if c.trim().is_empty() => Err(missing("key column")),
            StepConfig::Translate { source_language, target_language } => {
                if target_language.trim().is_empty() {
                    return Err(missing("target language"));
                }
                if source_language.as_deref().is_some_and(|s| s.trim().is_empty()) {
                    return Err(missing("source language"));
                }
                Ok(())
            }
            StepConfig::Cluster { feature_column, k, .. } => {
                if feature_column.trim().is_empty() {
                    return Err(missing("feature column"));
                }
                if *k == 0 {
                    return Err(PipelineError::InvalidConfig { kind: StepKind::Cluster,
                                                              reason: "k debe ser al menos 1".to_string() });
                }
                Ok(())
            }
            StepConfig::ModelApply { model, prompt_template } => {
                if model.trim().is_empty() {
                    return Err(missing("model"));
                }
                if prompt_template.trim().is_empty() {
                    return Err(missing("prompt template"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Resumen de una línea para listados.
    pub fn summary(&self) -> String {
        match self {
            StepConfig::Filter { condition } => format!("where {condition}"),
            StepConfig::Transform { target_format } => format!("to {target_format:?}"),
            StepConfig::Dedupe { key: DedupKey::AllColumns } => "on all columns".to_string(),
            StepConfig::Dedupe { key: DedupKey::Column(c) } => format!("on {c}"),
            StepConfig::Translate { source_language, target_language } => {
                format!("{} -> {target_language}", source_language.as_deref().unwrap_or("auto"))
            }
            StepConfig::Cluster { algorithm, feature_column, k } => format!("{algorithm:?}(k={k}) over {feature_column}"),
            StepConfig::Augment { method } => format!("{method:?}"),
            StepConfig::ModelApply { model, .. } => format!("with {model}"),
        }
    }
}
