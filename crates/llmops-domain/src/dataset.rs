// dataset.rs
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identificador estable de un dataset: `<nombre>/<versión>`, p.ej.
/// `alpaca-gpt4-zh/v1.2`. Es la misma forma con la que los jobs de
/// entrenamiento referencian su dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    /// Construye el id a partir de nombre y versión.
    pub fn new(name: &str, version: &str) -> Self {
        DatasetId(format!("{name}/{version}"))
    }

    /// Parsea un id completo. Debe contener exactamente un `/` separando
    /// nombre y versión, ambos no vacíos.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw.split_once('/') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() && !version.contains('/') => {
                Ok(DatasetId(raw.to_string()))
            }
            _ => Err(DomainError::ValidationError(format!("id de dataset inválido: '{raw}' (se espera nombre/versión)"))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parte de nombre del id.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(n, _)| n).unwrap_or(&self.0)
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Estado de publicación de un dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetStatus {
    Published,
    Draft,
    Archived,
}

/// Dataset del catálogo: metadatos de solo lectura que la vista de
/// preprocesamiento muestra como fuente seleccionable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    id: DatasetId,
    name: String,
    version: String,
    /// Número aproximado de muestras, tal y como se muestra ("52k", "1.1M").
    samples: String,
    size: String,
    tags: Vec<String>,
    /// Puntuación de calidad 0..=100.
    quality: u8,
    status: DatasetStatus,
    creator: String,
}

impl Dataset {
    /// Crea un dataset validando nombre, versión y rango de calidad.
    pub fn new(name: &str,
               version: &str,
               samples: &str,
               size: &str,
               tags: &[&str],
               quality: u8,
               status: DatasetStatus,
               creator: &str)
               -> Result<Self, DomainError> {
        if name.trim().is_empty() || name.contains('/') {
            return Err(DomainError::ValidationError(format!("nombre de dataset inválido: '{name}'")));
        }
        if version.trim().is_empty() || version.contains('/') {
            return Err(DomainError::ValidationError(format!("versión de dataset inválida: '{version}'")));
        }
        if quality > 100 {
            return Err(DomainError::ValidationError(format!("calidad fuera de rango: {quality}")));
        }
        Ok(Dataset { id: DatasetId::new(name, version),
                     name: name.to_string(),
                     version: version.to_string(),
                     samples: samples.to_string(),
                     size: size.to_string(),
                     tags: tags.iter().map(|t| t.to_string()).collect(),
                     quality,
                     status,
                     creator: creator.to_string() })
    }

    pub fn id(&self) -> &DatasetId {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn version(&self) -> &str {
        &self.version
    }
    pub fn samples(&self) -> &str {
        &self.samples
    }
    pub fn size(&self) -> &str {
        &self.size
    }
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
    pub fn quality(&self) -> u8 {
        self.quality
    }
    pub fn status(&self) -> DatasetStatus {
        self.status
    }
    pub fn creator(&self) -> &str {
        &self.creator
    }
}
