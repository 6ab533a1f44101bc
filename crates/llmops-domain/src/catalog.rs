// catalog.rs
//! Catálogo en memoria de datasets disponibles como fuente de un pipeline.
//!
//! El catálogo es de solo lectura una vez construido: la consola no crea ni
//! borra datasets, sólo permite seleccionarlos.
use crate::{Dataset, DatasetId, DatasetStatus, DomainError};
use once_cell::sync::Lazy;

static MOCK_DATASETS: Lazy<Vec<Dataset>> = Lazy::new(|| {
    let specs: [(&str, &str, &str, &str, &[&str], u8, DatasetStatus, &str); 4] = [
        ("alpaca-gpt4-zh", "v1.2", "52k", "102 MB", &["SFT", "zh"], 95, DatasetStatus::Published, "team-a"),
        ("dolly-v2-15k", "v2.0", "15k", "30 MB", &["SFT", "en", "RLHF"], 92, DatasetStatus::Published, "team-b"),
        ("internal-customer-qa", "v0.1-draft", "1.1M", "2.3 GB", &["pretrain", "finance"], 78, DatasetStatus::Draft, "team-a"),
        ("medical-dialogue-en", "v1.0", "250k", "450 MB", &["SFT", "medical"], 88, DatasetStatus::Archived, "team-c"),
    ];
    specs.iter()
         .filter_map(|(name, version, samples, size, tags, quality, status, creator)| {
             Dataset::new(name, version, samples, size, tags, *quality, *status, creator).ok()
         })
         .collect()
});

#[derive(Debug, Clone, Default)]
pub struct DatasetCatalog {
    datasets: Vec<Dataset>,
}

impl DatasetCatalog {
    /// Catálogo con los datasets de demostración de la consola.
    pub fn mock() -> Self {
        DatasetCatalog { datasets: MOCK_DATASETS.clone() }
    }

    /// Construye un catálogo propio. Rechaza ids duplicados.
    pub fn from_datasets(datasets: Vec<Dataset>) -> Result<Self, DomainError> {
        let mut catalog = DatasetCatalog::default();
        for d in datasets {
            catalog.insert(d)?;
        }
        Ok(catalog)
    }

    fn insert(&mut self, dataset: Dataset) -> Result<(), DomainError> {
        if self.datasets.iter().any(|d| d.id() == dataset.id()) {
            return Err(DomainError::ValidationError(format!("dataset duplicado: {}", dataset.id())));
        }
        self.datasets.push(dataset);
        Ok(())
    }

    pub fn list(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn get(&self, id: &DatasetId) -> Result<&Dataset, DomainError> {
        self.datasets
            .iter()
            .find(|d| d.id() == id)
            .ok_or_else(|| DomainError::NotFound(id.to_string()))
    }

    /// Busca por id completo (`nombre/versión`) o, si no hay `/`, por nombre.
    /// Un nombre con varias versiones en el catálogo es ambiguo.
    pub fn resolve(&self, query: &str) -> Result<&Dataset, DomainError> {
        if query.contains('/') {
            return self.get(&DatasetId::parse(query)?);
        }
        let mut matches = self.datasets.iter().filter(|d| d.name() == query);
        match (matches.next(), matches.next()) {
            (Some(d), None) => Ok(d),
            (None, _) => Err(DomainError::NotFound(query.to_string())),
            (Some(_), Some(_)) => Err(DomainError::ValidationError(format!("nombre ambiguo '{query}': indique la versión"))),
        }
    }

    pub fn contains(&self, id: &DatasetId) -> bool {
        self.datasets.iter().any(|d| d.id() == id)
    }
}
