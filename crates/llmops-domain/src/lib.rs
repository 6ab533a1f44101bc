// llmops-domain library entry point
pub mod dataset;
pub mod catalog;
pub mod error;
pub use dataset::{Dataset, DatasetId, DatasetStatus};
pub use catalog::DatasetCatalog;
pub use error::DomainError;
