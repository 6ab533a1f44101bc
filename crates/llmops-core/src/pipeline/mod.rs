//! Construcción de pipelines y plantillas reutilizables.

mod builder;
mod template;

pub use builder::PipelineBuilder;
pub use template::PipelineTemplate;
