pub mod loader;
pub mod pipeline;

pub use pipeline::{IngestReport, IngestionPipeline};
