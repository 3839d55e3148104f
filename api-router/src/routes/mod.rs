pub mod ask;
pub mod health;
pub mod ingest;
pub mod stats;
