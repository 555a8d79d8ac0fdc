//! file helpers for the pipeline: CSV tables, JSON documents and the trained model store.
pub mod csv_ops;
pub mod fs;
pub mod model_store;
