//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod app_settings;
pub mod catalog_file;
pub mod clock;
pub mod media;
pub mod ollama;
pub mod ports;
pub mod resilient_llm;
