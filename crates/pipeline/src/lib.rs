//! Collaborator seams and end-to-end orchestration for video generation.
//!
//! The model server, the prompt enhancer and the video encoder are each
//! reached through a trait so they can be swapped in tests.

pub mod backend;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod enhancer;
pub mod generator;
pub mod prompt_pipeline;

pub use config::PipelineConfig;
pub use engine::GenerationEngine;
pub use generator::{GenerationReport, GenerationRequest, VideoGenerator, WarmupReport};
