//! Inference client components for the local LM Studio server.

pub mod lm_studio;

pub use lm_studio::{ClientFuture, CompletionClient, GenerationParams, LmStudioClient};
