//! Perfume and diffuser recommendation chatbot backend.
//!
//! User messages and a product catalog are turned into prompts from a JSON
//! template document, sent to an LLM, and the structured output is validated
//! into recommendation records. See [`advisor`] for the core and [`http`]
//! for the API surface.

pub mod advisor;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod logger;
