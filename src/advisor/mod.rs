//! Recommendation core.
//!
//! Leaf-first: [`store`] holds one template per [`Intent`]; [`compose`]
//! turns a template and request values into prompt text; the LLM gateway
//! answers; [`validate`] turns raw output into typed records; [`summarize`]
//! asks for a one-paragraph common feeling. [`pipeline::Advisor`] wires them
//! together for the HTTP layer.
//!
//! Everything here except the gateway call is synchronous and pure over
//! read-only state.

pub mod catalog;
pub mod classify;
pub mod compose;
pub mod error;
pub mod intent;
pub mod pipeline;
pub mod store;
pub mod summarize;
pub mod template;
pub mod types;
pub mod validate;

pub use catalog::{Catalog, Product, ProductKind};
pub use compose::ComposedPrompt;
pub use error::AdvisorError;
pub use intent::Intent;
pub use pipeline::{Advisor, RecommendRequest, Recommendation, Reply};
pub use store::{LoadError, Template, TemplateStore};
pub use types::{NotePosition, Notes, RecommendationItem, RecommendationResponse};
pub use validate::validate;
