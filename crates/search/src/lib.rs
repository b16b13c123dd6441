//! Search & filter engine for a client-side task/board manager.
//!
//! The orchestrator sequences integrity revalidation, cross-board access
//! checks, a TTL'd result cache, the staged filter pipeline, and a two-tier
//! recovery chain that always publishes something rather than failing hard.

mod access;
mod cache;
mod engine;
mod error;
mod input;
mod integrity;
mod limiter;
mod pipeline;
mod session;

pub use access::BoardAccess;
pub use cache::{SearchCache, MAX_CACHEABLE_RESULTS};
pub use engine::SearchEngine;
pub use error::{Result, SearchError};
pub use input::{sanitize_query, SearchInputController};
pub use integrity::{retain_valid, validate};
pub use limiter::FixedWindowLimiter;
pub use pipeline::{Pipeline, StandardPipeline};
pub use session::SearchSession;
