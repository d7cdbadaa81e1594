//! Pagecraft: brand-driven marketing page generation
//!
//! Turns a brand identity into a structured marketing page through a
//! generative backend. Pages are generated in two phases, checked section by
//! section against quality thresholds, and repaired by regenerating failed
//! sections with fallback content as the last resort.

pub mod api;
pub mod cli;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod fallback;
pub mod generation;
pub mod identity;
pub mod logging;
pub mod page;
pub mod prompt;
pub mod provider;
pub mod quality;
pub mod regeneration;
pub mod schema;
pub mod segment;
pub mod store;
