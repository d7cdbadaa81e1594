//! Integration tests for the page generation pipeline

mod config_integration;
mod page_generation;
mod regeneration;
mod segment_cache;
mod store_integration;
pub mod test_utils;
