//! Whole-page pipeline phases.
//!
//! `Drafting -> Reviewing -> Finalized`. A failed draft aborts the run. A
//! failed review is a normal transition: the draft moves on to finalization.

use crate::page::Page;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum PipelinePhase {
    Drafting,
    Reviewing { draft: Map<String, Value> },
    Finalized(Box<Page>),
}

impl PipelinePhase {
    pub fn name(&self) -> &'static str {
        match self {
            PipelinePhase::Drafting => "drafting",
            PipelinePhase::Reviewing { .. } => "reviewing",
            PipelinePhase::Finalized(_) => "finalized",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelinePhase::Finalized(_))
    }
}
